use crate::FakeBackend;
use penumbra::backend::context::ContextBackend;
use penumbra::backend::query::Query;
use penumbra::capabilities::Limit;
use penumbra::error::Error;

unsafe impl ContextBackend for FakeBackend {
  unsafe fn make_current(&mut self) -> Result<(), Error> {
    self.state.current = true;
    self.state.counters.make_current += 1;
    Ok(())
  }

  unsafe fn release_current(&mut self) -> Result<(), Error> {
    if !self.state.current {
      return Err(Error::driver("the backend is not current"));
    }

    self.state.current = false;
    Ok(())
  }
}

unsafe impl Query for FakeBackend {
  fn backend_author(&self) -> Result<String, Error> {
    Ok("penumbra".to_owned())
  }

  fn backend_name(&self) -> Result<String, Error> {
    Ok("fake".to_owned())
  }

  fn backend_version(&self) -> Result<String, Error> {
    Ok("3.3 (fake)".to_owned())
  }

  fn backend_shading_lang_version(&self) -> Result<String, Error> {
    Ok("3.30".to_owned())
  }

  unsafe fn query_limit(&mut self, limit: Limit) -> Result<i32, Error> {
    let value = match limit {
      Limit::MaxVertexAttribs => self.limits.max_vertex_attribs(),
      Limit::MaxTextureSize => self.limits.max_texture_size(),
      Limit::MaxTextureImageUnits => self.limits.texture_units(),
      Limit::MaxColorAttachments => self.limits.max_color_attachments(),
      Limit::MaxDrawBuffers => self.limits.max_draw_buffers(),
    };

    Ok(value)
  }
}
