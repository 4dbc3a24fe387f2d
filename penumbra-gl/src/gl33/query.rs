//! Query API implementation for OpenGL 3.3.

use crate::gl33::{Surface, GL33};
use gl::types::*;
use log::trace;
use penumbra::backend::context::ContextBackend;
use penumbra::backend::query::Query;
use penumbra::capabilities::Limit;
use penumbra::error::Error;
use std::ffi::CStr;
use std::os::raw::c_char;

unsafe impl<S> ContextBackend for GL33<S>
where
  S: Surface,
{
  unsafe fn make_current(&mut self) -> Result<(), Error> {
    self
      .surface
      .make_current()
      .map_err(|e| Error::driver(format!("cannot make the surface current: {}", e)))?;

    // the context may have been used by someone else in the meantime
    self.state.invalidate();

    Ok(())
  }

  unsafe fn release_current(&mut self) -> Result<(), Error> {
    self
      .surface
      .release_current()
      .map_err(|e| Error::driver(format!("cannot release the surface: {}", e)))
  }
}

unsafe impl<S> Query for GL33<S> {
  fn backend_author(&self) -> Result<String, Error> {
    unsafe { get_string(gl::VENDOR) }
  }

  fn backend_name(&self) -> Result<String, Error> {
    unsafe { get_string(gl::RENDERER) }
  }

  fn backend_version(&self) -> Result<String, Error> {
    unsafe { get_string(gl::VERSION) }
  }

  fn backend_shading_lang_version(&self) -> Result<String, Error> {
    unsafe { get_string(gl::SHADING_LANGUAGE_VERSION) }
  }

  unsafe fn query_limit(&mut self, limit: Limit) -> Result<i32, Error> {
    let name = match limit {
      Limit::MaxVertexAttribs => gl::MAX_VERTEX_ATTRIBS,
      Limit::MaxTextureSize => gl::MAX_TEXTURE_SIZE,
      Limit::MaxTextureImageUnits => gl::MAX_TEXTURE_IMAGE_UNITS,
      Limit::MaxColorAttachments => gl::MAX_COLOR_ATTACHMENTS,
      Limit::MaxDrawBuffers => gl::MAX_DRAW_BUFFERS,
    };

    let mut value: GLint = 0;
    gl::GetIntegerv(name, &mut value);
    crate::gl33::check_errors("query limit")?;

    trace!("{}: {}", limit, value);
    Ok(value)
  }
}

unsafe fn get_string(name: GLenum) -> Result<String, Error> {
  let string = gl::GetString(name);

  if string.is_null() {
    return Err(Error::driver(format!("no string for {:#x}", name)));
  }

  let string = CStr::from_ptr(string as *const c_char);
  Ok(string.to_string_lossy().into_owned())
}
