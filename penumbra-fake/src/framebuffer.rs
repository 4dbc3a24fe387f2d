use crate::FakeBackend;
use log::trace;
use penumbra::backend::framebuffer::Framebuffer;
use penumbra::error::Error;
use penumbra::framebuffer::{
  AttachmentSource, BlitRegion, DepthAttachment, FramebufferBuilder, FramebufferStatus,
  RenderbufferFormat,
};
use penumbra::handle::Resource as _;
use penumbra::texture::ImageTarget;

#[derive(Debug)]
pub(crate) struct FakeRenderbuffer {
  pub(crate) format: RenderbufferFormat,
  pub(crate) width: u32,
  pub(crate) height: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FakeAttachment {
  Texture(u32, ImageTarget),
  Renderbuffer(u32),
}

impl From<&AttachmentSource> for FakeAttachment {
  fn from(source: &AttachmentSource) -> Self {
    match *source {
      AttachmentSource::Texture2D(ref t) => {
        FakeAttachment::Texture(t.handle().id(), ImageTarget::Texture2D)
      }
      AttachmentSource::CubeFace(ref t, face) => {
        FakeAttachment::Texture(t.handle().id(), ImageTarget::Cube(face))
      }
      AttachmentSource::Renderbuffer(ref r) => FakeAttachment::Renderbuffer(r.handle().id()),
    }
  }
}

#[derive(Debug)]
pub(crate) struct FakeFramebuffer {
  // (attachment point, draw buffer, image)
  colors: Vec<(u32, u32, FakeAttachment)>,
  depth: Option<FakeAttachment>,
  forced_status: Option<FramebufferStatus>,
}

impl FakeBackend {
  fn attachment_exists(&self, attachment: FakeAttachment) -> bool {
    let store = self.store.borrow();

    match attachment {
      FakeAttachment::Texture(id, image) => store
        .textures
        .get(&id)
        .map_or(false, |t| t.image(image).is_some()),
      FakeAttachment::Renderbuffer(id) => store.renderbuffers.contains_key(&id),
    }
  }

  fn status_of(&self, framebuffer: &FakeFramebuffer) -> FramebufferStatus {
    if let Some(status) = framebuffer.forced_status {
      return status;
    }

    if framebuffer.colors.is_empty() && framebuffer.depth.is_none() {
      return FramebufferStatus::IncompleteMissingAttachment;
    }

    let all_exist = framebuffer
      .colors
      .iter()
      .map(|&(_, _, attachment)| attachment)
      .chain(framebuffer.depth)
      .all(|attachment| self.attachment_exists(attachment));

    if all_exist {
      FramebufferStatus::Complete
    } else {
      FramebufferStatus::IncompleteAttachment
    }
  }

  fn check_framebuffer(&self, framebuffer: u32) -> Result<(), Error> {
    if framebuffer == 0 || self.state.framebuffers.contains_key(&framebuffer) {
      Ok(())
    } else {
      Err(Self::unknown("framebuffer", framebuffer))
    }
  }
}

unsafe impl Framebuffer for FakeBackend {
  unsafe fn new_framebuffer(&mut self, builder: &FramebufferBuilder) -> Result<u32, Error> {
    let colors = builder
      .color_attachments()
      .map(|c| {
        (
          c.point.index(),
          c.draw_buffer.index(),
          FakeAttachment::from(&c.source),
        )
      })
      .collect();
    let depth = builder
      .depth_attachment()
      .map(|d: &DepthAttachment| FakeAttachment::from(d.source()));

    let fake = FakeFramebuffer {
      colors,
      depth,
      forced_status: self.state.forced_status,
    };

    let id = self.store.borrow_mut().gen_name();
    trace!(
      "fake: new framebuffer {} ({} color attachments)",
      id,
      fake.colors.len()
    );

    self.state.framebuffers.insert(id, fake);
    self.state.draw_framebuffer = id;

    Ok(id)
  }

  unsafe fn framebuffer_status(&mut self) -> Result<FramebufferStatus, Error> {
    let bound = self.state.draw_framebuffer;

    if bound == 0 {
      return Ok(FramebufferStatus::Complete);
    }

    self
      .state
      .framebuffers
      .get(&bound)
      .map(|fb| self.status_of(fb))
      .ok_or_else(|| Self::unknown("framebuffer", bound))
  }

  unsafe fn delete_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error> {
    if framebuffer == 0 {
      return Err(Error::driver("the default framebuffer cannot be deleted"));
    }

    self
      .state
      .framebuffers
      .remove(&framebuffer)
      .ok_or_else(|| Self::unknown("framebuffer", framebuffer))?;

    if self.state.draw_framebuffer == framebuffer {
      self.state.draw_framebuffer = 0;
    }

    if self.state.read_framebuffer == framebuffer {
      self.state.read_framebuffer = 0;
    }

    Ok(())
  }

  unsafe fn bind_draw_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error> {
    self.check_framebuffer(framebuffer)?;
    self.state.draw_framebuffer = framebuffer;
    Ok(())
  }

  unsafe fn bind_read_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error> {
    self.check_framebuffer(framebuffer)?;
    self.state.read_framebuffer = framebuffer;
    Ok(())
  }

  unsafe fn blit_framebuffer(&mut self, region: &BlitRegion) -> Result<(), Error> {
    if !(region.color || region.depth || region.stencil) {
      return Err(Error::driver("blit with an empty mask"));
    }

    self.state.blits.push(*region);
    Ok(())
  }

  unsafe fn new_renderbuffer(
    &mut self,
    format: RenderbufferFormat,
    width: u32,
    height: u32,
  ) -> Result<u32, Error> {
    let mut store = self.store.borrow_mut();
    let id = store.gen_name();

    store.renderbuffers.insert(
      id,
      FakeRenderbuffer {
        format,
        width,
        height,
      },
    );

    trace!("fake: new renderbuffer {} {}×{} {:?}", id, width, height, format);
    Ok(id)
  }

  unsafe fn delete_renderbuffer(&mut self, renderbuffer: u32) -> Result<(), Error> {
    self
      .store
      .borrow_mut()
      .renderbuffers
      .remove(&renderbuffer)
      .map(|_| ())
      .ok_or_else(|| Self::unknown("renderbuffer", renderbuffer))
  }
}
