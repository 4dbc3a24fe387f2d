//! OpenGL framebuffer and renderbuffer implementation.

use crate::gl33::enums::{
  blit_filter_to_gl, cube_face_to_gl, framebuffer_status_from_gl, renderbuffer_format_to_gl,
};
use crate::gl33::{check_errors, GL33};
use gl::types::*;
use log::{debug, trace};
use penumbra::backend::framebuffer::Framebuffer;
use penumbra::error::Error;
use penumbra::framebuffer::{
  AttachmentSource, BlitRegion, DepthAttachment, FramebufferBuilder, FramebufferStatus,
  RenderbufferFormat,
};
use penumbra::handle::Resource as _;

unsafe impl<S> Framebuffer for GL33<S> {
  unsafe fn new_framebuffer(&mut self, builder: &FramebufferBuilder) -> Result<u32, Error> {
    let mut handle: GLuint = 0;
    gl::GenFramebuffers(1, &mut handle);
    self.state.bind_draw_framebuffer(handle);

    // draw buffer i renders to whatever point was attached through it; gaps render nowhere
    let mut draw_buffers: Vec<GLenum> = Vec::new();

    for color in builder.color_attachments() {
      let point = gl::COLOR_ATTACHMENT0 + color.point.index();
      attach(point, &color.source);

      let draw_buffer = color.draw_buffer.index() as usize;

      if draw_buffers.len() <= draw_buffer {
        draw_buffers.resize(draw_buffer + 1, gl::NONE);
      }

      draw_buffers[draw_buffer] = point;
    }

    if draw_buffers.is_empty() {
      gl::DrawBuffer(gl::NONE);
      gl::ReadBuffer(gl::NONE);
    } else {
      gl::DrawBuffers(draw_buffers.len() as GLsizei, draw_buffers.as_ptr());
    }

    match builder.depth_attachment() {
      Some(DepthAttachment::Depth(ref source)) => attach(gl::DEPTH_ATTACHMENT, source),
      Some(DepthAttachment::DepthStencil(ref source)) => {
        attach(gl::DEPTH_STENCIL_ATTACHMENT, source)
      }
      None => (),
    }

    if let Err(e) = check_errors("allocate framebuffer") {
      gl::DeleteFramebuffers(1, &handle);
      self.state.forget_framebuffer(handle);
      return Err(e);
    }

    debug!(
      "new framebuffer {} ({} draw buffers)",
      handle,
      draw_buffers.len()
    );

    Ok(handle)
  }

  unsafe fn framebuffer_status(&mut self) -> Result<FramebufferStatus, Error> {
    let status = gl::CheckFramebufferStatus(gl::DRAW_FRAMEBUFFER);

    if status == 0 {
      check_errors("framebuffer status")?;
    }

    Ok(framebuffer_status_from_gl(status))
  }

  unsafe fn delete_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error> {
    gl::DeleteFramebuffers(1, &framebuffer);
    self.state.forget_framebuffer(framebuffer);

    Ok(())
  }

  unsafe fn bind_draw_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error> {
    self.state.bind_draw_framebuffer(framebuffer);
    Ok(())
  }

  unsafe fn bind_read_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error> {
    self.state.bind_read_framebuffer(framebuffer);
    Ok(())
  }

  unsafe fn blit_framebuffer(&mut self, region: &BlitRegion) -> Result<(), Error> {
    let mut mask: GLbitfield = 0;

    if region.color {
      mask |= gl::COLOR_BUFFER_BIT;
    }

    if region.depth {
      mask |= gl::DEPTH_BUFFER_BIT;
    }

    if region.stencil {
      mask |= gl::STENCIL_BUFFER_BIT;
    }

    let (src, dst) = (region.source, region.target);

    gl::BlitFramebuffer(
      src.x as GLint,
      src.y as GLint,
      (src.x + src.width) as GLint,
      (src.y + src.height) as GLint,
      dst.x as GLint,
      dst.y as GLint,
      (dst.x + dst.width) as GLint,
      (dst.y + dst.height) as GLint,
      mask,
      blit_filter_to_gl(region.filter),
    );

    check_errors("blit framebuffer")
  }

  unsafe fn new_renderbuffer(
    &mut self,
    format: RenderbufferFormat,
    width: u32,
    height: u32,
  ) -> Result<u32, Error> {
    let mut handle: GLuint = 0;
    gl::GenRenderbuffers(1, &mut handle);

    self.state.bind_renderbuffer(handle);
    gl::RenderbufferStorage(
      gl::RENDERBUFFER,
      renderbuffer_format_to_gl(format),
      width as GLsizei,
      height as GLsizei,
    );

    if let Err(e) = check_errors("allocate renderbuffer") {
      gl::DeleteRenderbuffers(1, &handle);
      self.state.forget_renderbuffer(handle);
      return Err(e);
    }

    trace!("new renderbuffer {} ({}×{}, {:?})", handle, width, height, format);
    Ok(handle)
  }

  unsafe fn delete_renderbuffer(&mut self, renderbuffer: u32) -> Result<(), Error> {
    gl::DeleteRenderbuffers(1, &renderbuffer);
    self.state.forget_renderbuffer(renderbuffer);

    Ok(())
  }
}

/// Attach an image to the framebuffer bound for drawing.
unsafe fn attach(point: GLenum, source: &AttachmentSource) {
  match *source {
    AttachmentSource::Texture2D(ref texture) => gl::FramebufferTexture2D(
      gl::DRAW_FRAMEBUFFER,
      point,
      gl::TEXTURE_2D,
      texture.handle().id(),
      0,
    ),

    AttachmentSource::CubeFace(ref texture, face) => gl::FramebufferTexture2D(
      gl::DRAW_FRAMEBUFFER,
      point,
      cube_face_to_gl(face),
      texture.handle().id(),
      0,
    ),

    AttachmentSource::Renderbuffer(ref renderbuffer) => gl::FramebufferRenderbuffer(
      gl::DRAW_FRAMEBUFFER,
      point,
      gl::RENDERBUFFER,
      renderbuffer.handle().id(),
    ),
  }
}
