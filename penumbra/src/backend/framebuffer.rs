//! Framebuffer backend interface.

use crate::error::Error;
use crate::framebuffer::{BlitRegion, FramebufferBuilder, FramebufferStatus, RenderbufferFormat};

/// Framebuffer backend.
pub unsafe trait Framebuffer {
  /// Create a framebuffer with every attachment of `builder`.
  ///
  /// The framebuffer is left bound for drawing.
  unsafe fn new_framebuffer(&mut self, builder: &FramebufferBuilder) -> Result<u32, Error>;

  /// Completeness status of the framebuffer bound for drawing.
  unsafe fn framebuffer_status(&mut self) -> Result<FramebufferStatus, Error>;

  /// Delete a framebuffer.
  unsafe fn delete_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error>;

  /// Bind a framebuffer for drawing; `0` binds the default framebuffer.
  unsafe fn bind_draw_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error>;

  /// Bind a framebuffer for reading; `0` binds the default framebuffer.
  unsafe fn bind_read_framebuffer(&mut self, framebuffer: u32) -> Result<(), Error>;

  /// Copy a region of the read framebuffer into the draw framebuffer.
  unsafe fn blit_framebuffer(&mut self, region: &BlitRegion) -> Result<(), Error>;

  /// Allocate a renderbuffer.
  unsafe fn new_renderbuffer(
    &mut self,
    format: RenderbufferFormat,
    width: u32,
    height: u32,
  ) -> Result<u32, Error>;

  /// Delete a renderbuffer.
  unsafe fn delete_renderbuffer(&mut self, renderbuffer: u32) -> Result<(), Error>;
}
