//! Draw commands for OpenGL 3.3.

use crate::gl33::enums::{index_type_to_gl, primitive_to_gl};
use crate::gl33::{check_errors, GL33};
use gl::types::*;
use penumbra::backend::draw::Draw;
use penumbra::buffer::IndexType;
use penumbra::draw::{ClearOptions, Primitive};
use penumbra::error::Error;
use penumbra::render_state::ColorMask;
use std::ptr;

unsafe impl<S> Draw for GL33<S> {
  unsafe fn draw_arrays(
    &mut self,
    primitive: Primitive,
    first: usize,
    count: usize,
    instances: usize,
  ) -> Result<(), Error> {
    gl::DrawArraysInstanced(
      primitive_to_gl(primitive),
      first as GLint,
      count as GLsizei,
      instances as GLsizei,
    );

    check_errors("draw arrays")
  }

  unsafe fn draw_elements(
    &mut self,
    primitive: Primitive,
    count: usize,
    index_type: IndexType,
    instances: usize,
  ) -> Result<(), Error> {
    gl::DrawElementsInstanced(
      primitive_to_gl(primitive),
      count as GLsizei,
      index_type_to_gl(index_type),
      ptr::null(),
      instances as GLsizei,
    );

    check_errors("draw elements")
  }

  unsafe fn clear(&mut self, options: &ClearOptions) -> Result<(), Error> {
    let mut mask: GLbitfield = 0;

    // write masks of the render state would mask the clear too
    let color_mask = self.state.color_mask();
    let depth_write = self.state.depth_write();
    let stencil_masks = self.state.stencil_write_masks();

    if let Some(color) = options.color {
      self.state.set_clear_color(color);
      self.state.set_color_mask(ColorMask::default());
      mask |= gl::COLOR_BUFFER_BIT;
    }

    if let Some(depth) = options.depth {
      self.state.set_clear_depth(depth);

      if depth_write != Some(true) {
        gl::DepthMask(gl::TRUE);
      }

      mask |= gl::DEPTH_BUFFER_BIT;
    }

    if let Some(stencil) = options.stencil {
      self.state.set_clear_stencil(stencil);

      if stencil_masks != Some((!0, !0)) {
        gl::StencilMask(!0);
      }

      mask |= gl::STENCIL_BUFFER_BIT;
    }

    if mask != 0 {
      gl::Clear(mask);
    }

    if let Some(color_mask) = color_mask {
      self.state.set_color_mask(color_mask);
    }

    if options.depth.is_some() && depth_write == Some(false) {
      gl::DepthMask(gl::FALSE);
    }

    if options.stencil.is_some() {
      match stencil_masks {
        Some((front, back)) if (front, back) != (!0, !0) => {
          gl::StencilMaskSeparate(gl::FRONT, front);
          gl::StencilMaskSeparate(gl::BACK, back);
        }
        Some(_) => (),
        None => self.state.invalidate_stencil_faces(),
      }
    }

    check_errors("clear")
  }
}
