//! Draw calls.
//!
//! Drawing requires an active program. Every object the draw reads from (the program, the bound
//! array object and the buffers it references) must be live.

use crate::backend::draw::Draw as _;
use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::handle::Resource;
use log::trace;

/// Primitive to assemble vertices into.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Primitive {
  /// Points.
  Points,
  /// Independent lines.
  Lines,
  /// Connected lines.
  LineStrip,
  /// Connected lines, the last vertex connected to the first one.
  LineLoop,
  /// Independent triangles.
  Triangles,
  /// Triangle strip.
  TriangleStrip,
  /// Triangle fan.
  TriangleFan,
}

/// What to clear in the framebuffer bound for drawing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClearOptions {
  /// Color to clear color attachments with.
  pub color: Option<[f32; 4]>,
  /// Depth to clear the depth attachment with.
  pub depth: Option<f32>,
  /// Value to clear the stencil attachment with.
  pub stencil: Option<i32>,
}

impl Default for ClearOptions {
  /// Clear color to transparent black and depth to `1`.
  fn default() -> Self {
    ClearOptions {
      color: Some([0., 0., 0., 0.]),
      depth: Some(1.),
      stencil: None,
    }
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  fn draw_check(&self) -> Result<(), Error> {
    self.check_current()?;

    let program = self
      .state
      .program
      .as_ref()
      .ok_or_else(|| Error::constraint("no program is active"))?;

    program.handle().check_not_deleted()?;
    self.state.array_object.check_references()
  }

  /// Draw `count` vertices starting at `first`.
  pub fn draw_unindexed(
    &mut self,
    primitive: Primitive,
    first: usize,
    count: usize,
  ) -> Result<(), Error> {
    self.draw_unindexed_instanced(primitive, first, count, 1)
  }

  /// Draw `count` vertices starting at `first`, `instances` times.
  pub fn draw_unindexed_instanced(
    &mut self,
    primitive: Primitive,
    first: usize,
    count: usize,
    instances: usize,
  ) -> Result<(), Error> {
    self.draw_check()?;
    trace!(
      "draw {:?} {} vertices from {} × {}",
      primitive,
      count,
      first,
      instances
    );

    unsafe {
      self
        .backend
        .draw_arrays(primitive, first, count, instances)
    }
  }

  /// Draw every index of the index buffer of the bound array object.
  pub fn draw_indexed(&mut self, primitive: Primitive) -> Result<(), Error> {
    self.draw_indexed_instanced(primitive, 1)
  }

  /// Draw every index of the index buffer of the bound array object, `instances` times.
  pub fn draw_indexed_instanced(
    &mut self,
    primitive: Primitive,
    instances: usize,
  ) -> Result<(), Error> {
    self.draw_check()?;

    let (count, index_type) = match self.state.array_object.index_buffer() {
      Some(index_buffer) => (index_buffer.count(), index_buffer.index_type()),
      None => {
        return Err(Error::constraint(
          "the bound array object has no index buffer",
        ))
      }
    };

    trace!("draw {:?} indexed {} × {}", primitive, count, instances);

    unsafe {
      self
        .backend
        .draw_elements(primitive, count, index_type, instances)
    }
  }

  /// Clear the framebuffer bound for drawing.
  pub fn clear(&mut self, options: &ClearOptions) -> Result<(), Error> {
    self.check_current()?;

    if let Some(ref framebuffer) = self.state.draw_framebuffer {
      framebuffer.handle().check_not_deleted()?;
    }

    unsafe { self.backend.clear(options) }
  }
}
