//! Draw backend interface.

use crate::buffer::IndexType;
use crate::draw::{ClearOptions, Primitive};
use crate::error::Error;

/// Draw backend.
pub unsafe trait Draw {
  /// Draw `count` vertices starting at `first`, `instances` times.
  unsafe fn draw_arrays(
    &mut self,
    primitive: Primitive,
    first: usize,
    count: usize,
    instances: usize,
  ) -> Result<(), Error>;

  /// Draw `count` indexed vertices using the index buffer of the bound array object.
  unsafe fn draw_elements(
    &mut self,
    primitive: Primitive,
    count: usize,
    index_type: IndexType,
    instances: usize,
  ) -> Result<(), Error>;

  /// Clear the framebuffer bound for drawing.
  unsafe fn clear(&mut self, options: &ClearOptions) -> Result<(), Error>;
}
