//! Array object backend interface.

use crate::array_object::{AttributeLayout, VertexAttribute};
use crate::buffer::IndexBuffer;
use crate::error::Error;

/// Array object backend.
pub unsafe trait ArrayObject {
  /// Create an array object with an optional index buffer and one optional attribute per
  /// location.
  ///
  /// The array object is left bound.
  unsafe fn new_array_object(
    &mut self,
    index_buffer: Option<&IndexBuffer>,
    attributes: &[Option<VertexAttribute>],
  ) -> Result<u32, Error>;

  /// Delete an array object.
  unsafe fn delete_array_object(&mut self, array_object: u32) -> Result<(), Error>;

  /// Bind an array object; `0` binds the default one.
  unsafe fn bind_array_object(&mut self, array_object: u32) -> Result<(), Error>;

  /// Source the attribute at `location` from `buffer` in the bound array object.
  unsafe fn enable_attribute_array(
    &mut self,
    location: u32,
    buffer: u32,
    layout: &AttributeLayout,
  ) -> Result<(), Error>;

  /// Stop sourcing the attribute at `location` from a buffer.
  unsafe fn disable_attribute_array(&mut self, location: u32) -> Result<(), Error>;
}
