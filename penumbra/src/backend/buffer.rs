//! Buffer backend interface.
//!
//! This interface defines the low-level API buffers must implement to be usable.

use crate::buffer::UsageHint;
use crate::error::Error;

/// What a buffer is used for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferTarget {
  /// Vertex data.
  Array,
  /// Element indices.
  Index,
}

/// Buffer backend.
///
/// Reads and writes must not disturb the array buffer binding nor the index buffer of the bound
/// array object.
pub unsafe trait Buffer {
  /// Allocate a buffer of `bytes` bytes, zeroed.
  unsafe fn new_buffer(
    &mut self,
    target: BufferTarget,
    bytes: usize,
    usage: UsageHint,
  ) -> Result<u32, Error>;

  /// Delete a buffer.
  unsafe fn delete_buffer(&mut self, target: BufferTarget, buffer: u32) -> Result<(), Error>;

  /// Bind an array buffer; `0` unbinds.
  unsafe fn bind_array_buffer(&mut self, buffer: u32) -> Result<(), Error>;

  /// Write `data` at byte offset `offset`.
  unsafe fn write_buffer(
    &mut self,
    target: BufferTarget,
    buffer: u32,
    offset: usize,
    data: &[u8],
  ) -> Result<(), Error>;

  /// Read `out.len()` bytes at byte offset `offset`.
  unsafe fn read_buffer(
    &mut self,
    target: BufferTarget,
    buffer: u32,
    offset: usize,
    out: &mut [u8],
  ) -> Result<(), Error>;
}
