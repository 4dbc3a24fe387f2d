//! Buffer mappings and cursors.
//!
//! Mapping a buffer gives a [`ArrayBufferMapping`] (or [`IndexBufferMapping`]): a copy of the
//! buffer bytes living in memory until the buffer is unmapped. Cursors are typed, bounded views
//! over one attribute of every element of a mapping:
//!
//! - [`ReadCursor`] reads elements one at a time.
//! - [`WriteCursor`] writes elements one at a time and records which bytes were touched, so that
//!   only those are uploaded when unmapping.
//!
//! Both start at element `0`, advance after each access and can be moved with `seek_to`. Any
//! access outside of `[0, element_count)` fails with [`Error::Range`]. Cursors borrow the mapping,
//! so they cannot be used once the mapping has been handed back to the context.

use crate::buffer::{ArrayBuffer, IndexBuffer, IndexType};
use crate::descriptor::BufferAttribute;
use crate::error::Error;
use crate::scalar::ScalarType;
use std::{marker::PhantomData, mem, ops::Range, sync::atomic::Ordering};

/// Access requested when mapping a buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MapAccess {
  /// Read-only.
  Read,
  /// Read and write.
  Write,
}

/// Values a cursor can read and write.
pub trait CursorElement: Copy {
  /// Scalar type of each component.
  const SCALAR: ScalarType;

  /// Number of components.
  const COMPONENTS: usize;

  /// Encode into `out`, which is exactly `SCALAR.size_bytes() * COMPONENTS` bytes long.
  fn encode(&self, out: &mut [u8]);

  /// Decode from `bytes`, which is exactly `SCALAR.size_bytes() * COMPONENTS` bytes long.
  fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_CursorElement {
  ($t:ty, $scalar:ident, $($n:literal),+) => {
    $(
      impl CursorElement for [$t; $n] {
        const SCALAR: ScalarType = ScalarType::$scalar;
        const COMPONENTS: usize = $n;

        fn encode(&self, out: &mut [u8]) {
          for (chunk, x) in out.chunks_exact_mut(mem::size_of::<$t>()).zip(self.iter()) {
            chunk.copy_from_slice(&x.to_ne_bytes());
          }
        }

        fn decode(bytes: &[u8]) -> Self {
          let mut value = [<$t>::default(); $n];

          for (x, chunk) in value.iter_mut().zip(bytes.chunks_exact(mem::size_of::<$t>())) {
            let mut raw = [0; mem::size_of::<$t>()];
            raw.copy_from_slice(chunk);
            *x = <$t>::from_ne_bytes(raw);
          }

          value
        }
      }
    )+
  };
}

impl_CursorElement!(f32, Float, 1, 2, 3, 4);
impl_CursorElement!(i32, Int, 1, 2, 3, 4);
impl_CursorElement!(u32, UnsignedInt, 1, 2, 3, 4);
impl_CursorElement!(i16, Short, 1, 2, 3, 4);
impl_CursorElement!(u16, UnsignedShort, 1, 2, 3, 4);
impl_CursorElement!(i8, Byte, 1, 2, 3, 4);
impl_CursorElement!(u8, UnsignedByte, 1, 2, 3, 4);

fn extend_dirty(dirty: &mut Option<Range<usize>>, range: Range<usize>) {
  *dirty = Some(match dirty.take() {
    Some(d) => d.start.min(range.start)..d.end.max(range.end),
    None => range,
  });
}

fn check_element_type<T>(attribute: &BufferAttribute) -> Result<(), Error>
where
  T: CursorElement,
{
  if attribute.scalar_type() == T::SCALAR && attribute.components() == T::COMPONENTS {
    Ok(())
  } else {
    Err(Error::attribute_type_mismatch(
      attribute.name(),
      format!("{}×{}", T::SCALAR, T::COMPONENTS),
      format!("{}×{}", attribute.scalar_type(), attribute.components()),
    ))
  }
}

/// Byte layout shared by cursors.
#[derive(Clone, Copy, Debug)]
struct Stepping {
  offset: usize,
  stride: usize,
  size: usize,
  count: usize,
}

impl Stepping {
  fn byte_range(&self, index: usize) -> Range<usize> {
    let start = index * self.stride + self.offset;
    start..start + self.size
  }

  fn check(&self, index: usize) -> Result<(), Error> {
    if index < self.count {
      Ok(())
    } else {
      Err(Error::range(index, self.count))
    }
  }
}

/// Mapped content of an array buffer.
#[derive(Debug)]
pub struct ArrayBufferMapping {
  buffer: ArrayBuffer,
  access: MapAccess,
  bytes: Vec<u8>,
  dirty: Option<Range<usize>>,
}

impl ArrayBufferMapping {
  pub(crate) fn new(buffer: ArrayBuffer, access: MapAccess) -> Self {
    let bytes = vec![0; buffer.size_bytes()];

    ArrayBufferMapping {
      buffer,
      access,
      bytes,
      dirty: None,
    }
  }

  pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
    &mut self.bytes
  }

  /// Mapped buffer.
  pub fn buffer(&self) -> &ArrayBuffer {
    &self.buffer
  }

  /// Access the buffer was mapped with.
  pub fn access(&self) -> MapAccess {
    self.access
  }

  /// Raw bytes of the mapping.
  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Byte range written so far, if any.
  pub fn dirty_range(&self) -> Option<Range<usize>> {
    self.dirty.clone()
  }

  fn stepping<T>(&self, name: &str) -> Result<Stepping, Error>
  where
    T: CursorElement,
  {
    let descriptor = self.buffer.descriptor();
    let attribute = descriptor.attribute_checked(name)?;
    check_element_type::<T>(attribute)?;

    Ok(Stepping {
      offset: attribute.offset(),
      stride: descriptor.stride(),
      size: attribute.size_bytes(),
      count: self.buffer.element_count(),
    })
  }

  /// Read cursor over the attribute `name`.
  ///
  /// # Errors
  ///
  /// [`Error::AttributeNotFound`] if the buffer has no such attribute and
  /// [`Error::AttributeTypeMismatch`] if its type is not `T`.
  pub fn cursor<T>(&self, name: &str) -> Result<ReadCursor<T>, Error>
  where
    T: CursorElement,
  {
    let stepping = self.stepping::<T>(name)?;

    Ok(ReadCursor {
      bytes: &self.bytes,
      stepping,
      index: 0,
      _t: PhantomData,
    })
  }

  /// Write cursor over the attribute `name`.
  ///
  /// # Errors
  ///
  /// Same as [`ArrayBufferMapping::cursor`], plus [`Error::ConstraintViolation`] if the buffer was
  /// mapped for reading.
  pub fn cursor_mut<T>(&mut self, name: &str) -> Result<WriteCursor<T>, Error>
  where
    T: CursorElement,
  {
    if self.access != MapAccess::Write {
      return Err(Error::constraint("buffer is mapped read-only"));
    }

    let stepping = self.stepping::<T>(name)?;

    Ok(WriteCursor {
      bytes: &mut self.bytes,
      dirty: &mut self.dirty,
      stepping,
      index: 0,
      _t: PhantomData,
    })
  }
}

macro_rules! typed_cursors {
  ($($read:ident, $write:ident, $t:ty);+ $(;)?) => {
    impl ArrayBufferMapping {
      $(
        #[doc = concat!("Read cursor over an attribute of type `", stringify!($t), "`.")]
        pub fn $read(&self, name: &str) -> Result<ReadCursor<$t>, Error> {
          self.cursor(name)
        }

        #[doc = concat!("Write cursor over an attribute of type `", stringify!($t), "`.")]
        pub fn $write(&mut self, name: &str) -> Result<WriteCursor<$t>, Error> {
          self.cursor_mut(name)
        }
      )+
    }
  };
}

typed_cursors! {
  cursor_1f, cursor_1f_mut, [f32; 1];
  cursor_2f, cursor_2f_mut, [f32; 2];
  cursor_3f, cursor_3f_mut, [f32; 3];
  cursor_4f, cursor_4f_mut, [f32; 4];
  cursor_1i, cursor_1i_mut, [i32; 1];
  cursor_2i, cursor_2i_mut, [i32; 2];
  cursor_3i, cursor_3i_mut, [i32; 3];
  cursor_4i, cursor_4i_mut, [i32; 4];
  cursor_1u, cursor_1u_mut, [u32; 1];
  cursor_2u, cursor_2u_mut, [u32; 2];
  cursor_3u, cursor_3u_mut, [u32; 3];
  cursor_4u, cursor_4u_mut, [u32; 4];
}

impl Drop for ArrayBufferMapping {
  fn drop(&mut self) {
    self.buffer.mapped_flag().store(false, Ordering::Release);
  }
}

/// Cursor reading one attribute of every element.
#[derive(Debug)]
pub struct ReadCursor<'a, T> {
  bytes: &'a [u8],
  stepping: Stepping,
  index: usize,
  _t: PhantomData<T>,
}

impl<'a, T> ReadCursor<'a, T>
where
  T: CursorElement,
{
  /// Index of the next element read.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Number of elements.
  pub fn element_count(&self) -> usize {
    self.stepping.count
  }

  /// Whether the cursor points to an element.
  pub fn can_read(&self) -> bool {
    self.index < self.stepping.count
  }

  /// Move to the element `index`.
  pub fn seek_to(&mut self, index: usize) -> Result<(), Error> {
    self.stepping.check(index)?;
    self.index = index;
    Ok(())
  }

  /// Read the current element and move to the next one.
  pub fn get(&mut self) -> Result<T, Error> {
    self.stepping.check(self.index)?;

    let value = T::decode(&self.bytes[self.stepping.byte_range(self.index)]);
    self.index += 1;

    Ok(value)
  }
}

/// Cursor writing one attribute of every element.
#[derive(Debug)]
pub struct WriteCursor<'a, T> {
  bytes: &'a mut [u8],
  dirty: &'a mut Option<Range<usize>>,
  stepping: Stepping,
  index: usize,
  _t: PhantomData<T>,
}

impl<'a, T> WriteCursor<'a, T>
where
  T: CursorElement,
{
  /// Index of the next element written.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Number of elements.
  pub fn element_count(&self) -> usize {
    self.stepping.count
  }

  /// Whether the cursor points to an element.
  pub fn can_write(&self) -> bool {
    self.index < self.stepping.count
  }

  /// Move to the element `index`.
  pub fn seek_to(&mut self, index: usize) -> Result<(), Error> {
    self.stepping.check(index)?;
    self.index = index;
    Ok(())
  }

  /// Write the current element and move to the next one.
  pub fn put(&mut self, value: T) -> Result<(), Error> {
    self.stepping.check(self.index)?;

    let range = self.stepping.byte_range(self.index);
    value.encode(&mut self.bytes[range.clone()]);
    extend_dirty(self.dirty, range);
    self.index += 1;

    Ok(())
  }
}

/// Mapped content of an index buffer.
#[derive(Debug)]
pub struct IndexBufferMapping {
  buffer: IndexBuffer,
  access: MapAccess,
  bytes: Vec<u8>,
  dirty: Option<Range<usize>>,
}

impl IndexBufferMapping {
  pub(crate) fn new(buffer: IndexBuffer, access: MapAccess) -> Self {
    let bytes = vec![0; buffer.size_bytes()];

    IndexBufferMapping {
      buffer,
      access,
      bytes,
      dirty: None,
    }
  }

  pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
    &mut self.bytes
  }

  /// Mapped buffer.
  pub fn buffer(&self) -> &IndexBuffer {
    &self.buffer
  }

  /// Access the buffer was mapped with.
  pub fn access(&self) -> MapAccess {
    self.access
  }

  /// Raw bytes of the mapping.
  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Byte range written so far, if any.
  pub fn dirty_range(&self) -> Option<Range<usize>> {
    self.dirty.clone()
  }

  /// Read the index at `index`.
  pub fn get(&self, index: usize) -> Result<u32, Error> {
    let count = self.buffer.count();

    if index >= count {
      return Err(Error::range(index, count));
    }

    let value = match self.buffer.index_type() {
      IndexType::UnsignedByte => <[u8; 1]>::decode(&self.bytes[index..index + 1])[0] as u32,
      IndexType::UnsignedShort => {
        <[u16; 1]>::decode(&self.bytes[index * 2..index * 2 + 2])[0] as u32
      }
      IndexType::UnsignedInt => <[u32; 1]>::decode(&self.bytes[index * 4..index * 4 + 4])[0],
    };

    Ok(value)
  }

  /// Write cursor over the indices.
  pub fn cursor_mut(&mut self) -> Result<IndexCursor, Error> {
    if self.access != MapAccess::Write {
      return Err(Error::constraint("buffer is mapped read-only"));
    }

    let index_type = self.buffer.index_type();

    Ok(IndexCursor {
      bytes: &mut self.bytes,
      dirty: &mut self.dirty,
      index_type,
      count: self.buffer.count(),
      index: 0,
    })
  }
}

impl Drop for IndexBufferMapping {
  fn drop(&mut self) {
    self.buffer.mapped_flag().store(false, Ordering::Release);
  }
}

/// Cursor writing indices.
#[derive(Debug)]
pub struct IndexCursor<'a> {
  bytes: &'a mut [u8],
  dirty: &'a mut Option<Range<usize>>,
  index_type: IndexType,
  count: usize,
  index: usize,
}

impl<'a> IndexCursor<'a> {
  /// Index of the next index written.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Whether the cursor points to an index.
  pub fn can_write(&self) -> bool {
    self.index < self.count
  }

  /// Move to the index `index`.
  pub fn seek_to(&mut self, index: usize) -> Result<(), Error> {
    if index >= self.count {
      return Err(Error::range(index, self.count));
    }

    self.index = index;
    Ok(())
  }

  /// Write an index and move to the next one.
  ///
  /// Fails with [`Error::ConstraintViolation`] if `value` does not fit in the index type.
  pub fn put(&mut self, value: u32) -> Result<(), Error> {
    if self.index >= self.count {
      return Err(Error::range(self.index, self.count));
    }

    if value > self.index_type.max_value() {
      return Err(Error::constraint(format!(
        "index {} does not fit in {:?} indices",
        value, self.index_type
      )));
    }

    let size = self.index_type.size_bytes();
    let range = self.index * size..(self.index + 1) * size;
    let out = &mut self.bytes[range.clone()];

    match self.index_type {
      IndexType::UnsignedByte => [value as u8].encode(out),
      IndexType::UnsignedShort => [value as u16].encode(out),
      IndexType::UnsignedInt => [value].encode(out),
    }

    extend_dirty(self.dirty, range);
    self.index += 1;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_decode_vec3() {
    let mut bytes = [0; 12];
    [1.0f32, -2.5, 3.25].encode(&mut bytes);

    assert_eq!(&bytes[4..8], &(-2.5f32).to_ne_bytes());
    assert_eq!(<[f32; 3]>::decode(&bytes), [1.0, -2.5, 3.25]);
  }

  #[test]
  fn dirty_range_grows() {
    let mut dirty = None;

    extend_dirty(&mut dirty, 12..24);
    extend_dirty(&mut dirty, 0..4);
    extend_dirty(&mut dirty, 8..10);

    assert_eq!(dirty, Some(0..24));
  }

  #[test]
  fn stepping_bounds() {
    let stepping = Stepping {
      offset: 12,
      stride: 32,
      size: 12,
      count: 3,
    };

    assert_eq!(stepping.byte_range(2), 76..88);
    assert!(stepping.check(2).is_ok());
    assert_eq!(stepping.check(3), Err(Error::range(3, 3)));
  }
}
