//! Array buffers and index buffers.
//!
//! An [`ArrayBuffer`] holds a fixed number of elements laid out by a
//! [`BufferDescriptor`](crate::descriptor::BufferDescriptor). An [`IndexBuffer`] holds a fixed
//! number of indices whose width is picked from the number of indices (see
//! [`IndexType::for_count`]).
//!
//! The size of a buffer never changes after allocation. Its content is changed by mapping it (see
//! [`Context::array_buffer_map_write`] and the [`cursor`](crate::cursor) module) and unmapping it,
//! which uploads the bytes that were touched. A buffer can only be mapped once at a time.

use crate::backend::buffer::{Buffer as _, BufferTarget};
use crate::backend::Backend;
use crate::context::Context;
use crate::cursor::{ArrayBufferMapping, IndexBufferMapping, MapAccess};
use crate::descriptor::BufferDescriptor;
use crate::error::Error;
use crate::handle::{impl_Resource, Handle, Resource, ResourceKind};
use crate::scalar::ScalarType;
use log::{debug, trace};
use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

/// Hint about how a buffer is going to be used.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UsageHint {
  /// Modified once, used a few times, for drawing.
  StreamDraw,
  /// Modified once, used a few times, read back.
  StreamRead,
  /// Modified once, used a few times, copied.
  StreamCopy,
  /// Modified once, used many times, for drawing.
  StaticDraw,
  /// Modified once, used many times, read back.
  StaticRead,
  /// Modified once, used many times, copied.
  StaticCopy,
  /// Modified often, used many times, for drawing.
  DynamicDraw,
  /// Modified often, used many times, read back.
  DynamicRead,
  /// Modified often, used many times, copied.
  DynamicCopy,
}

/// Width of the indices of an index buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexType {
  /// 8-bit indices.
  UnsignedByte,
  /// 16-bit indices.
  UnsignedShort,
  /// 32-bit indices.
  UnsignedInt,
}

impl IndexType {
  /// Narrowest index type able to address `count` elements.
  ///
  /// Counts under 256 use bytes, counts under 65536 use shorts, anything else uses ints.
  pub fn for_count(count: u64) -> Self {
    if count < 256 {
      IndexType::UnsignedByte
    } else if count < 65536 {
      IndexType::UnsignedShort
    } else {
      IndexType::UnsignedInt
    }
  }

  /// Size of one index, in bytes.
  pub fn size_bytes(self) -> usize {
    self.scalar_type().size_bytes()
  }

  /// Scalar type of the indices.
  pub fn scalar_type(self) -> ScalarType {
    match self {
      IndexType::UnsignedByte => ScalarType::UnsignedByte,
      IndexType::UnsignedShort => ScalarType::UnsignedShort,
      IndexType::UnsignedInt => ScalarType::UnsignedInt,
    }
  }

  /// Largest index representable.
  pub fn max_value(self) -> u32 {
    match self {
      IndexType::UnsignedByte => u8::MAX as u32,
      IndexType::UnsignedShort => u16::MAX as u32,
      IndexType::UnsignedInt => u32::MAX,
    }
  }
}

/// A buffer of vertex data.
#[derive(Clone, Debug)]
pub struct ArrayBuffer {
  handle: Handle,
  descriptor: Arc<BufferDescriptor>,
  element_count: usize,
  usage: UsageHint,
  mapped: Arc<AtomicBool>,
}

impl_Resource!(ArrayBuffer);

impl PartialEq for ArrayBuffer {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for ArrayBuffer {}

impl ArrayBuffer {
  /// Layout of the elements.
  pub fn descriptor(&self) -> &BufferDescriptor {
    &self.descriptor
  }

  /// Number of elements.
  pub fn element_count(&self) -> usize {
    self.element_count
  }

  /// Usage hint given at allocation.
  pub fn usage(&self) -> UsageHint {
    self.usage
  }

  /// Size of the buffer, in bytes.
  pub fn size_bytes(&self) -> usize {
    self.element_count * self.descriptor.stride()
  }

  /// Whether the buffer is currently mapped.
  pub fn is_mapped(&self) -> bool {
    self.mapped.load(Ordering::Acquire)
  }

  pub(crate) fn mapped_flag(&self) -> &Arc<AtomicBool> {
    &self.mapped
  }
}

/// A buffer of element indices.
#[derive(Clone, Debug)]
pub struct IndexBuffer {
  handle: Handle,
  index_type: IndexType,
  count: usize,
  usage: UsageHint,
  mapped: Arc<AtomicBool>,
}

impl_Resource!(IndexBuffer);

impl PartialEq for IndexBuffer {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for IndexBuffer {}

impl IndexBuffer {
  /// Width of the indices.
  pub fn index_type(&self) -> IndexType {
    self.index_type
  }

  /// Number of indices.
  pub fn count(&self) -> usize {
    self.count
  }

  /// Usage hint given at allocation.
  pub fn usage(&self) -> UsageHint {
    self.usage
  }

  /// Size of the buffer, in bytes.
  pub fn size_bytes(&self) -> usize {
    self.count * self.index_type.size_bytes()
  }

  /// Whether the buffer is currently mapped.
  pub fn is_mapped(&self) -> bool {
    self.mapped.load(Ordering::Acquire)
  }

  pub(crate) fn mapped_flag(&self) -> &Arc<AtomicBool> {
    &self.mapped
  }
}

/// Take the mapping flag of a buffer.
fn acquire_mapping(flag: &AtomicBool, handle: &Handle) -> Result<(), Error> {
  flag
    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
    .map(|_| ())
    .map_err(|_| {
      Error::constraint(format!(
        "{} {} is already mapped",
        handle.kind(),
        handle.id()
      ))
    })
}

fn check_not_mapped(flag: &AtomicBool, handle: &Handle) -> Result<(), Error> {
  if flag.load(Ordering::Acquire) {
    Err(Error::constraint(format!(
      "{} {} is mapped",
      handle.kind(),
      handle.id()
    )))
  } else {
    Ok(())
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Allocate an array buffer of `element_count` elements laid out by `descriptor`.
  ///
  /// The buffer is zeroed and left bound.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::InvalidSize`] if `element_count` is zero or if the size in bytes
  /// overflows.
  pub fn array_buffer_allocate(
    &mut self,
    element_count: usize,
    descriptor: &BufferDescriptor,
    usage: UsageHint,
  ) -> Result<ArrayBuffer, Error> {
    self.check_current()?;

    if element_count == 0 {
      return Err(Error::invalid_size("an array buffer needs at least one element"));
    }

    let bytes = element_count
      .checked_mul(descriptor.stride())
      .ok_or_else(|| Error::invalid_size(format!("{} elements overflow", element_count)))?;

    let id = unsafe { self.backend.new_buffer(BufferTarget::Array, bytes, usage)? };
    debug!("allocated array buffer {} ({} bytes)", id, bytes);

    let buffer = ArrayBuffer {
      handle: Handle::new(ResourceKind::ArrayBuffer, id),
      descriptor: Arc::new(descriptor.clone()),
      element_count,
      usage,
      mapped: Arc::new(AtomicBool::new(false)),
    };

    self.array_buffer_bind(&buffer)?;
    Ok(buffer)
  }

  /// Bind an array buffer.
  pub fn array_buffer_bind(&mut self, buffer: &ArrayBuffer) -> Result<(), Error> {
    self.check_current()?;
    buffer.handle().check_not_deleted()?;

    unsafe { self.backend.bind_array_buffer(buffer.handle().id())? };
    trace!("bind array buffer {}", buffer.handle().id());
    self.state.array_buffer = Some(buffer.clone());

    Ok(())
  }

  /// Unbind the bound array buffer, if any.
  pub fn array_buffer_unbind(&mut self) -> Result<(), Error> {
    self.check_current()?;

    if self.state.array_buffer.take().is_some() {
      unsafe { self.backend.bind_array_buffer(0)? };
      trace!("unbind array buffer");
    }

    Ok(())
  }

  /// Whether `buffer` is the bound array buffer.
  pub fn array_buffer_is_bound(&self, buffer: &ArrayBuffer) -> Result<bool, Error> {
    self.check_current()?;
    buffer.handle().check_not_deleted()?;

    Ok(self.state.array_buffer.as_ref() == Some(buffer))
  }

  /// The bound array buffer, if any.
  pub fn array_buffer_current(&self) -> Option<&ArrayBuffer> {
    self.state.array_buffer.as_ref()
  }

  /// Delete an array buffer, unbinding it first if bound.
  ///
  /// Array objects referencing the buffer are not deleted, but drawing with them fails.
  pub fn array_buffer_delete(&mut self, buffer: &ArrayBuffer) -> Result<(), Error> {
    self.check_current()?;
    buffer.handle().check_not_deleted()?;
    check_not_mapped(&buffer.mapped, buffer.handle())?;

    if self.state.array_buffer.as_ref() == Some(buffer) {
      self.array_buffer_unbind()?;
    }

    unsafe {
      self
        .backend
        .delete_buffer(BufferTarget::Array, buffer.handle().id())?
    };
    debug!("delete array buffer {}", buffer.handle().id());

    buffer.handle().mark_deleted()
  }

  /// Map an array buffer for writing.
  ///
  /// The mapping starts with the current content of the buffer. Only the bytes written through
  /// cursors are uploaded by [`Context::array_buffer_unmap`].
  pub fn array_buffer_map_write(
    &mut self,
    buffer: &ArrayBuffer,
  ) -> Result<ArrayBufferMapping, Error> {
    self.array_buffer_map(buffer, MapAccess::Write)
  }

  /// Map an array buffer for reading.
  pub fn array_buffer_map_read(
    &mut self,
    buffer: &ArrayBuffer,
  ) -> Result<ArrayBufferMapping, Error> {
    self.array_buffer_map(buffer, MapAccess::Read)
  }

  fn array_buffer_map(
    &mut self,
    buffer: &ArrayBuffer,
    access: MapAccess,
  ) -> Result<ArrayBufferMapping, Error> {
    self.check_current()?;
    buffer.handle().check_not_deleted()?;
    acquire_mapping(&buffer.mapped, buffer.handle())?;

    // the mapping owns the flag from now on and releases it when dropped
    let mut mapping = ArrayBufferMapping::new(buffer.clone(), access);

    unsafe {
      self.backend.read_buffer(
        BufferTarget::Array,
        buffer.handle().id(),
        0,
        mapping.bytes_mut(),
      )?
    };
    trace!("map array buffer {} ({:?})", buffer.handle().id(), access);

    Ok(mapping)
  }

  /// Unmap an array buffer, uploading what was written.
  ///
  /// Cursors cannot outlive the mapping, so they are all invalidated.
  pub fn array_buffer_unmap(&mut self, mapping: ArrayBufferMapping) -> Result<(), Error> {
    self.check_current()?;
    mapping.buffer().handle().check_not_deleted()?;

    if let Some(range) = mapping.dirty_range() {
      trace!(
        "unmap array buffer {}: upload [{}, {})",
        mapping.buffer().handle().id(),
        range.start,
        range.end
      );

      unsafe {
        self.backend.write_buffer(
          BufferTarget::Array,
          mapping.buffer().handle().id(),
          range.start,
          &mapping.bytes()[range],
        )?
      };
    }

    Ok(())
  }

  /// Allocate an index buffer of `count` indices.
  ///
  /// The index type is [`IndexType::for_count`]`(count)`.
  pub fn index_buffer_allocate(
    &mut self,
    count: usize,
    usage: UsageHint,
  ) -> Result<IndexBuffer, Error> {
    self.check_current()?;

    if count == 0 {
      return Err(Error::invalid_size("an index buffer needs at least one index"));
    }

    let index_type = IndexType::for_count(count as u64);
    let bytes = count
      .checked_mul(index_type.size_bytes())
      .ok_or_else(|| Error::invalid_size(format!("{} indices overflow", count)))?;

    let id = unsafe { self.backend.new_buffer(BufferTarget::Index, bytes, usage)? };
    debug!(
      "allocated index buffer {} ({} × {:?})",
      id, count, index_type
    );

    Ok(IndexBuffer {
      handle: Handle::new(ResourceKind::IndexBuffer, id),
      index_type,
      count,
      usage,
      mapped: Arc::new(AtomicBool::new(false)),
    })
  }

  /// Allocate an index buffer able to index every element of an array buffer.
  pub fn index_buffer_allocate_for(
    &mut self,
    buffer: &ArrayBuffer,
    usage: UsageHint,
  ) -> Result<IndexBuffer, Error> {
    buffer.handle().check_not_deleted()?;
    self.index_buffer_allocate(buffer.element_count(), usage)
  }

  /// Map an index buffer for writing.
  pub fn index_buffer_map_write(
    &mut self,
    buffer: &IndexBuffer,
  ) -> Result<IndexBufferMapping, Error> {
    self.index_buffer_map(buffer, MapAccess::Write)
  }

  /// Map an index buffer for reading.
  pub fn index_buffer_map_read(
    &mut self,
    buffer: &IndexBuffer,
  ) -> Result<IndexBufferMapping, Error> {
    self.index_buffer_map(buffer, MapAccess::Read)
  }

  fn index_buffer_map(
    &mut self,
    buffer: &IndexBuffer,
    access: MapAccess,
  ) -> Result<IndexBufferMapping, Error> {
    self.check_current()?;
    buffer.handle().check_not_deleted()?;
    acquire_mapping(&buffer.mapped, buffer.handle())?;

    let mut mapping = IndexBufferMapping::new(buffer.clone(), access);

    unsafe {
      self.backend.read_buffer(
        BufferTarget::Index,
        buffer.handle().id(),
        0,
        mapping.bytes_mut(),
      )?
    };
    trace!("map index buffer {} ({:?})", buffer.handle().id(), access);

    Ok(mapping)
  }

  /// Unmap an index buffer, uploading what was written.
  pub fn index_buffer_unmap(&mut self, mapping: IndexBufferMapping) -> Result<(), Error> {
    self.check_current()?;
    mapping.buffer().handle().check_not_deleted()?;

    if let Some(range) = mapping.dirty_range() {
      unsafe {
        self.backend.write_buffer(
          BufferTarget::Index,
          mapping.buffer().handle().id(),
          range.start,
          &mapping.bytes()[range],
        )?
      };
    }

    Ok(())
  }

  /// Replace the first `indices.len()` indices of an index buffer.
  pub fn index_buffer_update(
    &mut self,
    buffer: &IndexBuffer,
    indices: &[u32],
  ) -> Result<(), Error> {
    if indices.len() > buffer.count() {
      return Err(Error::constraint(format!(
        "{} indices do not fit in an index buffer of {}",
        indices.len(),
        buffer.count()
      )));
    }

    let mut mapping = self.index_buffer_map_write(buffer)?;

    {
      let mut cursor = mapping.cursor_mut()?;
      for &index in indices {
        cursor.put(index)?;
      }
    }

    self.index_buffer_unmap(mapping)
  }

  /// Delete an index buffer.
  pub fn index_buffer_delete(&mut self, buffer: &IndexBuffer) -> Result<(), Error> {
    self.check_current()?;
    buffer.handle().check_not_deleted()?;
    check_not_mapped(&buffer.mapped, buffer.handle())?;

    unsafe {
      self
        .backend
        .delete_buffer(BufferTarget::Index, buffer.handle().id())?
    };
    debug!("delete index buffer {}", buffer.handle().id());

    buffer.handle().mark_deleted()
  }
}
