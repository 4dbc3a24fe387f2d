//! Array objects.
//!
//! An [`ArrayObject`] associates an optional index buffer and, for each attribute location, an
//! array buffer along with the layout to read it with. Array objects are immutable: they are
//! described with an [`ArrayObjectBuilder`] which is consumed by
//! [`Context::array_object_allocate`]. To change an array object, create a builder from it with
//! [`Context::array_object_new_builder_from`] and allocate a new one.
//!
//! Each context has a default array object that has no attributes, cannot be deleted and is bound
//! whenever no other array object is.

use crate::backend::array_object::ArrayObject as _;
use crate::backend::Backend;
use crate::buffer::{ArrayBuffer, IndexBuffer};
use crate::context::Context;
use crate::error::Error;
use crate::handle::{impl_Resource, Handle, Resource, ResourceKind};
use crate::scalar::ScalarType;
use log::{debug, trace};
use std::sync::Arc;

/// How the shader sees an attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeKind {
  /// Converted to floating point, optionally normalized.
  FloatingPoint {
    /// Whether integer values are mapped to `[0, 1]` (or `[-1, 1]`).
    normalized: bool,
  },
  /// Kept as integers.
  Integral,
}

/// Where and how to read an attribute in a buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AttributeLayout {
  /// Floating point or integral.
  pub kind: AttributeKind,
  /// Number of components (1 to 4).
  pub components: usize,
  /// Type of each component in the buffer.
  pub scalar_type: ScalarType,
  /// Bytes between two consecutive values.
  pub stride: usize,
  /// Byte offset of the first value.
  pub offset: usize,
  /// Per-instance step rate; `0` steps per vertex.
  pub divisor: u32,
}

/// An attribute sourced from an array buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
  buffer: ArrayBuffer,
  layout: AttributeLayout,
}

impl VertexAttribute {
  /// Buffer the attribute is read from.
  pub fn buffer(&self) -> &ArrayBuffer {
    &self.buffer
  }

  /// Layout of the attribute.
  pub fn layout(&self) -> &AttributeLayout {
    &self.layout
  }
}

/// An immutable association of an index buffer and vertex attributes.
#[derive(Clone, Debug)]
pub struct ArrayObject {
  handle: Handle,
  index_buffer: Option<IndexBuffer>,
  attributes: Arc<Vec<Option<VertexAttribute>>>,
}

impl_Resource!(ArrayObject);

impl PartialEq for ArrayObject {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for ArrayObject {}

impl ArrayObject {
  pub(crate) fn default_object(max_attributes: u32) -> Self {
    ArrayObject {
      handle: Handle::new(ResourceKind::ArrayObject, 0),
      index_buffer: None,
      attributes: Arc::new(vec![None; max_attributes as usize]),
    }
  }

  /// Index buffer, if any.
  pub fn index_buffer(&self) -> Option<&IndexBuffer> {
    self.index_buffer.as_ref()
  }

  /// Attribute at `location`, if enabled.
  pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
    self
      .attributes
      .get(location as usize)
      .and_then(Option::as_ref)
  }

  /// Every location, enabled or not.
  pub fn attributes(&self) -> &[Option<VertexAttribute>] {
    &self.attributes
  }

  /// Fail if the array object or any buffer it references has been deleted.
  pub fn check_references(&self) -> Result<(), Error> {
    self.handle.check_not_deleted()?;

    if let Some(ref index_buffer) = self.index_buffer {
      index_buffer.handle().check_not_deleted()?;
    }

    for attribute in self.attributes.iter().flatten() {
      attribute.buffer.handle().check_not_deleted()?;
    }

    Ok(())
  }
}

/// Mutable description of an array object.
#[derive(Debug)]
pub struct ArrayObjectBuilder {
  strict: bool,
  index_buffer: Option<IndexBuffer>,
  attributes: Vec<Option<VertexAttribute>>,
}

impl ArrayObjectBuilder {
  fn new(max_attributes: u32, strict: bool) -> Self {
    ArrayObjectBuilder {
      strict,
      index_buffer: None,
      attributes: vec![None; max_attributes as usize],
    }
  }

  /// Number of attribute locations available.
  pub fn max_attributes(&self) -> u32 {
    self.attributes.len() as u32
  }

  /// Whether assigning an already assigned location is an error.
  pub fn is_strict(&self) -> bool {
    self.strict
  }

  /// Index buffer, if any.
  pub fn index_buffer(&self) -> Option<&IndexBuffer> {
    self.index_buffer.as_ref()
  }

  /// Attribute at `location`, if enabled.
  pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
    self
      .attributes
      .get(location as usize)
      .and_then(Option::as_ref)
  }

  /// Use an index buffer.
  pub fn set_index_buffer(&mut self, index_buffer: &IndexBuffer) -> Result<(), Error> {
    index_buffer.handle().check_not_deleted()?;
    self.index_buffer = Some(index_buffer.clone());
    Ok(())
  }

  /// Do not use an index buffer.
  pub fn set_no_index_buffer(&mut self) {
    self.index_buffer = None;
  }

  /// Source a floating point attribute.
  #[allow(clippy::too_many_arguments)]
  pub fn set_attribute_floating_point(
    &mut self,
    location: u32,
    buffer: &ArrayBuffer,
    components: usize,
    scalar_type: ScalarType,
    stride: usize,
    offset: usize,
    normalized: bool,
  ) -> Result<(), Error> {
    self.set_attribute_floating_point_with_divisor(
      location,
      buffer,
      components,
      scalar_type,
      stride,
      offset,
      normalized,
      0,
    )
  }

  /// Source a floating point attribute stepping per instance.
  #[allow(clippy::too_many_arguments)]
  pub fn set_attribute_floating_point_with_divisor(
    &mut self,
    location: u32,
    buffer: &ArrayBuffer,
    components: usize,
    scalar_type: ScalarType,
    stride: usize,
    offset: usize,
    normalized: bool,
    divisor: u32,
  ) -> Result<(), Error> {
    let layout = AttributeLayout {
      kind: AttributeKind::FloatingPoint { normalized },
      components,
      scalar_type,
      stride,
      offset,
      divisor,
    };

    self.set_attribute(location, buffer, layout)
  }

  /// Source an integral attribute.
  pub fn set_attribute_integral(
    &mut self,
    location: u32,
    buffer: &ArrayBuffer,
    components: usize,
    scalar_type: ScalarType,
    stride: usize,
    offset: usize,
  ) -> Result<(), Error> {
    self.set_attribute_integral_with_divisor(
      location,
      buffer,
      components,
      scalar_type,
      stride,
      offset,
      0,
    )
  }

  /// Source an integral attribute stepping per instance.
  #[allow(clippy::too_many_arguments)]
  pub fn set_attribute_integral_with_divisor(
    &mut self,
    location: u32,
    buffer: &ArrayBuffer,
    components: usize,
    scalar_type: ScalarType,
    stride: usize,
    offset: usize,
    divisor: u32,
  ) -> Result<(), Error> {
    if !scalar_type.is_integral() {
      return Err(Error::constraint(format!(
        "integral attribute {} cannot have type {}",
        location, scalar_type
      )));
    }

    let layout = AttributeLayout {
      kind: AttributeKind::Integral,
      components,
      scalar_type,
      stride,
      offset,
      divisor,
    };

    self.set_attribute(location, buffer, layout)
  }

  /// Source an attribute with the layout a buffer descriptor gives to `name`.
  ///
  /// Floating point attributes stay floating point; integer attributes are integral.
  pub fn set_attribute_from_buffer(
    &mut self,
    location: u32,
    buffer: &ArrayBuffer,
    name: &str,
  ) -> Result<(), Error> {
    let descriptor = buffer.descriptor();
    let attribute = descriptor.attribute_checked(name)?;
    let scalar_type = attribute.scalar_type();
    let kind = if scalar_type.is_integral() {
      AttributeKind::Integral
    } else {
      AttributeKind::FloatingPoint { normalized: false }
    };

    let layout = AttributeLayout {
      kind,
      components: attribute.components(),
      scalar_type,
      stride: descriptor.stride(),
      offset: attribute.offset(),
      divisor: 0,
    };

    self.set_attribute(location, buffer, layout)
  }

  /// Disable the attribute at `location`.
  pub fn disable_attribute(&mut self, location: u32) -> Result<(), Error> {
    let max = self.attributes.len();
    let slot = self
      .attributes
      .get_mut(location as usize)
      .ok_or_else(|| Error::range(location as usize, max))?;

    *slot = None;
    Ok(())
  }

  /// Disable every attribute and drop the index buffer.
  pub fn reset(&mut self) {
    self.index_buffer = None;

    for slot in &mut self.attributes {
      *slot = None;
    }
  }

  fn set_attribute(
    &mut self,
    location: u32,
    buffer: &ArrayBuffer,
    layout: AttributeLayout,
  ) -> Result<(), Error> {
    let max = self.attributes.len();

    if location as usize >= max {
      return Err(Error::range(location as usize, max));
    }

    buffer.handle().check_not_deleted()?;

    if !(1..=4).contains(&layout.components) {
      return Err(Error::constraint(format!(
        "attribute {} has {} components; must be in [1, 4]",
        location, layout.components
      )));
    }

    if layout.offset >= buffer.size_bytes() {
      return Err(Error::range(layout.offset, buffer.size_bytes()));
    }

    let slot = &mut self.attributes[location as usize];

    if self.strict && slot.is_some() {
      return Err(Error::constraint(format!(
        "attribute {} has already been assigned",
        location
      )));
    }

    match layout.kind {
      AttributeKind::FloatingPoint { normalized } => trace!(
        "[{}]: attr {} floating type:{}/{} norm:{} off:{} stride:{} div:{}",
        buffer.handle().id(),
        location,
        layout.scalar_type,
        layout.components,
        normalized,
        layout.offset,
        layout.stride,
        layout.divisor
      ),

      AttributeKind::Integral => trace!(
        "[{}]: attr {} integral type:{}/{} off:{} stride:{} div:{}",
        buffer.handle().id(),
        location,
        layout.scalar_type,
        layout.components,
        layout.offset,
        layout.stride,
        layout.divisor
      ),
    }

    *slot = Some(VertexAttribute {
      buffer: buffer.clone(),
      layout,
    });

    Ok(())
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Start describing an array object.
  pub fn array_object_new_builder(&self) -> ArrayObjectBuilder {
    ArrayObjectBuilder::new(
      self.capabilities().max_vertex_attribs(),
      self.opt().strict_array_objects(),
    )
  }

  /// Start describing an array object from the description of an existing one.
  pub fn array_object_new_builder_from(
    &self,
    array_object: &ArrayObject,
  ) -> Result<ArrayObjectBuilder, Error> {
    array_object.handle().check_not_deleted()?;

    let mut builder = self.array_object_new_builder();
    builder.index_buffer = array_object.index_buffer.clone();

    for (slot, attribute) in builder.attributes.iter_mut().zip(array_object.attributes.iter()) {
      *slot = attribute.clone();
    }

    Ok(builder)
  }

  /// Create an array object from a builder.
  ///
  /// The new array object is left bound.
  pub fn array_object_allocate(
    &mut self,
    builder: ArrayObjectBuilder,
  ) -> Result<ArrayObject, Error> {
    self.check_current()?;

    if let Some(ref index_buffer) = builder.index_buffer {
      index_buffer.handle().check_not_deleted()?;
    }

    for attribute in builder.attributes.iter().flatten() {
      attribute.buffer.handle().check_not_deleted()?;
    }

    let id = unsafe {
      self
        .backend
        .new_array_object(builder.index_buffer.as_ref(), &builder.attributes)?
    };
    debug!("allocated array object {}", id);

    let array_object = ArrayObject {
      handle: Handle::new(ResourceKind::ArrayObject, id),
      index_buffer: builder.index_buffer,
      attributes: Arc::new(builder.attributes),
    };

    self.state.array_object = array_object.clone();
    Ok(array_object)
  }

  /// Bind an array object.
  pub fn array_object_bind(&mut self, array_object: &ArrayObject) -> Result<(), Error> {
    self.check_current()?;
    array_object.handle().check_not_deleted()?;

    unsafe { self.backend.bind_array_object(array_object.handle().id())? };
    trace!("bind array object {}", array_object.handle().id());
    self.state.array_object = array_object.clone();

    Ok(())
  }

  /// Bind the default array object.
  pub fn array_object_unbind(&mut self) -> Result<(), Error> {
    let default = self.state.default_array_object.clone();
    self.array_object_bind(&default)
  }

  /// The bound array object.
  pub fn array_object_current(&self) -> &ArrayObject {
    &self.state.array_object
  }

  /// The default array object.
  pub fn array_object_default(&self) -> &ArrayObject {
    &self.state.default_array_object
  }

  /// Whether `array_object` is bound.
  pub fn array_object_is_bound(&self, array_object: &ArrayObject) -> Result<bool, Error> {
    self.check_current()?;
    array_object.handle().check_not_deleted()?;

    Ok(self.state.array_object == *array_object)
  }

  /// Delete an array object; the default array object is bound if it was bound.
  ///
  /// The buffers it references are not deleted.
  pub fn array_object_delete(&mut self, array_object: &ArrayObject) -> Result<(), Error> {
    self.check_current()?;

    if *array_object == self.state.default_array_object {
      return Err(Error::ObjectNotDeletable {
        kind: ResourceKind::ArrayObject,
      });
    }

    array_object.handle().check_not_deleted()?;

    if self.state.array_object == *array_object {
      self.array_object_unbind()?;
    }

    unsafe {
      self
        .backend
        .delete_array_object(array_object.handle().id())?
    };
    debug!("delete array object {}", array_object.handle().id());

    array_object.handle().mark_deleted()
  }
}
