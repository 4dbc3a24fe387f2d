//! Buffer descriptors.
//!
//! A [`BufferDescriptor`] describes the layout of one element of an array buffer as an ordered
//! list of named attributes. Attributes are interleaved: the byte offset of an attribute is the sum
//! of the sizes of the attributes preceding it and the stride of an element is the sum of the
//! sizes of all attributes.

use crate::error::Error;
use crate::scalar::ScalarType;
use std::fmt;

/// A named attribute of a buffer element.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BufferAttribute {
  name: String,
  ty: ScalarType,
  components: usize,
  offset: usize,
}

impl BufferAttribute {
  /// Name of the attribute.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Scalar type of each component.
  pub fn scalar_type(&self) -> ScalarType {
    self.ty
  }

  /// Number of components (1 to 4).
  pub fn components(&self) -> usize {
    self.components
  }

  /// Byte offset of the attribute within an element.
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// Size of the attribute, in bytes.
  pub fn size_bytes(&self) -> usize {
    self.ty.size_bytes() * self.components
  }
}

impl fmt::Display for BufferAttribute {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} {}×{}", self.name, self.ty, self.components)
  }
}

/// Layout of the elements of an array buffer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BufferDescriptor {
  attributes: Vec<BufferAttribute>,
  stride: usize,
}

impl BufferDescriptor {
  /// Start describing a layout.
  pub fn builder() -> BufferDescriptorBuilder {
    BufferDescriptorBuilder {
      attributes: Vec::new(),
    }
  }

  /// Size of one element, in bytes.
  pub fn stride(&self) -> usize {
    self.stride
  }

  /// All attributes, in declaration order.
  pub fn attributes(&self) -> &[BufferAttribute] {
    &self.attributes
  }

  /// Look an attribute up by name.
  pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
    self.attributes.iter().find(|a| a.name == name)
  }

  /// Look an attribute up by name, failing with [`Error::AttributeNotFound`].
  pub fn attribute_checked(&self, name: &str) -> Result<&BufferAttribute, Error> {
    self.attribute(name).ok_or_else(|| Error::AttributeNotFound {
      name: name.to_owned(),
    })
  }
}

/// Builder of [`BufferDescriptor`].
#[derive(Clone, Debug, Default)]
pub struct BufferDescriptorBuilder {
  attributes: Vec<(String, ScalarType, usize)>,
}

impl BufferDescriptorBuilder {
  /// Append an attribute.
  pub fn attribute(mut self, name: impl Into<String>, ty: ScalarType, components: usize) -> Self {
    self.attributes.push((name.into(), ty, components));
    self
  }

  /// Compute offsets and stride.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if there is no attribute, if two attributes share
  /// a name or if a component count is not in `1..=4`.
  pub fn build(self) -> Result<BufferDescriptor, Error> {
    if self.attributes.is_empty() {
      return Err(Error::constraint("a buffer descriptor needs at least one attribute"));
    }

    let mut attributes: Vec<BufferAttribute> = Vec::with_capacity(self.attributes.len());
    let mut offset = 0;

    for (name, ty, components) in self.attributes {
      if !(1..=4).contains(&components) {
        return Err(Error::constraint(format!(
          "attribute {} has {} components; must be in [1, 4]",
          name, components
        )));
      }

      if attributes.iter().any(|a| a.name == name) {
        return Err(Error::constraint(format!(
          "attribute {} is declared more than once",
          name
        )));
      }

      let attribute = BufferAttribute {
        name,
        ty,
        components,
        offset,
      };

      offset += attribute.size_bytes();
      attributes.push(attribute);
    }

    Ok(BufferDescriptor {
      attributes,
      stride: offset,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interleaved_offsets() {
    let desc = BufferDescriptor::builder()
      .attribute("position", ScalarType::Float, 3)
      .attribute("normal", ScalarType::Float, 3)
      .attribute("uv", ScalarType::Float, 2)
      .attribute("id", ScalarType::UnsignedShort, 1)
      .build()
      .unwrap();

    assert_eq!(desc.stride(), 34);
    assert_eq!(desc.attribute("position").unwrap().offset(), 0);
    assert_eq!(desc.attribute("normal").unwrap().offset(), 12);
    assert_eq!(desc.attribute("uv").unwrap().offset(), 24);
    assert_eq!(desc.attribute("id").unwrap().offset(), 32);
  }

  #[test]
  fn duplicate_names() {
    let r = BufferDescriptor::builder()
      .attribute("position", ScalarType::Float, 3)
      .attribute("position", ScalarType::Float, 2)
      .build();

    assert!(matches!(r, Err(Error::ConstraintViolation(_))));
  }

  #[test]
  fn component_count() {
    let r = BufferDescriptor::builder()
      .attribute("color", ScalarType::UnsignedByte, 5)
      .build();

    assert!(matches!(r, Err(Error::ConstraintViolation(_))));
    assert!(matches!(
      BufferDescriptor::builder().build(),
      Err(Error::ConstraintViolation(_))
    ));
  }

  #[test]
  fn missing_attribute() {
    let desc = BufferDescriptor::builder()
      .attribute("position", ScalarType::Float, 3)
      .build()
      .unwrap();

    assert_eq!(
      desc.attribute_checked("uv"),
      Err(Error::AttributeNotFound {
        name: "uv".to_owned()
      })
    );
  }
}
