//! Scalar types of buffer attributes and indices.

use std::fmt;

/// Type of a scalar stored in a buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarType {
  /// Signed 8-bit integer.
  Byte,
  /// Unsigned 8-bit integer.
  UnsignedByte,
  /// Signed 16-bit integer.
  Short,
  /// Unsigned 16-bit integer.
  UnsignedShort,
  /// Signed 32-bit integer.
  Int,
  /// Unsigned 32-bit integer.
  UnsignedInt,
  /// 16-bit floating point.
  HalfFloat,
  /// 32-bit floating point.
  Float,
}

impl ScalarType {
  /// Size of one scalar, in bytes.
  pub fn size_bytes(self) -> usize {
    match self {
      ScalarType::Byte | ScalarType::UnsignedByte => 1,
      ScalarType::Short | ScalarType::UnsignedShort | ScalarType::HalfFloat => 2,
      ScalarType::Int | ScalarType::UnsignedInt | ScalarType::Float => 4,
    }
  }

  /// Whether the type is an integer type.
  pub fn is_integral(self) -> bool {
    !matches!(self, ScalarType::HalfFloat | ScalarType::Float)
  }

  /// Whether the type is an unsigned integer type.
  pub fn is_unsigned(self) -> bool {
    matches!(
      self,
      ScalarType::UnsignedByte | ScalarType::UnsignedShort | ScalarType::UnsignedInt
    )
  }
}

impl fmt::Display for ScalarType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let name = match *self {
      ScalarType::Byte => "byte",
      ScalarType::UnsignedByte => "unsigned byte",
      ScalarType::Short => "short",
      ScalarType::UnsignedShort => "unsigned short",
      ScalarType::Int => "int",
      ScalarType::UnsignedInt => "unsigned int",
      ScalarType::HalfFloat => "half float",
      ScalarType::Float => "float",
    };

    f.write_str(name)
  }
}
