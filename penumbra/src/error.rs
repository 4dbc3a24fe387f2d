//! Errors.
//!
//! Every fallible operation in this crate returns [`Error`]. Variants carry enough context (the
//! resource name, the driver log, the list of valid names…) to be reported as-is to a user.

use crate::framebuffer::FramebufferStatus;
use crate::handle::ResourceKind;
use crate::shader::ShaderType;
use std::{error, fmt, time::Duration};

/// Errors that might happen when using resources, programs and contexts.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
  /// The resource was deleted and cannot be used anymore.
  ResourceDeleted {
    /// Kind of resource.
    kind: ResourceKind,
    /// Driver name of the resource.
    id: u32,
  },
  /// The resource cannot be deleted (default objects).
  ObjectNotDeletable {
    /// Kind of resource.
    kind: ResourceKind,
  },
  /// A precondition was not met: invalid argument, wrong state, feedback loop, etc.
  ConstraintViolation(String),
  /// A size was rejected (zero element count, texture too small, etc.).
  InvalidSize(String),
  /// An index fell outside of a valid range.
  Range {
    /// Index that was accessed.
    index: usize,
    /// Exclusive upper bound of the range.
    len: usize,
  },
  /// A shader failed to compile or a program failed to link.
  ProgramCompile {
    /// Name of the shader or program.
    name: String,
    /// Log, verbatim from the driver.
    log: String,
  },
  /// A uniform is not part of the program.
  UnknownUniform {
    /// Name that was asked for.
    name: String,
    /// Every uniform the program actually has.
    valid: Vec<String>,
  },
  /// An attribute is not part of the program.
  UnknownAttribute {
    /// Name that was asked for.
    name: String,
    /// Every attribute the program actually has.
    valid: Vec<String>,
  },
  /// A value was submitted for a uniform or attribute with an incompatible type.
  UniformTypeMismatch {
    /// Name of the uniform or attribute.
    name: String,
    /// Type declared in the program.
    expected: ShaderType,
    /// Type of the submitted value.
    actual: ShaderType,
  },
  /// Some uniforms or attributes were not assigned before a draw.
  IncompleteBinding {
    /// Uniforms not assigned.
    uniforms: Vec<String>,
    /// Attributes not assigned.
    attributes: Vec<String>,
  },
  /// A buffer descriptor has no attribute with that name.
  AttributeNotFound {
    /// Name of the attribute.
    name: String,
  },
  /// A buffer attribute does not have the type a cursor or a binding requires.
  AttributeTypeMismatch {
    /// Name of the attribute.
    name: String,
    /// Required type.
    expected: String,
    /// Actual type.
    actual: String,
  },
  /// The implementation reported a capability outside of the range required.
  NonCompliantImplementation(String),
  /// A framebuffer is not complete.
  FramebufferIncomplete(FramebufferStatus),
  /// The context is not current on the calling thread.
  ContextNotCurrent,
  /// A blocking operation did not finish in time.
  Timeout(Duration),
  /// An asynchronous operation was cancelled before running.
  Cancelled,
  /// Input/output failure (shader sources, etc.).
  Io(String),
  /// The driver reported an error.
  Driver(String),
}

impl Error {
  /// The resource was deleted.
  pub fn deleted(kind: ResourceKind, id: u32) -> Self {
    Error::ResourceDeleted { kind, id }
  }

  /// A precondition failed.
  pub fn constraint(reason: impl Into<String>) -> Self {
    Error::ConstraintViolation(reason.into())
  }

  /// Invalid size.
  pub fn invalid_size(reason: impl Into<String>) -> Self {
    Error::InvalidSize(reason.into())
  }

  /// Out of range index.
  pub fn range(index: usize, len: usize) -> Self {
    Error::Range { index, len }
  }

  /// Compilation or link failure.
  pub fn compile(name: impl Into<String>, log: impl Into<String>) -> Self {
    Error::ProgramCompile {
      name: name.into(),
      log: log.into(),
    }
  }

  /// Non-compliant implementation.
  pub fn non_compliant(reason: impl Into<String>) -> Self {
    Error::NonCompliantImplementation(reason.into())
  }

  /// Driver error.
  pub fn driver(reason: impl Into<String>) -> Self {
    Error::Driver(reason.into())
  }

  /// Attribute type mismatch.
  pub fn attribute_type_mismatch(
    name: impl Into<String>,
    expected: impl fmt::Display,
    actual: impl fmt::Display,
  ) -> Self {
    Error::AttributeTypeMismatch {
      name: name.into(),
      expected: expected.to_string(),
      actual: actual.to_string(),
    }
  }
}

fn write_names(f: &mut fmt::Formatter, names: &[String]) -> fmt::Result {
  for name in names {
    write!(f, "\n  {}", name)?;
  }

  Ok(())
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Error::ResourceDeleted { kind, id } => {
        write!(f, "{} {} has been deleted", kind, id)
      }

      Error::ObjectNotDeletable { kind } => write!(f, "default {} cannot be deleted", kind),

      Error::ConstraintViolation(ref reason) => write!(f, "constraint violation: {}", reason),

      Error::InvalidSize(ref reason) => write!(f, "invalid size: {}", reason),

      Error::Range { index, len } => {
        write!(f, "index {} out of range [0, {})", index, len)
      }

      Error::ProgramCompile { ref name, ref log } => {
        write!(f, "{}: compilation failed:\n{}", name, log)
      }

      Error::UnknownUniform { ref name, ref valid } => {
        write!(
          f,
          "the program does not contain an active uniform {}\nActive uniforms:",
          name
        )?;
        write_names(f, valid)
      }

      Error::UnknownAttribute { ref name, ref valid } => {
        write!(
          f,
          "the program does not contain an active attribute {}\nActive attributes:",
          name
        )?;
        write_names(f, valid)
      }

      Error::UniformTypeMismatch {
        ref name,
        expected,
        actual,
      } => write!(
        f,
        "type error for {}: expected {}, got {}",
        name, expected, actual
      ),

      Error::IncompleteBinding {
        ref uniforms,
        ref attributes,
      } => {
        f.write_str("program validation failed")?;

        if !uniforms.is_empty() {
          f.write_str("\nuniforms not assigned values:")?;
          write_names(f, uniforms)?;
        }

        if !attributes.is_empty() {
          f.write_str("\nattributes not assigned values:")?;
          write_names(f, attributes)?;
        }

        Ok(())
      }

      Error::AttributeNotFound { ref name } => write!(f, "no such attribute: {}", name),

      Error::AttributeTypeMismatch {
        ref name,
        ref expected,
        ref actual,
      } => write!(
        f,
        "attribute {} has type {}, but {} was required",
        name, actual, expected
      ),

      Error::NonCompliantImplementation(ref reason) => {
        write!(f, "non-compliant implementation: {}", reason)
      }

      Error::FramebufferIncomplete(status) => write!(f, "incomplete framebuffer: {}", status),

      Error::ContextNotCurrent => f.write_str("context is not current on this thread"),

      Error::Timeout(duration) => write!(f, "timed out after {:?}", duration),

      Error::Cancelled => f.write_str("operation cancelled"),

      Error::Io(ref reason) => write!(f, "I/O error: {}", reason),

      Error::Driver(ref reason) => write!(f, "driver error: {}", reason),
    }
  }
}

impl error::Error for Error {}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Error::Io(e.to_string())
  }
}
