//! Shader backend interface.
//!
//! This interface defines the low-level API shaders and programs must implement to be usable.

use crate::error::Error;
use crate::shader::{ProgramReflection, ShaderStage, UniformValue};

/// Shader backend.
pub unsafe trait Shader {
  /// Compile a shader from its source lines.
  ///
  /// Fails with [`Error::ProgramCompile`] carrying `name` and the compiler log.
  unsafe fn new_shader(
    &mut self,
    stage: ShaderStage,
    name: &str,
    lines: &[String],
  ) -> Result<u32, Error>;

  /// Delete a shader.
  unsafe fn delete_shader(&mut self, shader: u32) -> Result<(), Error>;

  /// Link a program and reflect its active uniforms and attributes.
  ///
  /// Fails with [`Error::ProgramCompile`] carrying `name` and the linker log.
  unsafe fn new_program(
    &mut self,
    name: &str,
    shaders: &[u32],
  ) -> Result<(u32, ProgramReflection), Error>;

  /// Delete a program.
  unsafe fn delete_program(&mut self, program: u32) -> Result<(), Error>;

  /// Make a program current; `0` deactivates.
  unsafe fn use_program(&mut self, program: u32) -> Result<(), Error>;

  /// Set a uniform of the current program.
  unsafe fn set_uniform(&mut self, location: i32, value: &UniformValue) -> Result<(), Error>;

  /// Set a constant value for an attribute not sourced from a buffer.
  unsafe fn set_attribute_value(&mut self, location: u32, value: &UniformValue)
    -> Result<(), Error>;
}
