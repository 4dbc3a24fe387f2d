//! Shaders and programs.
//!
//! Shaders are compiled from source lines with a human-readable name used in diagnostics. A
//! [`Program`] is linked from at least one vertex shader and one fragment shader, optionally with
//! geometry shaders. Linking reflects every active uniform and attribute of the program into two
//! immutable name-keyed maps; relinking builds new maps rather than changing existing ones.
//!
//! Deleting a program does not delete its shaders.

use crate::backend::shader::Shader as _;
use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::handle::{impl_Resource, Handle, Resource, ResourceKind};
use crate::scalar::ScalarType;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Pipeline stage of a shader.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderStage {
  /// Vertex shader.
  Vertex,
  /// Geometry shader.
  Geometry,
  /// Fragment shader.
  Fragment,
}

impl fmt::Display for ShaderStage {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ShaderStage::Vertex => f.write_str("vertex"),
      ShaderStage::Geometry => f.write_str("geometry"),
      ShaderStage::Fragment => f.write_str("fragment"),
    }
  }
}

/// Type of a uniform or attribute, as declared in GLSL.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderType {
  // scalars
  /// Boolean.
  Bool,
  /// 32-bit signed integer.
  Int,
  /// 32-bit unsigned integer.
  UInt,
  /// 32-bit floating-point number.
  Float,

  // vectors
  /// 2D boolean vector.
  BVec2,
  /// 3D boolean vector.
  BVec3,
  /// 4D boolean vector.
  BVec4,
  /// 2D signed integral vector.
  IVec2,
  /// 3D signed integral vector.
  IVec3,
  /// 4D signed integral vector.
  IVec4,
  /// 2D unsigned integral vector.
  UVec2,
  /// 3D unsigned integral vector.
  UVec3,
  /// 4D unsigned integral vector.
  UVec4,
  /// 2D floating-point vector.
  Vec2,
  /// 3D floating-point vector.
  Vec3,
  /// 4D floating-point vector.
  Vec4,

  // matrices
  /// 2×2 floating-point matrix.
  Mat2,
  /// 3×3 floating-point matrix.
  Mat3,
  /// 4×4 floating-point matrix.
  Mat4,
  /// 2 columns × 3 rows floating-point matrix.
  Mat2x3,
  /// 2 columns × 4 rows floating-point matrix.
  Mat2x4,
  /// 3 columns × 2 rows floating-point matrix.
  Mat3x2,
  /// 3 columns × 4 rows floating-point matrix.
  Mat3x4,
  /// 4 columns × 2 rows floating-point matrix.
  Mat4x2,
  /// 4 columns × 3 rows floating-point matrix.
  Mat4x3,

  // textures
  /// 2D texture sampler.
  Sampler2D,
  /// 3D texture sampler.
  Sampler3D,
  /// Cubemap sampler.
  SamplerCube,
}

/// Class of the components of a scalar or vector type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComponentClass {
  /// Booleans.
  Bool,
  /// Signed integers.
  Int,
  /// Unsigned integers.
  UInt,
  /// Floating point numbers.
  Float,
}

impl ShaderType {
  /// Every type.
  pub const ALL: [ShaderType; 28] = [
    ShaderType::Bool,
    ShaderType::Int,
    ShaderType::UInt,
    ShaderType::Float,
    ShaderType::BVec2,
    ShaderType::BVec3,
    ShaderType::BVec4,
    ShaderType::IVec2,
    ShaderType::IVec3,
    ShaderType::IVec4,
    ShaderType::UVec2,
    ShaderType::UVec3,
    ShaderType::UVec4,
    ShaderType::Vec2,
    ShaderType::Vec3,
    ShaderType::Vec4,
    ShaderType::Mat2,
    ShaderType::Mat3,
    ShaderType::Mat4,
    ShaderType::Mat2x3,
    ShaderType::Mat2x4,
    ShaderType::Mat3x2,
    ShaderType::Mat3x4,
    ShaderType::Mat4x2,
    ShaderType::Mat4x3,
    ShaderType::Sampler2D,
    ShaderType::Sampler3D,
    ShaderType::SamplerCube,
  ];

  /// GLSL name of the type.
  pub fn glsl_name(self) -> &'static str {
    match self {
      ShaderType::Bool => "bool",
      ShaderType::Int => "int",
      ShaderType::UInt => "uint",
      ShaderType::Float => "float",
      ShaderType::BVec2 => "bvec2",
      ShaderType::BVec3 => "bvec3",
      ShaderType::BVec4 => "bvec4",
      ShaderType::IVec2 => "ivec2",
      ShaderType::IVec3 => "ivec3",
      ShaderType::IVec4 => "ivec4",
      ShaderType::UVec2 => "uvec2",
      ShaderType::UVec3 => "uvec3",
      ShaderType::UVec4 => "uvec4",
      ShaderType::Vec2 => "vec2",
      ShaderType::Vec3 => "vec3",
      ShaderType::Vec4 => "vec4",
      ShaderType::Mat2 => "mat2",
      ShaderType::Mat3 => "mat3",
      ShaderType::Mat4 => "mat4",
      ShaderType::Mat2x3 => "mat2x3",
      ShaderType::Mat2x4 => "mat2x4",
      ShaderType::Mat3x2 => "mat3x2",
      ShaderType::Mat3x4 => "mat3x4",
      ShaderType::Mat4x2 => "mat4x2",
      ShaderType::Mat4x3 => "mat4x3",
      ShaderType::Sampler2D => "sampler2D",
      ShaderType::Sampler3D => "sampler3D",
      ShaderType::SamplerCube => "samplerCube",
    }
  }

  /// Parse a GLSL type name.
  ///
  /// `mat2x2`, `mat3x3` and `mat4x4` are accepted as aliases.
  pub fn from_glsl_name(name: &str) -> Option<Self> {
    match name {
      "mat2x2" => Some(ShaderType::Mat2),
      "mat3x3" => Some(ShaderType::Mat3),
      "mat4x4" => Some(ShaderType::Mat4),
      _ => Self::ALL.iter().copied().find(|ty| ty.glsl_name() == name),
    }
  }

  /// Whether the type is a sampler.
  pub fn is_sampler(self) -> bool {
    matches!(
      self,
      ShaderType::Sampler2D | ShaderType::Sampler3D | ShaderType::SamplerCube
    )
  }

  /// Whether a value of type `other` can be assigned to a variable of this type.
  ///
  /// Types are compatible with themselves; samplers are compatible with each other.
  pub fn is_compatible(self, other: ShaderType) -> bool {
    self == other || (self.is_sampler() && other.is_sampler())
  }

  /// Component class and count of scalar and vector types.
  ///
  /// Matrices and samplers have none.
  pub fn vector(self) -> Option<(ComponentClass, usize)> {
    let v = match self {
      ShaderType::Bool => (ComponentClass::Bool, 1),
      ShaderType::BVec2 => (ComponentClass::Bool, 2),
      ShaderType::BVec3 => (ComponentClass::Bool, 3),
      ShaderType::BVec4 => (ComponentClass::Bool, 4),
      ShaderType::Int => (ComponentClass::Int, 1),
      ShaderType::IVec2 => (ComponentClass::Int, 2),
      ShaderType::IVec3 => (ComponentClass::Int, 3),
      ShaderType::IVec4 => (ComponentClass::Int, 4),
      ShaderType::UInt => (ComponentClass::UInt, 1),
      ShaderType::UVec2 => (ComponentClass::UInt, 2),
      ShaderType::UVec3 => (ComponentClass::UInt, 3),
      ShaderType::UVec4 => (ComponentClass::UInt, 4),
      ShaderType::Float => (ComponentClass::Float, 1),
      ShaderType::Vec2 => (ComponentClass::Float, 2),
      ShaderType::Vec3 => (ComponentClass::Float, 3),
      ShaderType::Vec4 => (ComponentClass::Float, 4),
      _ => return None,
    };

    Some(v)
  }

  /// Whether an attribute of this type can be sourced from buffer data of `components` values of
  /// type `scalar_type`.
  ///
  /// Floating point attributes need floating point data, signed integer attributes need signed
  /// integers and unsigned integer attributes need unsigned integers.
  pub fn accepts_buffer_data(self, scalar_type: ScalarType, components: usize) -> bool {
    match self.vector() {
      Some((class, count)) if count == components => match class {
        ComponentClass::Float => !scalar_type.is_integral(),
        ComponentClass::Int => scalar_type.is_integral() && !scalar_type.is_unsigned(),
        ComponentClass::UInt => scalar_type.is_unsigned(),
        ComponentClass::Bool => false,
      },

      _ => false,
    }
  }
}

impl fmt::Display for ShaderType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.glsl_name())
  }
}

/// A value that can be assigned to a uniform or used as a constant attribute.
///
/// Matrices are column-major: `Mat2x3` has two columns of three rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
  /// `bool`.
  Bool(bool),
  /// `bvec2`.
  BVec2([bool; 2]),
  /// `bvec3`.
  BVec3([bool; 3]),
  /// `bvec4`.
  BVec4([bool; 4]),
  /// `int`.
  Int(i32),
  /// `ivec2`.
  IVec2([i32; 2]),
  /// `ivec3`.
  IVec3([i32; 3]),
  /// `ivec4`.
  IVec4([i32; 4]),
  /// `uint`.
  UInt(u32),
  /// `uvec2`.
  UVec2([u32; 2]),
  /// `uvec3`.
  UVec3([u32; 3]),
  /// `uvec4`.
  UVec4([u32; 4]),
  /// `float`.
  Float(f32),
  /// `vec2`.
  Vec2([f32; 2]),
  /// `vec3`.
  Vec3([f32; 3]),
  /// `vec4`.
  Vec4([f32; 4]),
  /// `mat2`.
  Mat2([[f32; 2]; 2]),
  /// `mat3`.
  Mat3([[f32; 3]; 3]),
  /// `mat4`.
  Mat4([[f32; 4]; 4]),
  /// `mat2x3`.
  Mat2x3([[f32; 3]; 2]),
  /// `mat2x4`.
  Mat2x4([[f32; 4]; 2]),
  /// `mat3x2`.
  Mat3x2([[f32; 2]; 3]),
  /// `mat3x4`.
  Mat3x4([[f32; 4]; 3]),
  /// `mat4x2`.
  Mat4x2([[f32; 2]; 4]),
  /// `mat4x3`.
  Mat4x3([[f32; 3]; 4]),
  /// `sampler2D`, carrying the index of a texture unit.
  Sampler2D(u32),
  /// `sampler3D`, carrying the index of a texture unit.
  Sampler3D(u32),
  /// `samplerCube`, carrying the index of a texture unit.
  SamplerCube(u32),
}

impl UniformValue {
  /// Type of the value.
  pub fn ty(&self) -> ShaderType {
    match *self {
      UniformValue::Bool(_) => ShaderType::Bool,
      UniformValue::BVec2(_) => ShaderType::BVec2,
      UniformValue::BVec3(_) => ShaderType::BVec3,
      UniformValue::BVec4(_) => ShaderType::BVec4,
      UniformValue::Int(_) => ShaderType::Int,
      UniformValue::IVec2(_) => ShaderType::IVec2,
      UniformValue::IVec3(_) => ShaderType::IVec3,
      UniformValue::IVec4(_) => ShaderType::IVec4,
      UniformValue::UInt(_) => ShaderType::UInt,
      UniformValue::UVec2(_) => ShaderType::UVec2,
      UniformValue::UVec3(_) => ShaderType::UVec3,
      UniformValue::UVec4(_) => ShaderType::UVec4,
      UniformValue::Float(_) => ShaderType::Float,
      UniformValue::Vec2(_) => ShaderType::Vec2,
      UniformValue::Vec3(_) => ShaderType::Vec3,
      UniformValue::Vec4(_) => ShaderType::Vec4,
      UniformValue::Mat2(_) => ShaderType::Mat2,
      UniformValue::Mat3(_) => ShaderType::Mat3,
      UniformValue::Mat4(_) => ShaderType::Mat4,
      UniformValue::Mat2x3(_) => ShaderType::Mat2x3,
      UniformValue::Mat2x4(_) => ShaderType::Mat2x4,
      UniformValue::Mat3x2(_) => ShaderType::Mat3x2,
      UniformValue::Mat3x4(_) => ShaderType::Mat3x4,
      UniformValue::Mat4x2(_) => ShaderType::Mat4x2,
      UniformValue::Mat4x3(_) => ShaderType::Mat4x3,
      UniformValue::Sampler2D(_) => ShaderType::Sampler2D,
      UniformValue::Sampler3D(_) => ShaderType::Sampler3D,
      UniformValue::SamplerCube(_) => ShaderType::SamplerCube,
    }
  }

  /// Texture unit of a sampler value.
  pub fn texture_unit(&self) -> Option<u32> {
    match *self {
      UniformValue::Sampler2D(unit)
      | UniformValue::Sampler3D(unit)
      | UniformValue::SamplerCube(unit) => Some(unit),
      _ => None,
    }
  }
}

macro_rules! impl_UniformValue {
  ($($t:ty => $v:ident),* $(,)?) => {
    $(
      impl From<$t> for UniformValue {
        fn from(value: $t) -> Self {
          UniformValue::$v(value)
        }
      }
    )*
  };
}

impl_UniformValue!(
  bool => Bool,
  [bool; 2] => BVec2,
  [bool; 3] => BVec3,
  [bool; 4] => BVec4,
  i32 => Int,
  [i32; 2] => IVec2,
  [i32; 3] => IVec3,
  [i32; 4] => IVec4,
  u32 => UInt,
  [u32; 2] => UVec2,
  [u32; 3] => UVec3,
  [u32; 4] => UVec4,
  f32 => Float,
  [f32; 2] => Vec2,
  [f32; 3] => Vec3,
  [f32; 4] => Vec4,
  [[f32; 2]; 2] => Mat2,
  [[f32; 3]; 3] => Mat3,
  [[f32; 4]; 4] => Mat4,
  [[f32; 3]; 2] => Mat2x3,
  [[f32; 4]; 2] => Mat2x4,
  [[f32; 2]; 3] => Mat3x2,
  [[f32; 4]; 3] => Mat3x4,
  [[f32; 2]; 4] => Mat4x2,
  [[f32; 3]; 4] => Mat4x3,
);

/// A compiled shader.
#[derive(Clone, Debug)]
pub struct Shader {
  handle: Handle,
  name: String,
  stage: ShaderStage,
}

impl_Resource!(Shader);

impl PartialEq for Shader {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for Shader {}

impl AsRef<Shader> for Shader {
  fn as_ref(&self) -> &Shader {
    self
  }
}

impl Shader {
  /// Name given at compilation.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Stage of the shader.
  pub fn stage(&self) -> ShaderStage {
    self.stage
  }
}

macro_rules! shader_stage {
  ($(#[$doc:meta])* $t:ident, $stage:ident) => {
    $(#[$doc])*
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct $t(Shader);

    impl AsRef<Shader> for $t {
      fn as_ref(&self) -> &Shader {
        &self.0
      }
    }

    impl Resource for $t {
      fn handle(&self) -> &Handle {
        &self.0.handle
      }
    }

    impl $t {
      /// Name given at compilation.
      pub fn name(&self) -> &str {
        &self.0.name
      }

      /// The untyped shader.
      pub fn shader(&self) -> &Shader {
        &self.0
      }

      pub(crate) fn stage() -> ShaderStage {
        ShaderStage::$stage
      }

      pub(crate) fn wrap(shader: Shader) -> Self {
        $t(shader)
      }
    }
  };
}

shader_stage!(
  /// A compiled vertex shader.
  VertexShader,
  Vertex
);

shader_stage!(
  /// A compiled geometry shader.
  GeometryShader,
  Geometry
);

shader_stage!(
  /// A compiled fragment shader.
  FragmentShader,
  Fragment
);

/// An active uniform reported by the driver at link time.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UniformInfo {
  /// Name of the uniform.
  pub name: String,
  /// Location of the uniform.
  pub location: i32,
  /// Declared type.
  pub ty: ShaderType,
}

/// An active attribute reported by the driver at link time.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttributeInfo {
  /// Name of the attribute.
  pub name: String,
  /// Location of the attribute.
  pub location: u32,
  /// Declared type.
  pub ty: ShaderType,
}

/// Everything a driver reports about a linked program.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProgramReflection {
  /// Active uniforms.
  pub uniforms: Vec<UniformInfo>,
  /// Active attributes.
  pub attributes: Vec<AttributeInfo>,
}

/// A uniform of a linked program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramUniform {
  program: Handle,
  name: String,
  location: i32,
  ty: ShaderType,
}

impl ProgramUniform {
  /// Program the uniform belongs to.
  pub fn program(&self) -> &Handle {
    &self.program
  }

  /// Name of the uniform.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Location of the uniform.
  pub fn location(&self) -> i32 {
    self.location
  }

  /// Declared type.
  pub fn ty(&self) -> ShaderType {
    self.ty
  }
}

/// An attribute of a linked program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramAttribute {
  program: Handle,
  name: String,
  location: u32,
  ty: ShaderType,
}

impl ProgramAttribute {
  /// Program the attribute belongs to.
  pub fn program(&self) -> &Handle {
    &self.program
  }

  /// Name of the attribute.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Location of the attribute.
  pub fn location(&self) -> u32 {
    self.location
  }

  /// Declared type.
  pub fn ty(&self) -> ShaderType {
    self.ty
  }
}

/// A linked program.
#[derive(Clone, Debug)]
pub struct Program {
  handle: Handle,
  name: String,
  shaders: Vec<Shader>,
  uniforms: Arc<BTreeMap<String, ProgramUniform>>,
  attributes: Arc<BTreeMap<String, ProgramAttribute>>,
}

impl_Resource!(Program);

impl PartialEq for Program {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for Program {}

impl Program {
  /// Name given at link time.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Shaders the program was linked from.
  pub fn shaders(&self) -> &[Shader] {
    &self.shaders
  }

  /// Active uniforms, by name.
  pub fn uniforms(&self) -> &BTreeMap<String, ProgramUniform> {
    &self.uniforms
  }

  /// Active attributes, by name.
  pub fn attributes(&self) -> &BTreeMap<String, ProgramAttribute> {
    &self.attributes
  }

  /// Look a uniform up by name.
  pub fn uniform(&self, name: &str) -> Option<&ProgramUniform> {
    self.uniforms.get(name)
  }

  /// Look an attribute up by name.
  pub fn attribute(&self, name: &str) -> Option<&ProgramAttribute> {
    self.attributes.get(name)
  }

  /// Look a uniform up by name, failing with [`Error::UnknownUniform`].
  pub fn uniform_checked(&self, name: &str) -> Result<&ProgramUniform, Error> {
    self.uniforms.get(name).ok_or_else(|| Error::UnknownUniform {
      name: name.to_owned(),
      valid: self.uniforms.keys().cloned().collect(),
    })
  }

  /// Look an attribute up by name, failing with [`Error::UnknownAttribute`].
  pub fn attribute_checked(&self, name: &str) -> Result<&ProgramAttribute, Error> {
    self.attributes.get(name).ok_or_else(|| Error::UnknownAttribute {
      name: name.to_owned(),
      valid: self.attributes.keys().cloned().collect(),
    })
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  pub(crate) fn shader_compile(
    &mut self,
    stage: ShaderStage,
    name: &str,
    lines: &[String],
  ) -> Result<Shader, Error> {
    self.check_current()?;

    if lines.iter().all(|line| line.trim().is_empty()) {
      return Err(Error::compile(name, "Empty program"));
    }

    let id = unsafe { self.backend.new_shader(stage, name, lines)? };
    debug!("compiled {} shader {} ({})", stage, id, name);

    Ok(Shader {
      handle: Handle::new(ResourceKind::Shader, id),
      name: name.to_owned(),
      stage,
    })
  }

  /// Compile a vertex shader.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ProgramCompile`] if the source is blank or does not compile.
  pub fn shader_compile_vertex(
    &mut self,
    name: &str,
    lines: &[String],
  ) -> Result<VertexShader, Error> {
    self
      .shader_compile(VertexShader::stage(), name, lines)
      .map(VertexShader)
  }

  /// Compile a geometry shader.
  pub fn shader_compile_geometry(
    &mut self,
    name: &str,
    lines: &[String],
  ) -> Result<GeometryShader, Error> {
    self
      .shader_compile(GeometryShader::stage(), name, lines)
      .map(GeometryShader)
  }

  /// Compile a fragment shader.
  pub fn shader_compile_fragment(
    &mut self,
    name: &str,
    lines: &[String],
  ) -> Result<FragmentShader, Error> {
    self
      .shader_compile(FragmentShader::stage(), name, lines)
      .map(FragmentShader)
  }

  /// Delete a shader.
  ///
  /// Programs already linked with it are not affected.
  pub fn shader_delete<S>(&mut self, shader: &S) -> Result<(), Error>
  where
    S: AsRef<Shader>,
  {
    let shader = shader.as_ref();

    self.check_current()?;
    shader.handle.check_not_deleted()?;

    unsafe { self.backend.delete_shader(shader.handle.id())? };
    debug!("delete shader {} ({})", shader.handle.id(), shader.name);

    shader.handle.mark_deleted()
  }

  /// Link a program from a vertex shader, an optional geometry shader and a fragment shader.
  pub fn program_link(
    &mut self,
    name: &str,
    vertex: &VertexShader,
    geometry: Option<&GeometryShader>,
    fragment: &FragmentShader,
  ) -> Result<Program, Error> {
    self.program_link_all(
      name,
      std::slice::from_ref(vertex),
      geometry.map(std::slice::from_ref).unwrap_or(&[]),
      std::slice::from_ref(fragment),
    )
  }

  /// Link a program from any number of shaders per stage.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if there is no vertex or no fragment shader and
  /// with [`Error::ProgramCompile`] if linking fails.
  pub fn program_link_all(
    &mut self,
    name: &str,
    vertex: &[VertexShader],
    geometry: &[GeometryShader],
    fragment: &[FragmentShader],
  ) -> Result<Program, Error> {
    self.check_current()?;

    if vertex.is_empty() {
      return Err(Error::constraint(format!(
        "program {} needs at least one vertex shader",
        name
      )));
    }

    if fragment.is_empty() {
      return Err(Error::constraint(format!(
        "program {} needs at least one fragment shader",
        name
      )));
    }

    let shaders: Vec<Shader> = vertex
      .iter()
      .map(|s| s.0.clone())
      .chain(geometry.iter().map(|s| s.0.clone()))
      .chain(fragment.iter().map(|s| s.0.clone()))
      .collect();

    for shader in &shaders {
      shader.handle.check_not_deleted()?;
    }

    let ids: Vec<u32> = shaders.iter().map(|s| s.handle.id()).collect();
    let (id, reflection) = unsafe { self.backend.new_program(name, &ids)? };
    debug!(
      "linked program {} ({}): {} uniforms, {} attributes",
      id,
      name,
      reflection.uniforms.len(),
      reflection.attributes.len()
    );

    let handle = Handle::new(ResourceKind::Program, id);

    let uniforms: BTreeMap<_, _> = reflection
      .uniforms
      .into_iter()
      .map(|u| {
        trace!("program {}: uniform {} {} @ {}", id, u.ty, u.name, u.location);

        let uniform = ProgramUniform {
          program: handle.clone(),
          name: u.name.clone(),
          location: u.location,
          ty: u.ty,
        };

        (u.name, uniform)
      })
      .collect();

    let attributes: BTreeMap<_, _> = reflection
      .attributes
      .into_iter()
      .map(|a| {
        trace!("program {}: attribute {} {} @ {}", id, a.ty, a.name, a.location);

        let attribute = ProgramAttribute {
          program: handle.clone(),
          name: a.name.clone(),
          location: a.location,
          ty: a.ty,
        };

        (a.name, attribute)
      })
      .collect();

    Ok(Program {
      handle,
      name: name.to_owned(),
      shaders,
      uniforms: Arc::new(uniforms),
      attributes: Arc::new(attributes),
    })
  }

  /// Make a program active.
  pub fn program_activate(&mut self, program: &Program) -> Result<(), Error> {
    self.check_current()?;
    program.handle.check_not_deleted()?;

    unsafe { self.backend.use_program(program.handle.id())? };
    trace!("activate program {}", program.handle.id());
    self.state.program = Some(program.clone());

    Ok(())
  }

  /// Deactivate the active program, if any.
  pub fn program_deactivate(&mut self) -> Result<(), Error> {
    self.check_current()?;

    if self.state.program.take().is_some() {
      unsafe { self.backend.use_program(0)? };
      trace!("deactivate program");
    }

    Ok(())
  }

  /// The active program, if any.
  pub fn program_current(&self) -> Option<&Program> {
    self.state.program.as_ref()
  }

  /// Whether `program` is active.
  pub fn program_is_active(&self, program: &Program) -> Result<bool, Error> {
    self.check_current()?;
    program.handle.check_not_deleted()?;

    Ok(self.state.program.as_ref() == Some(program))
  }

  /// Delete a program, deactivating it first if active.
  ///
  /// Its shaders are not deleted.
  pub fn program_delete(&mut self, program: &Program) -> Result<(), Error> {
    self.check_current()?;
    program.handle.check_not_deleted()?;

    if self.state.program.as_ref() == Some(program) {
      self.program_deactivate()?;
    }

    unsafe { self.backend.delete_program(program.handle.id())? };
    debug!("delete program {} ({})", program.handle.id(), program.name);

    program.handle.mark_deleted()
  }

  /// Assign a value to a uniform of the active program.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if the uniform does not belong to the active
  /// program and with [`Error::UniformTypeMismatch`] if the value has the wrong type.
  pub fn program_uniform_put(
    &mut self,
    uniform: &ProgramUniform,
    value: impl Into<UniformValue>,
  ) -> Result<(), Error> {
    self.uniform_submit(uniform, &value.into())
  }

  pub(crate) fn uniform_submit(
    &mut self,
    uniform: &ProgramUniform,
    value: &UniformValue,
  ) -> Result<(), Error> {
    self.check_current()?;
    uniform.program.check_not_deleted()?;

    match self.state.program {
      Some(ref program) if program.handle == uniform.program => (),
      _ => {
        return Err(Error::constraint(format!(
          "program {} of uniform {} is not active",
          uniform.program.id(),
          uniform.name
        )))
      }
    }

    check_value_type(&uniform.name, uniform.ty, value)?;

    if let Some(unit) = value.texture_unit() {
      let units = self.capabilities().texture_units();

      if unit >= units {
        return Err(Error::range(unit as usize, units as usize));
      }
    }

    unsafe { self.backend.set_uniform(uniform.location, value) }
  }

  pub(crate) fn attribute_submit(
    &mut self,
    attribute: &ProgramAttribute,
    value: &UniformValue,
  ) -> Result<(), Error> {
    self.check_current()?;
    attribute.program.check_not_deleted()?;

    check_value_type(&attribute.name, attribute.ty, value)?;

    if attribute.ty.vector().is_none() {
      return Err(Error::constraint(format!(
        "attribute {} of type {} cannot be given a constant value",
        attribute.name, attribute.ty
      )));
    }

    unsafe { self.backend.set_attribute_value(attribute.location, value) }
  }
}

fn check_value_type(name: &str, expected: ShaderType, value: &UniformValue) -> Result<(), Error> {
  let actual = value.ty();

  if expected.is_compatible(actual) {
    Ok(())
  } else {
    Err(Error::UniformTypeMismatch {
      name: name.to_owned(),
      expected,
      actual,
    })
  }
}
