//! OpenGL shader and program implementation.

use crate::gl33::enums::{shader_stage_to_gl, shader_type_from_gl};
use crate::gl33::{check_errors, GL33};
use gl::types::*;
use log::{debug, trace, warn};
use penumbra::backend::shader::Shader;
use penumbra::error::Error;
use penumbra::shader::{AttributeInfo, ProgramReflection, ShaderStage, UniformInfo, UniformValue};
use std::ffi::CString;
use std::ptr::null;

unsafe impl<S> Shader for GL33<S> {
  unsafe fn new_shader(
    &mut self,
    stage: ShaderStage,
    name: &str,
    lines: &[String],
  ) -> Result<u32, Error> {
    let sources = lines
      .iter()
      .map(|line| CString::new(line.as_bytes()))
      .collect::<Result<Vec<_>, _>>()
      .map_err(|_| Error::constraint(format!("{}: source contains a NUL byte", name)))?;
    let pointers: Vec<*const GLchar> = sources.iter().map(|line| line.as_ptr()).collect();

    let handle = gl::CreateShader(shader_stage_to_gl(stage));

    if handle == 0 {
      return Err(Error::compile(name, "unable to create shader stage"));
    }

    gl::ShaderSource(handle, pointers.len() as GLsizei, pointers.as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      debug!("compiled {} shader {} ({})", stage, name, handle);
      Ok(handle)
    } else {
      let log = shader_log(handle);
      gl::DeleteShader(handle);

      Err(Error::compile(name, log))
    }
  }

  unsafe fn delete_shader(&mut self, shader: u32) -> Result<(), Error> {
    gl::DeleteShader(shader);
    Ok(())
  }

  unsafe fn new_program(
    &mut self,
    name: &str,
    shaders: &[u32],
  ) -> Result<(u32, ProgramReflection), Error> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(Error::compile(name, "unable to create program"));
    }

    for &shader in shaders {
      gl::AttachShader(handle, shader);
    }

    gl::LinkProgram(handle);

    // shaders stay alive on their own; the program does not need them anymore
    for &shader in shaders {
      gl::DetachShader(handle, shader);
    }

    let mut linked: GLint = gl::FALSE.into();
    gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

    if linked != gl::TRUE.into() {
      let log = program_log(handle);
      gl::DeleteProgram(handle);

      return Err(Error::compile(name, log));
    }

    let reflection = ProgramReflection {
      uniforms: active_uniforms(handle),
      attributes: active_attributes(handle),
    };

    debug!(
      "linked program {} ({}): {} uniforms, {} attributes",
      name,
      handle,
      reflection.uniforms.len(),
      reflection.attributes.len()
    );

    Ok((handle, reflection))
  }

  unsafe fn delete_program(&mut self, program: u32) -> Result<(), Error> {
    gl::DeleteProgram(program);
    self.state.forget_program(program);

    Ok(())
  }

  unsafe fn use_program(&mut self, program: u32) -> Result<(), Error> {
    self.state.use_program(program);
    Ok(())
  }

  unsafe fn set_uniform(&mut self, location: i32, value: &UniformValue) -> Result<(), Error> {
    match *value {
      UniformValue::Bool(b) => gl::Uniform1i(location, b as GLint),
      UniformValue::BVec2(v) => gl::Uniform2i(location, v[0] as GLint, v[1] as GLint),
      UniformValue::BVec3(v) => {
        gl::Uniform3i(location, v[0] as GLint, v[1] as GLint, v[2] as GLint)
      }
      UniformValue::BVec4(v) => gl::Uniform4i(
        location,
        v[0] as GLint,
        v[1] as GLint,
        v[2] as GLint,
        v[3] as GLint,
      ),
      UniformValue::Int(x) => gl::Uniform1i(location, x),
      UniformValue::IVec2(v) => gl::Uniform2iv(location, 1, v.as_ptr()),
      UniformValue::IVec3(v) => gl::Uniform3iv(location, 1, v.as_ptr()),
      UniformValue::IVec4(v) => gl::Uniform4iv(location, 1, v.as_ptr()),
      UniformValue::UInt(x) => gl::Uniform1ui(location, x),
      UniformValue::UVec2(v) => gl::Uniform2uiv(location, 1, v.as_ptr()),
      UniformValue::UVec3(v) => gl::Uniform3uiv(location, 1, v.as_ptr()),
      UniformValue::UVec4(v) => gl::Uniform4uiv(location, 1, v.as_ptr()),
      UniformValue::Float(x) => gl::Uniform1f(location, x),
      UniformValue::Vec2(v) => gl::Uniform2fv(location, 1, v.as_ptr()),
      UniformValue::Vec3(v) => gl::Uniform3fv(location, 1, v.as_ptr()),
      UniformValue::Vec4(v) => gl::Uniform4fv(location, 1, v.as_ptr()),

      // matrices are stored column by column
      UniformValue::Mat2(m) => gl::UniformMatrix2fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat3(m) => gl::UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat4(m) => gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat2x3(m) => gl::UniformMatrix2x3fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat2x4(m) => gl::UniformMatrix2x4fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat3x2(m) => gl::UniformMatrix3x2fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat3x4(m) => gl::UniformMatrix3x4fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat4x2(m) => gl::UniformMatrix4x2fv(location, 1, gl::FALSE, m.as_ptr() as _),
      UniformValue::Mat4x3(m) => gl::UniformMatrix4x3fv(location, 1, gl::FALSE, m.as_ptr() as _),

      UniformValue::Sampler2D(unit)
      | UniformValue::Sampler3D(unit)
      | UniformValue::SamplerCube(unit) => gl::Uniform1i(location, unit as GLint),
    }

    check_errors("set uniform")
  }

  unsafe fn set_attribute_value(
    &mut self,
    location: u32,
    value: &UniformValue,
  ) -> Result<(), Error> {
    match *value {
      UniformValue::Int(x) => gl::VertexAttribI1i(location, x),
      UniformValue::IVec2(v) => gl::VertexAttribI2iv(location, v.as_ptr()),
      UniformValue::IVec3(v) => gl::VertexAttribI3iv(location, v.as_ptr()),
      UniformValue::IVec4(v) => gl::VertexAttribI4iv(location, v.as_ptr()),
      UniformValue::UInt(x) => gl::VertexAttribI1ui(location, x),
      UniformValue::UVec2(v) => gl::VertexAttribI2uiv(location, v.as_ptr()),
      UniformValue::UVec3(v) => gl::VertexAttribI3uiv(location, v.as_ptr()),
      UniformValue::UVec4(v) => gl::VertexAttribI4uiv(location, v.as_ptr()),
      UniformValue::Float(x) => gl::VertexAttrib1f(location, x),
      UniformValue::Vec2(v) => gl::VertexAttrib2fv(location, v.as_ptr()),
      UniformValue::Vec3(v) => gl::VertexAttrib3fv(location, v.as_ptr()),
      UniformValue::Vec4(v) => gl::VertexAttrib4fv(location, v.as_ptr()),

      // a matrix attribute takes one location per column
      UniformValue::Mat2(m) => columns(location, &m, |l, c| gl::VertexAttrib2fv(l, c.as_ptr())),
      UniformValue::Mat3(m) => columns(location, &m, |l, c| gl::VertexAttrib3fv(l, c.as_ptr())),
      UniformValue::Mat4(m) => columns(location, &m, |l, c| gl::VertexAttrib4fv(l, c.as_ptr())),
      UniformValue::Mat2x3(m) => columns(location, &m, |l, c| gl::VertexAttrib3fv(l, c.as_ptr())),
      UniformValue::Mat2x4(m) => columns(location, &m, |l, c| gl::VertexAttrib4fv(l, c.as_ptr())),
      UniformValue::Mat3x2(m) => columns(location, &m, |l, c| gl::VertexAttrib2fv(l, c.as_ptr())),
      UniformValue::Mat3x4(m) => columns(location, &m, |l, c| gl::VertexAttrib4fv(l, c.as_ptr())),
      UniformValue::Mat4x2(m) => columns(location, &m, |l, c| gl::VertexAttrib2fv(l, c.as_ptr())),
      UniformValue::Mat4x3(m) => columns(location, &m, |l, c| gl::VertexAttrib3fv(l, c.as_ptr())),

      _ => {
        return Err(Error::constraint(format!(
          "{} values cannot be given to attributes",
          value.ty()
        )))
      }
    }

    check_errors("set attribute value")
  }
}

fn columns<C>(location: u32, matrix: &[C], set: impl Fn(u32, &C)) {
  for (i, column) in matrix.iter().enumerate() {
    set(location + i as u32, column);
  }
}

unsafe fn shader_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
  let mut written: GLsizei = 0;
  gl::GetShaderInfoLog(handle, log_len, &mut written, log.as_mut_ptr() as *mut GLchar);
  log.truncate(written.max(0) as usize);

  String::from_utf8_lossy(&log).into_owned()
}

unsafe fn program_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
  let mut written: GLsizei = 0;
  gl::GetProgramInfoLog(handle, log_len, &mut written, log.as_mut_ptr() as *mut GLchar);
  log.truncate(written.max(0) as usize);

  String::from_utf8_lossy(&log).into_owned()
}

/// Name, array size and type of the active variable at `index`.
type ActiveVariable = (String, GLint, GLenum);

unsafe fn active_variables(
  program: GLuint,
  count: GLenum,
  max_len: GLenum,
  get: unsafe fn(GLuint, GLuint, GLsizei, *mut GLsizei, *mut GLint, *mut GLenum, *mut GLchar),
) -> Vec<ActiveVariable> {
  let mut active: GLint = 0;
  let mut name_len: GLint = 0;
  gl::GetProgramiv(program, count, &mut active);
  gl::GetProgramiv(program, max_len, &mut name_len);

  (0..active.max(0) as GLuint)
    .map(|index| {
      let mut name = vec![0u8; name_len.max(1) as usize];
      let mut written: GLsizei = 0;
      let mut size: GLint = 0;
      let mut ty: GLenum = 0;

      get(
        program,
        index,
        name_len,
        &mut written,
        &mut size,
        &mut ty,
        name.as_mut_ptr() as *mut GLchar,
      );
      name.truncate(written.max(0) as usize);

      (String::from_utf8_lossy(&name).into_owned(), size, ty)
    })
    .collect()
}

unsafe fn active_uniforms(program: GLuint) -> Vec<UniformInfo> {
  let active = active_variables(
    program,
    gl::ACTIVE_UNIFORMS,
    gl::ACTIVE_UNIFORM_MAX_LENGTH,
    gl::GetActiveUniform,
  );
  let mut uniforms = Vec::with_capacity(active.len());

  for (name, size, glty) in active {
    if size != 1 {
      warn!("uniform {} is an array, which is not supported; ignored", name);
      continue;
    }

    let ty = match shader_type_from_gl(glty) {
      Ok(ty) => ty,
      Err(e) => {
        warn!("uniform {} ignored: {}", name, e);
        continue;
      }
    };

    let location = match CString::new(name.as_bytes()) {
      Ok(c_name) => gl::GetUniformLocation(program, c_name.as_ptr()),
      Err(_) => -1,
    };

    // members of uniform blocks have no location
    if location < 0 {
      trace!("uniform {} has no location; ignored", name);
      continue;
    }

    uniforms.push(UniformInfo { name, location, ty });
  }

  uniforms
}

unsafe fn active_attributes(program: GLuint) -> Vec<AttributeInfo> {
  let active = active_variables(
    program,
    gl::ACTIVE_ATTRIBUTES,
    gl::ACTIVE_ATTRIBUTE_MAX_LENGTH,
    gl::GetActiveAttrib,
  );
  let mut attributes = Vec::with_capacity(active.len());

  for (name, _, glty) in active {
    let ty = match shader_type_from_gl(glty) {
      Ok(ty) => ty,
      Err(e) => {
        warn!("attribute {} ignored: {}", name, e);
        continue;
      }
    };

    let location = match CString::new(name.as_bytes()) {
      Ok(c_name) => gl::GetAttribLocation(program, c_name.as_ptr()),
      Err(_) => -1,
    };

    // built-in inputs such as gl_VertexID have no location
    if location < 0 {
      trace!("attribute {} has no location; ignored", name);
      continue;
    }

    attributes.push(AttributeInfo {
      name,
      location: location as u32,
      ty,
    });
  }

  attributes
}
