//! Reloadable programs.
//!
//! A [`ReloadableProgram`] is a program linked from shader sources that may change on disk. Each
//! source is remembered with the modification time it had when it was last compiled.
//! [`ReloadableProgram::compile`] recompiles the sources that changed since and relinks.
//!
//! Recompiling is atomic: the new program replaces the old one only if every changed shader
//! compiled and the program linked. Otherwise, the shaders compiled on the way are deleted and
//! the previous program, with its reflection, stays in use.

use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::handle::Resource;
use crate::shader::{FragmentShader, GeometryShader, Program, Shader, ShaderStage, VertexShader};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where shader sources come from.
pub trait ShaderSource {
  /// Last modification time of the source at `path`.
  fn modified(&self, path: &Path) -> Result<SystemTime, Error>;

  /// Lines of the source at `path`, newline-terminated.
  fn lines(&self, path: &Path) -> Result<Vec<String>, Error>;
}

/// Shader sources read from a directory of the filesystem.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DirectorySource {
  root: PathBuf,
}

impl DirectorySource {
  /// Read sources relative to `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    DirectorySource { root: root.into() }
  }

  /// Root directory.
  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl ShaderSource for DirectorySource {
  fn modified(&self, path: &Path) -> Result<SystemTime, Error> {
    let metadata = fs::metadata(self.root.join(path))?;
    Ok(metadata.modified()?)
  }

  fn lines(&self, path: &Path) -> Result<Vec<String>, Error> {
    let content = fs::read_to_string(self.root.join(path))?;
    Ok(content.lines().map(|line| format!("{}\n", line)).collect())
  }
}

#[derive(Debug)]
struct Entry {
  stage: ShaderStage,
  path: PathBuf,
  modified: Option<SystemTime>,
  shader: Option<Shader>,
}

// A shader compiled during a reload, not committed yet.
#[derive(Debug)]
struct Compiled {
  entry: usize,
  modified: SystemTime,
  shader: Shader,
}

/// A program relinked when its sources change.
#[derive(Debug)]
pub struct ReloadableProgram {
  name: String,
  entries: Vec<Entry>,
  program: Option<Program>,
}

impl ReloadableProgram {
  /// Create a reloadable program with no shader.
  pub fn new(name: impl Into<String>) -> Self {
    ReloadableProgram {
      name: name.into(),
      entries: Vec::new(),
      program: None,
    }
  }

  /// Name of the program.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Add a vertex shader source.
  pub fn add_vertex_shader(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
    self.add_shader(ShaderStage::Vertex, path.into())
  }

  /// Add a geometry shader source.
  pub fn add_geometry_shader(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
    self.add_shader(ShaderStage::Geometry, path.into())
  }

  /// Add a fragment shader source.
  pub fn add_fragment_shader(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
    self.add_shader(ShaderStage::Fragment, path.into())
  }

  fn add_shader(&mut self, stage: ShaderStage, path: PathBuf) -> Result<(), Error> {
    if self
      .entries
      .iter()
      .any(|e| e.stage == stage && e.path == path)
    {
      return Err(Error::constraint(format!(
        "{} shader {} is already part of {}",
        stage,
        path.display(),
        self.name
      )));
    }

    self.entries.push(Entry {
      stage,
      path,
      modified: None,
      shader: None,
    });

    Ok(())
  }

  /// The last program successfully linked, if any.
  pub fn program(&self) -> Option<&Program> {
    self.program.as_ref()
  }

  /// Whether a source changed since it was last compiled, or nothing was ever linked.
  pub fn requires_compilation<S>(&self, source: &S) -> Result<bool, Error>
  where
    S: ?Sized + ShaderSource,
  {
    if self.program.is_none() {
      return Ok(true);
    }

    for entry in &self.entries {
      if entry.modified != Some(source.modified(&entry.path)?) {
        return Ok(true);
      }
    }

    Ok(false)
  }

  /// Recompile the changed sources and relink.
  ///
  /// Returns whether a new program was linked.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if there is no vertex or no fragment source and
  /// with [`Error::ProgramCompile`] if a shader does not compile or the program does not link. In
  /// both cases, the previous program is left untouched.
  pub fn compile<B, S>(&mut self, ctx: &mut Context<B>, source: &S) -> Result<bool, Error>
  where
    B: Backend,
    S: ?Sized + ShaderSource,
  {
    for &stage in &[ShaderStage::Vertex, ShaderStage::Fragment] {
      if !self.entries.iter().any(|e| e.stage == stage) {
        return Err(Error::constraint(format!(
          "{} needs at least one {} shader",
          self.name, stage
        )));
      }
    }

    let mut compiled = Vec::new();

    if let Err(e) = self.compile_changed(ctx, source, &mut compiled) {
      discard(ctx, compiled);
      return Err(e);
    }

    if compiled.is_empty() && self.program.is_some() {
      debug!("{}: nothing changed", self.name);
      return Ok(false);
    }

    let program = match self.link(ctx, &compiled) {
      Ok(program) => program,
      Err(e) => {
        discard(ctx, compiled);
        return Err(e);
      }
    };

    // commit
    if let Some(old) = self.program.replace(program) {
      if let Err(e) = ctx.program_delete(&old) {
        warn!("{}: cannot delete previous program: {}", self.name, e);
      }
    }

    for Compiled {
      entry,
      modified,
      shader,
    } in compiled
    {
      let entry = &mut self.entries[entry];

      if let Some(old) = entry.shader.replace(shader) {
        if let Err(e) = ctx.shader_delete(&old) {
          warn!("{}: cannot delete previous shader: {}", self.name, e);
        }
      }

      entry.modified = Some(modified);
    }

    debug!("{}: relinked", self.name);
    Ok(true)
  }

  fn compile_changed<B, S>(
    &self,
    ctx: &mut Context<B>,
    source: &S,
    compiled: &mut Vec<Compiled>,
  ) -> Result<(), Error>
  where
    B: Backend,
    S: ?Sized + ShaderSource,
  {
    for (index, entry) in self.entries.iter().enumerate() {
      let modified = source.modified(&entry.path)?;

      if entry.shader.is_some() && entry.modified == Some(modified) {
        continue;
      }

      let lines = source.lines(&entry.path)?;
      let name = entry.path.display().to_string();
      let shader = ctx.shader_compile(entry.stage, &name, &lines)?;

      compiled.push(Compiled {
        entry: index,
        modified,
        shader,
      });
    }

    Ok(())
  }

  fn link<B>(&self, ctx: &mut Context<B>, compiled: &[Compiled]) -> Result<Program, Error>
  where
    B: Backend,
  {
    let mut vertex = Vec::new();
    let mut geometry = Vec::new();
    let mut fragment = Vec::new();

    for (index, entry) in self.entries.iter().enumerate() {
      let shader = compiled
        .iter()
        .find(|c| c.entry == index)
        .map(|c| &c.shader)
        .or_else(|| entry.shader.as_ref())
        .ok_or_else(|| {
          Error::constraint(format!("{} was never compiled", entry.path.display()))
        })?
        .clone();

      match entry.stage {
        ShaderStage::Vertex => vertex.push(VertexShader::wrap(shader)),
        ShaderStage::Geometry => geometry.push(GeometryShader::wrap(shader)),
        ShaderStage::Fragment => fragment.push(FragmentShader::wrap(shader)),
      }
    }

    ctx.program_link_all(&self.name, &vertex, &geometry, &fragment)
  }

  /// Delete the program and every shader.
  ///
  /// Every deletion is attempted; the first error is returned.
  pub fn delete<B>(&mut self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let mut first_error = None;

    if let Some(program) = self.program.take() {
      if let Err(e) = ctx.program_delete(&program) {
        first_error.get_or_insert(e);
      }
    }

    for entry in &mut self.entries {
      entry.modified = None;

      if let Some(shader) = entry.shader.take() {
        if shader.is_deleted() {
          continue;
        }

        if let Err(e) = ctx.shader_delete(&shader) {
          first_error.get_or_insert(e);
        }
      }
    }

    first_error.map_or(Ok(()), Err)
  }
}

fn discard<B>(ctx: &mut Context<B>, compiled: Vec<Compiled>)
where
  B: Backend,
{
  for Compiled { shader, .. } in compiled {
    if let Err(e) = ctx.shader_delete(&shader) {
      warn!("cannot delete shader {}: {}", shader.name(), e);
    }
  }
}
