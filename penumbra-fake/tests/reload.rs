mod common;

use penumbra::error::Error;
use penumbra::handle::Resource as _;
use penumbra::reload::{DirectorySource, ReloadableProgram, ShaderSource};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// Sources kept in memory, with a fake clock ticking at each change.
#[derive(Default)]
struct MemorySource {
  clock: Cell<u64>,
  files: RefCell<HashMap<PathBuf, (SystemTime, String)>>,
}

impl MemorySource {
  fn set(&self, path: &str, source: &str) {
    self.clock.set(self.clock.get() + 1);
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(self.clock.get());

    self
      .files
      .borrow_mut()
      .insert(path.into(), (modified, source.to_owned()));
  }
}

impl ShaderSource for MemorySource {
  fn modified(&self, path: &Path) -> Result<SystemTime, Error> {
    self
      .files
      .borrow()
      .get(path)
      .map(|&(modified, _)| modified)
      .ok_or_else(|| Error::Io(format!("{} not found", path.display())))
  }

  fn lines(&self, path: &Path) -> Result<Vec<String>, Error> {
    self
      .files
      .borrow()
      .get(path)
      .map(|(_, source)| common::lines(source))
      .ok_or_else(|| Error::Io(format!("{} not found", path.display())))
  }
}

fn reloadable(source: &MemorySource) -> ReloadableProgram {
  source.set("main.vert", common::VS);
  source.set("main.frag", common::FS);

  let mut program = ReloadableProgram::new("main");
  program.add_vertex_shader("main.vert").unwrap();
  program.add_fragment_shader("main.frag").unwrap();
  program
}

#[test]
fn compiles_once_until_sources_change() {
  let mut ctx = common::context();
  let source = MemorySource::default();
  let mut program = reloadable(&source);

  assert!(program.requires_compilation(&source).unwrap());
  assert!(program.compile(&mut ctx, &source).unwrap());
  assert!(!program.requires_compilation(&source).unwrap());
  assert!(!program.compile(&mut ctx, &source).unwrap());
  assert_eq!(ctx.backend().counters().links, 1);

  let first = program.program().unwrap().clone();

  source.set("main.frag", "out vec4 frag;\nvoid main() { frag = vec4(1.); }");
  assert!(program.requires_compilation(&source).unwrap());
  assert!(program.compile(&mut ctx, &source).unwrap());

  // only the fragment shader was recompiled, and the old program is gone
  assert_eq!(ctx.backend().counters().compilations, 3);
  assert!(first.is_deleted());

  let second = program.program().unwrap();
  assert!(second.uniform("exposure").is_none());
  assert!(second.uniform("projection").is_some());
}

#[test]
fn failed_recompilation_keeps_previous_program() {
  let mut ctx = common::context();
  let source = MemorySource::default();
  let mut program = reloadable(&source);

  program.compile(&mut ctx, &source).unwrap();
  let before = program.program().unwrap().clone();
  let objects = ctx.backend().object_count();

  source.set("main.vert", "void main() {\n#error oops\n}");
  assert!(matches!(
    program.compile(&mut ctx, &source),
    Err(Error::ProgramCompile { .. })
  ));

  assert_eq!(program.program(), Some(&before));
  assert!(!before.is_deleted());
  assert_eq!(before.uniforms().len(), 3);
  assert_eq!(ctx.backend().object_count(), objects);

  // still out of date
  assert!(program.requires_compilation(&source).unwrap());
}

#[test]
fn failed_link_discards_new_shaders() {
  let mut ctx = common::context();
  let source = MemorySource::default();
  let mut program = reloadable(&source);

  program.compile(&mut ctx, &source).unwrap();
  let before = program.program().unwrap().clone();
  let objects = ctx.backend().object_count();

  // compiles, but declares projection with another type than the vertex stage
  source.set(
    "main.frag",
    "uniform vec3 projection;\nout vec4 frag;\nvoid main() { frag = vec4(projection, 1.); }",
  );

  assert!(program.compile(&mut ctx, &source).is_err());
  assert_eq!(program.program(), Some(&before));
  assert_eq!(ctx.backend().object_count(), objects);
}

#[test]
fn needs_vertex_and_fragment_sources() {
  let mut ctx = common::context();
  let source = MemorySource::default();
  let mut program = ReloadableProgram::new("partial");

  program.add_vertex_shader("main.vert").unwrap();
  assert!(program.add_vertex_shader("main.vert").is_err());

  assert!(matches!(
    program.compile(&mut ctx, &source),
    Err(Error::ConstraintViolation(_))
  ));
}

#[test]
fn delete_releases_everything() {
  let mut ctx = common::context();
  let source = MemorySource::default();
  let mut program = reloadable(&source);

  program.compile(&mut ctx, &source).unwrap();
  assert_eq!(ctx.backend().object_count(), 3);

  program.delete(&mut ctx).unwrap();
  assert_eq!(program.program(), None);
  assert_eq!(ctx.backend().object_count(), 0);
  assert!(program.requires_compilation(&source).unwrap());
}

#[test]
fn directory_source_reads_files() {
  let root = std::env::temp_dir().join(format!("penumbra-reload-{}", std::process::id()));
  fs::create_dir_all(&root).unwrap();
  fs::write(root.join("main.vert"), common::VS).unwrap();
  fs::write(root.join("main.frag"), common::FS).unwrap();

  let mut ctx = common::context();
  let source = DirectorySource::new(&root);
  let mut program = ReloadableProgram::new("main");
  program.add_vertex_shader("main.vert").unwrap();
  program.add_fragment_shader("main.frag").unwrap();

  assert!(program.compile(&mut ctx, &source).unwrap());
  assert_eq!(program.program().map(|p| p.attributes().len()), Some(3));
  assert!(matches!(
    source.lines(Path::new("missing.frag")),
    Err(Error::Io(_))
  ));

  fs::remove_dir_all(&root).unwrap();
}
