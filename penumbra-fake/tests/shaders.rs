mod common;

use penumbra::error::Error;
use penumbra::handle::{Resource as _, ResourceKind};
use penumbra::shader::{ShaderType, UniformValue};

#[test]
fn blank_source_is_rejected() {
  let mut ctx = common::context();
  let blank = common::lines("\n   \n\t\n");

  assert_eq!(
    ctx.shader_compile_vertex("blank", &blank).err(),
    Some(Error::compile("blank", "Empty program"))
  );
  assert_eq!(ctx.backend().counters().compilations, 0);
}

#[test]
fn compile_error_carries_log() {
  let mut ctx = common::context();
  let source = common::lines("void main() {\n#error unexpected token\n}");

  match ctx.shader_compile_fragment("broken.frag", &source) {
    Err(Error::ProgramCompile { name, log }) => {
      assert_eq!(name, "broken.frag");
      assert_eq!(log, "0:2: error: unexpected token");
    }

    r => panic!("unexpected result: {:?}", r),
  }
}

#[test]
fn link_reflects_active_variables() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);

  let uniforms: Vec<_> = program.uniforms().keys().map(String::as_str).collect();
  let attributes: Vec<_> = program.attributes().keys().map(String::as_str).collect();

  assert_eq!(uniforms, ["albedo", "exposure", "projection"]);
  assert_eq!(attributes, ["normal", "position", "uv"]);

  assert_eq!(program.uniform("projection").map(|u| u.ty()), Some(ShaderType::Mat4));
  assert_eq!(program.uniform("albedo").map(|u| u.ty()), Some(ShaderType::Sampler2D));
  assert_eq!(program.attribute("uv").map(|a| a.ty()), Some(ShaderType::Vec2));
  assert_eq!(program.attribute("position").map(|a| a.location()), Some(0));
  assert_eq!(program.shaders().len(), 2);
}

#[test]
fn unknown_uniform_lists_valid_names() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);

  assert_eq!(
    program.uniform_checked("time").err(),
    Some(Error::UnknownUniform {
      name: "time".to_owned(),
      valid: vec![
        "albedo".to_owned(),
        "exposure".to_owned(),
        "projection".to_owned()
      ],
    })
  );
  assert!(matches!(
    program.attribute_checked("tangent"),
    Err(Error::UnknownAttribute { .. })
  ));
}

#[test]
fn uniforms_require_the_program_to_be_active() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let exposure = program.uniform_checked("exposure").unwrap().clone();

  assert!(matches!(
    ctx.program_uniform_put(&exposure, 1.5f32),
    Err(Error::ConstraintViolation(_))
  ));

  ctx.program_activate(&program).unwrap();
  assert!(ctx.program_is_active(&program).unwrap());
  ctx.program_uniform_put(&exposure, 1.5f32).unwrap();

  let id = program.handle().id();
  assert_eq!(
    ctx.backend().uniform_value(id, exposure.location()),
    Some(UniformValue::Float(1.5))
  );
  assert_eq!(ctx.backend().counters().uniform_submissions, 1);
}

#[test]
fn uniform_types_are_checked() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let exposure = program.uniform_checked("exposure").unwrap().clone();
  let albedo = program.uniform_checked("albedo").unwrap().clone();

  ctx.program_activate(&program).unwrap();

  assert_eq!(
    ctx.program_uniform_put(&exposure, 1i32),
    Err(Error::UniformTypeMismatch {
      name: "exposure".to_owned(),
      expected: ShaderType::Float,
      actual: ShaderType::Int,
    })
  );

  // samplers take texture units, which must exist
  ctx
    .program_uniform_put(&albedo, UniformValue::Sampler2D(3))
    .unwrap();
  assert_eq!(
    ctx.program_uniform_put(&albedo, UniformValue::Sampler2D(16)),
    Err(Error::range(16, 16))
  );
}

#[test]
fn deactivate_and_delete() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);

  ctx.program_activate(&program).unwrap();
  assert_eq!(ctx.backend().current_program(), program.handle().id());

  ctx.program_deactivate().unwrap();
  assert_eq!(ctx.program_current(), None);
  assert_eq!(ctx.backend().current_program(), 0);

  ctx.program_activate(&program).unwrap();
  ctx.program_delete(&program).unwrap();
  assert_eq!(ctx.program_current(), None);
  assert_eq!(
    ctx.program_activate(&program),
    Err(Error::deleted(ResourceKind::Program, program.handle().id()))
  );
}

#[test]
fn deleted_shaders_cannot_be_linked() {
  let mut ctx = common::context();
  let vs = ctx
    .shader_compile_vertex("vs", &common::lines(common::VS))
    .unwrap();
  let fs = ctx
    .shader_compile_fragment("fs", &common::lines(common::FS))
    .unwrap();

  ctx.shader_delete(&fs).unwrap();
  assert!(matches!(
    ctx.program_link("test", &vs, None, &fs),
    Err(Error::ResourceDeleted {
      kind: ResourceKind::Shader,
      ..
    })
  ));
  assert!(ctx.shader_delete(&fs).is_err());
}

#[test]
fn program_needs_vertex_and_fragment_shaders() {
  let mut ctx = common::context();
  let fs = ctx
    .shader_compile_fragment("fs", &common::lines(common::FS))
    .unwrap();

  assert!(matches!(
    ctx.program_link_all("test", &[], &[], &[fs]),
    Err(Error::ConstraintViolation(_))
  ));
}

#[test]
fn link_error_carries_log() {
  let mut ctx = common::context();
  let vs = ctx
    .shader_compile_vertex("vs", &common::lines("uniform float t;\nvoid main() { t; }"))
    .unwrap();
  let fs = ctx
    .shader_compile_fragment("fs", &common::lines("uniform vec2 t;\nvoid main() { t; }"))
    .unwrap();

  assert_eq!(
    ctx.program_link("mismatch", &vs, None, &fs).err(),
    Some(Error::compile(
      "mismatch",
      "error: t declared as both float and vec2"
    ))
  );
}

#[test]
fn geometry_stage_is_linked() {
  let mut ctx = common::context();
  let vs = ctx
    .shader_compile_vertex("vs", &common::lines(common::VS))
    .unwrap();
  let gs = ctx
    .shader_compile_geometry(
      "gs",
      &common::lines("uniform float width;\nvoid main() { EmitVertex(); width; }"),
    )
    .unwrap();
  let fs = ctx
    .shader_compile_fragment("fs", &common::lines(common::FS))
    .unwrap();

  let program = ctx.program_link("lines", &vs, Some(&gs), &fs).unwrap();

  assert!(program.uniform("width").is_some());
  assert_eq!(program.shaders().len(), 3);
}
