mod common;

use penumbra::draw::Primitive;
use penumbra::error::Error;
use penumbra::execution::CheckedExecution;
use penumbra::handle::Resource as _;
use penumbra::shader::{ShaderType, UniformValue};
use penumbra::Context;
use penumbra_fake::FakeBackend;

const IDENTITY: [[f32; 4]; 4] = [
  [1., 0., 0., 0.],
  [0., 1., 0., 0.],
  [0., 0., 1., 0.],
  [0., 0., 0., 1.],
];

#[test]
fn incomplete_binding_lists_missing_names() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();
  exec.put_uniform(&mut ctx, "projection", IDENTITY).unwrap();
  exec
    .bind_attribute(&mut ctx, "position", &buffer, "position")
    .unwrap();

  assert_eq!(
    exec.validate(),
    Err(Error::IncompleteBinding {
      uniforms: vec!["albedo".to_owned(), "exposure".to_owned()],
      attributes: vec!["normal".to_owned(), "uv".to_owned()],
    })
  );

  // a failed run keeps the pass open
  assert!(exec
    .run(&mut ctx, |ctx| ctx.draw_unindexed(Primitive::Triangles, 0, 3))
    .is_err());
  assert!(exec.is_preparing());
  assert!(ctx.backend().draws().is_empty());

  exec.cancel(&mut ctx).unwrap();
  assert!(!exec.is_preparing());
}

#[test]
fn complete_pass_draws_and_cleans_up() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();
  assert!(ctx.program_is_active(&program).unwrap());

  exec.put_uniform(&mut ctx, "projection", IDENTITY).unwrap();
  exec
    .put_uniform(&mut ctx, "albedo", UniformValue::Sampler2D(0))
    .unwrap();
  exec.put_uniform(&mut ctx, "exposure", 1f32).unwrap();
  exec
    .bind_attribute(&mut ctx, "position", &buffer, "position")
    .unwrap();
  exec
    .bind_attribute(&mut ctx, "normal", &buffer, "normal")
    .unwrap();
  exec.put_attribute(&mut ctx, "uv", [0.5f32, 0.5]).unwrap();

  let default = ctx.array_object_default().handle().id();
  let normal = program.attribute("normal").unwrap().location();
  let (source, layout) = ctx
    .backend()
    .array_object_attribute(default, normal)
    .unwrap();
  assert_eq!(source, buffer.handle().id());
  assert_eq!((layout.offset, layout.stride, layout.components), (12, 32, 3));

  exec
    .run(&mut ctx, |ctx| ctx.draw_unindexed(Primitive::Triangles, 0, 3))
    .unwrap();

  let draws = ctx.backend().draws();
  assert_eq!(draws.len(), 1);
  assert_eq!(draws[0].program, program.handle().id());
  assert_eq!(draws[0].count, 3);

  // arrays disabled and program deactivated
  assert!(!exec.is_preparing());
  assert_eq!(ctx.program_current(), None);
  assert_eq!(ctx.backend().array_object_attribute(default, normal), None);

  let uv = program.attribute("uv").unwrap().location();
  assert_eq!(
    ctx.backend().attribute_value(uv),
    Some(UniformValue::Vec2([0.5, 0.5]))
  );
}

#[test]
fn use_existing_reuses_previous_values() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();
  assert!(matches!(
    exec.use_existing(&mut ctx, "projection"),
    Err(Error::ConstraintViolation(_))
  ));

  exec.put_uniform(&mut ctx, "projection", IDENTITY).unwrap();
  exec
    .put_uniform(&mut ctx, "albedo", UniformValue::Sampler2D(0))
    .unwrap();
  exec.put_uniform(&mut ctx, "exposure", 2f32).unwrap();

  for name in ["position", "normal", "uv"] {
    exec.bind_attribute(&mut ctx, name, &buffer, name).unwrap();
  }

  exec.run(&mut ctx, |_| Ok(())).unwrap();
  let submissions = ctx.backend().counters().uniform_submissions;

  // second pass: only the exposure changes
  exec.prepare(&mut ctx).unwrap();
  exec.use_existing(&mut ctx, "projection").unwrap();
  exec.use_existing(&mut ctx, "albedo").unwrap();
  exec.put_uniform(&mut ctx, "exposure", 0.5f32).unwrap();

  for name in ["position", "normal", "uv"] {
    exec.bind_attribute(&mut ctx, name, &buffer, name).unwrap();
  }

  exec.validate().unwrap();
  exec.run(&mut ctx, |_| Ok(())).unwrap();

  assert_eq!(ctx.backend().counters().uniform_submissions, submissions + 1);
  assert!(exec.was_ever_assigned("projection"));
}

#[test]
fn declared_but_inactive_variables_are_ignored() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.declare_uniform("time", ShaderType::Float);
  exec.declare_attribute("color", ShaderType::Vec3);

  exec.prepare(&mut ctx).unwrap();
  exec.put_uniform(&mut ctx, "time", 1f32).unwrap();
  exec
    .bind_attribute(&mut ctx, "color", &buffer, "normal")
    .unwrap();

  assert!(matches!(
    exec.put_uniform(&mut ctx, "time", 1i32),
    Err(Error::UniformTypeMismatch { .. })
  ));
  assert!(matches!(
    exec.put_uniform(&mut ctx, "speed", 1f32),
    Err(Error::UnknownUniform { .. })
  ));
  assert!(matches!(
    exec.bind_attribute(&mut ctx, "color", &buffer, "uv"),
    Err(Error::AttributeTypeMismatch { .. })
  ));
}

#[test]
fn buffer_data_must_fit_attribute() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();

  assert!(matches!(
    exec.bind_attribute(&mut ctx, "position", &buffer, "uv"),
    Err(Error::AttributeTypeMismatch { .. })
  ));
  assert_eq!(
    exec
      .bind_attribute(&mut ctx, "position", &buffer, "tangent")
      .err(),
    Some(Error::AttributeNotFound {
      name: "tangent".to_owned()
    })
  );
}

#[test]
fn passes_cannot_overlap() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let mut exec = CheckedExecution::new(&program);

  assert!(exec.put_uniform(&mut ctx, "exposure", 1f32).is_err());
  assert!(exec.validate().is_err());

  exec.prepare(&mut ctx).unwrap();
  assert!(matches!(
    exec.prepare(&mut ctx),
    Err(Error::ConstraintViolation(_))
  ));
}

#[test]
fn draw_error_wins_over_cleanup() {
  let mut ctx = common::context();
  let vs = "in vec3 position;\nvoid main() { gl_Position = vec4(position, 1.); }";
  let fs = "out vec4 frag;\nvoid main() { frag = vec4(1.); }";
  let program = common::program_from(&mut ctx, vs, fs);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();
  exec
    .bind_attribute(&mut ctx, "position", &buffer, "position")
    .unwrap();

  let r: Result<(), Error> = exec.run(&mut ctx, |_| Err(Error::constraint("draw failed")));

  assert_eq!(r, Err(Error::constraint("draw failed")));
  assert!(!exec.is_preparing());
  assert_eq!(ctx.program_current(), None);
}

fn put_uniforms(exec: &mut CheckedExecution, ctx: &mut Context<FakeBackend>) {
  exec.put_uniform(ctx, "projection", IDENTITY).unwrap();
  exec
    .put_uniform(ctx, "albedo", UniformValue::Sampler2D(0))
    .unwrap();
  exec.put_uniform(ctx, "exposure", 1f32).unwrap();
}

#[test]
fn allocated_array_objects_survive_passes() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let built = common::vertex_buffer(&mut ctx, 3);
  let other = common::vertex_buffer(&mut ctx, 3);
  let position = program.attribute("position").unwrap().location();
  let normal = program.attribute("normal").unwrap().location();

  let mut builder = ctx.array_object_new_builder();
  builder
    .set_attribute_from_buffer(position, &built, "position")
    .unwrap();
  builder
    .set_attribute_from_buffer(normal, &built, "normal")
    .unwrap();
  let vao = ctx.array_object_allocate(builder).unwrap();
  let id = vao.handle().id();
  let built_position = ctx.backend().array_object_attribute(id, position);
  let built_normal = ctx.backend().array_object_attribute(id, normal);

  let mut exec = CheckedExecution::new(&program);
  exec.prepare(&mut ctx).unwrap();
  put_uniforms(&mut exec, &mut ctx);
  exec
    .bind_attribute(&mut ctx, "position", &other, "position")
    .unwrap();
  exec.put_attribute(&mut ctx, "normal", [0f32, 0., 1.]).unwrap();
  exec.put_attribute(&mut ctx, "uv", [0f32, 0.]).unwrap();

  let during = exec
    .run(&mut ctx, |ctx| {
      let backend = ctx.backend();
      Ok((
        backend.array_object_attribute(id, position),
        backend.array_object_attribute(id, normal),
      ))
    })
    .unwrap();

  // the pass reads its own sources
  assert_eq!(during.0.map(|(buffer, _)| buffer), Some(other.handle().id()));
  assert_eq!(during.1, None);

  // and the array object is back to what it was built with
  assert!(ctx.array_object_is_bound(&vao).unwrap());
  assert!(vao.attribute(position).is_some());
  assert_eq!(ctx.backend().array_object_attribute(id, position), built_position);
  assert_eq!(ctx.backend().array_object_attribute(id, normal), built_normal);

  // cancelling restores too
  exec.prepare(&mut ctx).unwrap();
  exec
    .bind_attribute(&mut ctx, "normal", &other, "normal")
    .unwrap();
  exec.cancel(&mut ctx).unwrap();
  assert_eq!(ctx.backend().array_object_attribute(id, normal), built_normal);
}

#[test]
fn overrides_are_restored_on_the_array_object_they_changed() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let position = program.attribute("position").unwrap().location();
  let default = ctx.array_object_default().handle().id();

  let mut builder = ctx.array_object_new_builder();
  builder
    .set_attribute_from_buffer(position, &buffer, "normal")
    .unwrap();
  let vao = ctx.array_object_allocate(builder).unwrap();
  let built = ctx.backend().array_object_attribute(vao.handle().id(), position);
  ctx.array_object_unbind().unwrap();

  let mut exec = CheckedExecution::new(&program);
  exec.prepare(&mut ctx).unwrap();
  put_uniforms(&mut exec, &mut ctx);

  for name in ["position", "normal", "uv"] {
    exec.bind_attribute(&mut ctx, name, &buffer, name).unwrap();
  }

  // the draw switches array objects; the default one still gets cleaned up
  exec
    .run(&mut ctx, |ctx| ctx.array_object_bind(&vao))
    .unwrap();

  assert!(ctx.array_object_is_bound(&vao).unwrap());
  assert_eq!(ctx.backend().bound_array_object(), vao.handle().id());
  assert_eq!(ctx.backend().array_object_attribute(default, position), None);
  assert_eq!(
    ctx.backend().array_object_attribute(vao.handle().id(), position),
    built
  );
}

#[test]
fn reused_attribute_arrays_are_enabled_again() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let default = ctx.array_object_default().handle().id();
  let position = program.attribute("position").unwrap().location();
  let uv = program.attribute("uv").unwrap().location();
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();
  put_uniforms(&mut exec, &mut ctx);
  exec
    .bind_attribute(&mut ctx, "position", &buffer, "position")
    .unwrap();
  exec
    .bind_attribute(&mut ctx, "normal", &buffer, "normal")
    .unwrap();
  exec.put_attribute(&mut ctx, "uv", [0.25f32, 0.75]).unwrap();
  exec.run(&mut ctx, |_| Ok(())).unwrap();

  assert_eq!(ctx.backend().array_object_attribute(default, position), None);

  exec.prepare(&mut ctx).unwrap();
  for name in ["projection", "albedo", "exposure", "position", "normal", "uv"] {
    exec.use_existing(&mut ctx, name).unwrap();
  }

  let sources = exec
    .run(&mut ctx, |ctx| {
      let backend = ctx.backend();
      Ok((
        backend.array_object_attribute(default, position),
        backend.array_object_attribute(default, uv),
        backend.attribute_value(uv),
      ))
    })
    .unwrap();

  let (source, layout) = sources.0.unwrap();
  assert_eq!(source, buffer.handle().id());
  assert_eq!((layout.offset, layout.stride, layout.components), (0, 32, 3));
  assert_eq!(sources.1, None);
  assert_eq!(sources.2, Some(UniformValue::Vec2([0.25, 0.75])));
  assert_eq!(ctx.backend().array_object_attribute(default, position), None);
}

#[test]
fn reusing_an_array_of_a_deleted_buffer_fails() {
  let mut ctx = common::context();
  let vs = "in vec3 position;\nvoid main() { gl_Position = vec4(position, 1.); }";
  let fs = "out vec4 frag;\nvoid main() { frag = vec4(1.); }";
  let program = common::program_from(&mut ctx, vs, fs);
  let buffer = common::vertex_buffer(&mut ctx, 3);
  let mut exec = CheckedExecution::new(&program);

  exec.prepare(&mut ctx).unwrap();
  exec
    .bind_attribute(&mut ctx, "position", &buffer, "position")
    .unwrap();
  exec.run(&mut ctx, |_| Ok(())).unwrap();

  ctx.array_buffer_delete(&buffer).unwrap();

  exec.prepare(&mut ctx).unwrap();
  assert!(matches!(
    exec.use_existing(&mut ctx, "position"),
    Err(Error::ResourceDeleted { .. })
  ));
  assert!(exec.validate().is_err());
}
