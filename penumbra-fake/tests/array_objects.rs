mod common;

use penumbra::array_object::{AttributeKind, AttributeLayout};
use penumbra::buffer::UsageHint;
use penumbra::error::Error;
use penumbra::handle::{Resource as _, ResourceKind};
use penumbra::scalar::ScalarType;
use penumbra::ContextOpt;
use penumbra_fake::FakeLimits;

#[test]
fn default_array_object_is_bound_and_not_deletable() {
  let mut ctx = common::context();
  let default = ctx.array_object_default().clone();

  assert_eq!(default.handle().id(), 0);
  assert_eq!(ctx.array_object_current(), &default);
  assert!(ctx.array_object_is_bound(&default).unwrap());
  assert_eq!(
    ctx.array_object_delete(&default),
    Err(Error::ObjectNotDeletable {
      kind: ResourceKind::ArrayObject
    })
  );
}

#[test]
fn builder_describes_attributes() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 4);
  let indices = ctx
    .index_buffer_allocate_for(&buffer, UsageHint::StaticDraw)
    .unwrap();

  let mut builder = ctx.array_object_new_builder();
  assert_eq!(builder.max_attributes(), 16);
  assert!(!builder.is_strict());

  builder.set_index_buffer(&indices).unwrap();
  builder
    .set_attribute_from_buffer(0, &buffer, "position")
    .unwrap();
  builder.set_attribute_from_buffer(2, &buffer, "uv").unwrap();
  builder
    .set_attribute_floating_point_with_divisor(
      5,
      &buffer,
      4,
      ScalarType::UnsignedByte,
      32,
      0,
      true,
      1,
    )
    .unwrap();

  let vao = ctx.array_object_allocate(builder).unwrap();
  let id = vao.handle().id();

  assert!(ctx.array_object_is_bound(&vao).unwrap());
  assert_eq!(ctx.backend().bound_array_object(), id);
  assert_eq!(vao.index_buffer(), Some(&indices));
  assert_eq!(ctx.backend().array_object_index_buffer(id), Some(indices.handle().id()));

  assert_eq!(
    ctx.backend().array_object_attribute(id, 2),
    Some((
      buffer.handle().id(),
      AttributeLayout {
        kind: AttributeKind::FloatingPoint { normalized: false },
        components: 2,
        scalar_type: ScalarType::Float,
        stride: 32,
        offset: 24,
        divisor: 0,
      }
    ))
  );
  assert_eq!(
    ctx.backend().array_object_attribute(id, 5).map(|(_, layout)| layout.divisor),
    Some(1)
  );
  assert!(vao.attribute(1).is_none());
  assert!(ctx.backend().array_object_attribute(id, 1).is_none());
}

#[test]
fn builder_rejects_bad_attributes() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 4);
  let mut builder = ctx.array_object_new_builder();

  assert_eq!(
    builder.set_attribute_floating_point(16, &buffer, 3, ScalarType::Float, 32, 0, false),
    Err(Error::Range { index: 16, len: 16 })
  );
  assert!(matches!(
    builder.set_attribute_floating_point(0, &buffer, 5, ScalarType::Float, 32, 0, false),
    Err(Error::ConstraintViolation(_))
  ));
  assert_eq!(
    builder.set_attribute_floating_point(0, &buffer, 3, ScalarType::Float, 32, 128, false),
    Err(Error::Range {
      index: 128,
      len: 128
    })
  );
  assert!(matches!(
    builder.set_attribute_integral(0, &buffer, 1, ScalarType::Float, 32, 0),
    Err(Error::ConstraintViolation(_))
  ));
  assert!(matches!(
    builder.set_attribute_from_buffer(0, &buffer, "tangent"),
    Err(Error::AttributeNotFound { .. })
  ));
  assert!(matches!(builder.disable_attribute(99), Err(Error::Range { .. })));

  builder
    .set_attribute_integral(1, &buffer, 1, ScalarType::Int, 32, 0)
    .unwrap();
  assert_eq!(
    builder.attribute(1).map(|a| a.layout().kind),
    Some(AttributeKind::Integral)
  );
}

#[test]
fn assignments_replace_unless_strict() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 4);

  let mut builder = ctx.array_object_new_builder();
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();
  builder.set_attribute_from_buffer(0, &buffer, "normal").unwrap();
  assert_eq!(builder.attribute(0).map(|a| a.layout().offset), Some(12));

  let mut strict = common::context_with(
    ContextOpt::default().set_strict_array_objects(true),
    FakeLimits::default(),
  );
  let buffer = common::vertex_buffer(&mut strict, 4);

  let mut builder = strict.array_object_new_builder();
  assert!(builder.is_strict());
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();
  assert!(matches!(
    builder.set_attribute_from_buffer(0, &buffer, "normal"),
    Err(Error::ConstraintViolation(_))
  ));

  // disabling frees the location again
  builder.disable_attribute(0).unwrap();
  builder.set_attribute_from_buffer(0, &buffer, "normal").unwrap();
}

#[test]
fn builder_from_copies_without_sharing() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 4);

  let mut builder = ctx.array_object_new_builder();
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();
  builder.set_attribute_from_buffer(1, &buffer, "normal").unwrap();
  let vao = ctx.array_object_allocate(builder).unwrap();

  let mut copy = ctx.array_object_new_builder_from(&vao).unwrap();
  assert_eq!(copy.attribute(0), vao.attribute(0));
  assert_eq!(copy.attribute(1), vao.attribute(1));

  copy.disable_attribute(1).unwrap();
  copy.set_attribute_from_buffer(2, &buffer, "uv").unwrap();
  let other = ctx.array_object_allocate(copy).unwrap();

  assert!(vao.attribute(1).is_some());
  assert!(vao.attribute(2).is_none());
  assert!(other.attribute(1).is_none());
  assert_ne!(vao, other);

  let mut reset = ctx.array_object_new_builder_from(&other).unwrap();
  reset.reset();
  assert!(reset.attribute(0).is_none());
  assert!(reset.index_buffer().is_none());
}

#[test]
fn delete_rebinds_the_default() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 4);

  let mut builder = ctx.array_object_new_builder();
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();
  let vao = ctx.array_object_allocate(builder).unwrap();

  ctx.array_object_delete(&vao).unwrap();

  assert!(vao.is_deleted());
  assert!(!buffer.is_deleted());
  assert_eq!(ctx.array_object_current(), ctx.array_object_default());
  assert_eq!(ctx.backend().bound_array_object(), 0);

  assert!(matches!(ctx.array_object_bind(&vao), Err(Error::ResourceDeleted { .. })));
  assert!(matches!(
    ctx.array_object_new_builder_from(&vao),
    Err(Error::ResourceDeleted { .. })
  ));
  assert!(matches!(ctx.array_object_delete(&vao), Err(Error::ResourceDeleted { .. })));
}

#[test]
fn deleted_buffers_are_caught() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 4);

  let mut builder = ctx.array_object_new_builder();
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();
  let vao = ctx.array_object_allocate(builder).unwrap();

  let mut pending = ctx.array_object_new_builder();
  pending.set_attribute_from_buffer(0, &buffer, "normal").unwrap();

  ctx.array_buffer_delete(&buffer).unwrap();

  assert!(matches!(vao.check_references(), Err(Error::ResourceDeleted { .. })));
  assert!(matches!(
    ctx.array_object_allocate(pending),
    Err(Error::ResourceDeleted { .. })
  ));
  assert!(matches!(
    ctx
      .array_object_new_builder()
      .set_attribute_from_buffer(0, &buffer, "position"),
    Err(Error::ResourceDeleted { .. })
  ));

  // binding is allowed; drawing with it is not
  ctx.array_object_unbind().unwrap();
  ctx.array_object_bind(&vao).unwrap();
}
