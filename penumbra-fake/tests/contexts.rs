mod common;

use penumbra::buffer::UsageHint;
use penumbra::error::Error;
use penumbra::handle::Resource as _;
use penumbra::{Context, ContextOpt};
use penumbra_fake::{FakeBackend, FakeLimits};
use std::thread;

#[test]
fn information_strings() {
  let ctx = common::context();

  assert_eq!(ctx.vendor().unwrap(), "penumbra");
  assert_eq!(ctx.renderer().unwrap(), "fake");
  assert_eq!(ctx.version().unwrap(), "3.3 (fake)");
  assert_eq!(ctx.shading_language_version().unwrap(), "3.30");
}

#[test]
fn one_current_context_per_thread() {
  let mut first = common::context();
  let mut second = common::context();

  assert!(!first.is_current());
  assert!(second.is_current());
  assert_eq!(first.vendor(), Err(Error::ContextNotCurrent));
  assert!(matches!(
    first.array_buffer_allocate(1, &common::vertex_descriptor(), UsageHint::StaticDraw),
    Err(Error::ContextNotCurrent)
  ));

  first.make_current().unwrap();
  assert!(first.is_current());
  assert!(!second.is_current());
  assert_eq!(first.backend().counters().make_current, 2);

  assert_eq!(second.release_current(), Err(Error::ContextNotCurrent));

  first.release_current().unwrap();
  assert!(!first.is_current());
  assert!(!first.backend().is_current());
  assert_eq!(first.release_current(), Err(Error::ContextNotCurrent));
  assert_eq!(first.program_deactivate(), Err(Error::ContextNotCurrent));
}

#[test]
fn dropping_the_current_context_leaves_none() {
  let mut first = common::context();
  let second = common::context();

  drop(second);
  assert!(!first.is_current());

  first.make_current().unwrap();
  assert!(first.is_current());
}

#[test]
fn currency_is_per_thread() {
  let ctx = common::context();

  thread::spawn(|| {
    let other = Context::new(FakeBackend::new(), ContextOpt::default()).unwrap();
    assert!(other.is_current());
  })
  .join()
  .unwrap();

  assert!(ctx.is_current());
}

#[test]
fn shared_contexts_share_objects_but_not_bindings() {
  let mut first = common::context();
  let buffer = common::vertex_buffer(&mut first, 2);

  let mut builder = first.array_object_new_builder();
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();
  let vao = first.array_object_allocate(builder).unwrap();

  let backend = FakeBackend::new_shared(first.backend());
  let mut second = Context::new_shared(&first, backend, ContextOpt::default()).unwrap();
  let lonely = common::context();

  assert!(second.is_shared_with(&first));
  assert!(!lonely.is_shared_with(&first));
  assert_ne!(second.id(), first.id());

  second.make_current().unwrap();

  // buffers are shared
  assert_eq!(second.backend().buffer_data(buffer.handle().id()), Some(vec![0; 64]));
  assert!(second.array_buffer_current().is_none());
  second.array_buffer_bind(&buffer).unwrap();

  // array objects are not
  assert_eq!(second.array_object_current(), second.array_object_default());
  assert!(matches!(second.array_object_bind(&vao), Err(Error::Driver(_))));

  second.array_buffer_delete(&buffer).unwrap();
  assert_eq!(first.backend().buffer_data(buffer.handle().id()), None);
}

#[test]
fn limits_below_minimum_are_rejected() {
  common::init_logger();

  let limits = [
    FakeLimits::default().set_max_vertex_attribs(8),
    FakeLimits::default().set_max_texture_size(512),
    FakeLimits::default().set_texture_units(-1),
    FakeLimits::default().set_max_color_attachments(4),
    FakeLimits::default().set_max_draw_buffers(1),
  ];

  for limits in limits.iter() {
    assert!(matches!(
      Context::new(FakeBackend::with_limits(*limits), ContextOpt::default()),
      Err(Error::NonCompliantImplementation(_))
    ));
  }
}

#[test]
fn counts_are_clamped_to_the_ceiling() {
  let limits = FakeLimits::default()
    .set_max_vertex_attribs(100_000)
    .set_texture_units(5000)
    .set_max_texture_size(65536);

  let ctx = common::context_with(ContextOpt::default(), limits);
  assert_eq!(ctx.capabilities().max_vertex_attribs(), 1024);
  assert_eq!(ctx.capabilities().texture_units(), 1024);
  assert_eq!(ctx.capabilities().max_texture_size(), 65536);

  let ctx = common::context_with(ContextOpt::default().set_capability_ceiling(32), limits);
  assert_eq!(ctx.capabilities().max_vertex_attribs(), 32);
  assert_eq!(ctx.capabilities().texture_units(), 32);
  assert_eq!(ctx.texture_units().len(), 32);
  assert_eq!(ctx.capabilities().max_color_attachments(), 8);
  assert_eq!(ctx.array_object_default().attributes().len(), 32);
}

#[test]
fn ceilings_under_the_minimum_are_rejected() {
  common::init_logger();

  for ceiling in [0, 1, 15].iter() {
    assert!(matches!(
      Context::new(
        FakeBackend::new(),
        ContextOpt::default().set_capability_ceiling(*ceiling)
      ),
      Err(Error::NonCompliantImplementation(_))
    ));
  }
}
