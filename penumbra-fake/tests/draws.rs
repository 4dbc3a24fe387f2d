mod common;

use penumbra::array_object::ArrayObject;
use penumbra::blending::{Blending, Equation, Factor};
use penumbra::buffer::{IndexBuffer, IndexType, UsageHint};
use penumbra::context::Context;
use penumbra::depth_test::{DepthComparison, DepthState};
use penumbra::draw::{ClearOptions, Primitive};
use penumbra::error::Error;
use penumbra::face_culling::FaceCulling;
use penumbra::handle::Resource as _;
use penumbra::render_state::{PolygonMode, RenderState};
use penumbra::stencil::{StencilComparison, StencilFace, StencilOperation, StencilState};
use penumbra::texture::Area;
use penumbra_fake::{DrawCall, FakeBackend};

// An array object sourcing position, and an index buffer over its vertices when `indexed`.
fn mesh(ctx: &mut Context<FakeBackend>, indexed: bool) -> (ArrayObject, Option<IndexBuffer>) {
  let buffer = common::vertex_buffer(ctx, 4);
  let mut builder = ctx.array_object_new_builder();
  builder.set_attribute_from_buffer(0, &buffer, "position").unwrap();

  let indices = if indexed {
    let indices = ctx
      .index_buffer_allocate(6, UsageHint::StaticDraw)
      .unwrap();
    ctx.index_buffer_update(&indices, &[0, 1, 2, 2, 3, 0]).unwrap();
    builder.set_index_buffer(&indices).unwrap();
    Some(indices)
  } else {
    None
  };

  (ctx.array_object_allocate(builder).unwrap(), indices)
}

#[test]
fn drawing_requires_a_program() {
  let mut ctx = common::context();
  mesh(&mut ctx, false);

  assert!(matches!(
    ctx.draw_unindexed(Primitive::Triangles, 0, 3),
    Err(Error::ConstraintViolation(_))
  ));
  assert!(ctx.backend().draws().is_empty());
}

#[test]
fn unindexed_draws() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let (vao, _) = mesh(&mut ctx, false);
  ctx.program_activate(&program).unwrap();

  ctx.draw_unindexed(Primitive::TriangleStrip, 0, 4).unwrap();
  ctx
    .draw_unindexed_instanced(Primitive::Points, 1, 2, 10)
    .unwrap();

  assert_eq!(
    ctx.backend().draws(),
    &[
      DrawCall {
        primitive: Primitive::TriangleStrip,
        first: 0,
        count: 4,
        index_type: None,
        instances: 1,
        program: program.handle().id(),
        array_object: vao.handle().id(),
        framebuffer: 0,
      },
      DrawCall {
        primitive: Primitive::Points,
        first: 1,
        count: 2,
        index_type: None,
        instances: 10,
        program: program.handle().id(),
        array_object: vao.handle().id(),
        framebuffer: 0,
      },
    ]
  );
}

#[test]
fn ranges_past_the_end_of_memory_are_passed_through() {
  let mut ctx = common::context();
  log::set_max_level(log::LevelFilter::Trace);

  let program = common::program(&mut ctx);
  mesh(&mut ctx, false);
  ctx.program_activate(&program).unwrap();

  ctx
    .draw_unindexed(Primitive::Points, usize::MAX - 1, 4)
    .unwrap();

  let draw = &ctx.backend().draws()[0];
  assert_eq!(draw.first, usize::MAX - 1);
  assert_eq!(draw.count, 4);
}

#[test]
fn indexed_draws_use_the_index_buffer_of_the_array_object() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  ctx.program_activate(&program).unwrap();

  // the default array object has no index buffer
  assert!(matches!(
    ctx.draw_indexed(Primitive::Triangles),
    Err(Error::ConstraintViolation(_))
  ));

  let (vao, indices) = mesh(&mut ctx, true);
  let indices = indices.unwrap();
  assert_eq!(indices.index_type(), IndexType::UnsignedByte);

  ctx.draw_indexed(Primitive::Triangles).unwrap();
  ctx.draw_indexed_instanced(Primitive::Triangles, 3).unwrap();

  let draws = ctx.backend().draws();
  assert_eq!(draws.len(), 2);
  assert!(draws.iter().all(|d| d.count == 6
    && d.index_type == Some(IndexType::UnsignedByte)
    && d.array_object == vao.handle().id()));
  assert_eq!(draws[1].instances, 3);

  ctx.index_buffer_delete(&indices).unwrap();
  assert!(matches!(
    ctx.draw_indexed(Primitive::Triangles),
    Err(Error::ResourceDeleted { .. })
  ));
}

#[test]
fn deleted_objects_stop_draws() {
  let mut ctx = common::context();
  let program = common::program(&mut ctx);
  let (vao, _) = mesh(&mut ctx, false);
  ctx.program_activate(&program).unwrap();

  let buffer = vao.attribute(0).map(|a| a.buffer().clone()).unwrap();
  ctx.array_buffer_delete(&buffer).unwrap();

  assert!(matches!(
    ctx.draw_unindexed(Primitive::Lines, 0, 2),
    Err(Error::ResourceDeleted { .. })
  ));

  ctx.array_object_unbind().unwrap();
  ctx.draw_unindexed(Primitive::Lines, 0, 2).unwrap();

  ctx.program_delete(&program).unwrap();
  assert!(matches!(
    ctx.draw_unindexed(Primitive::Lines, 0, 2),
    Err(Error::ConstraintViolation(_))
  ));
}

#[test]
fn clear_the_draw_framebuffer() {
  let mut ctx = common::context();
  let options = ClearOptions {
    color: Some([0.1, 0.2, 0.3, 1.]),
    depth: None,
    stencil: Some(0),
  };

  ctx.clear(&ClearOptions::default()).unwrap();
  ctx.clear(&options).unwrap();

  assert_eq!(ctx.backend().clears(), &[ClearOptions::default(), options]);
}

#[test]
fn render_states_reach_the_backend() {
  let mut ctx = common::context();
  let state = RenderState::default()
    .set_blending(Blending::new(
      Equation::Additive,
      Factor::SrcAlpha,
      Factor::SrcAlphaComplement,
    ))
    .set_depth(DepthState {
      test: Some(DepthComparison::LessOrEqual),
      write: false,
      clamp: false,
    })
    .set_face_culling(FaceCulling::default())
    .set_scissor(Area::new(0, 0, 0, 0))
    .set_polygon_mode(PolygonMode::Line);

  assert_eq!(ctx.backend().render_state(), None);

  ctx.render_state_apply(&state).unwrap();
  ctx.render_state_apply(&state).unwrap();

  assert_eq!(ctx.backend().render_state(), Some(&state));
  assert_eq!(ctx.backend().counters().render_state_applications, 2);
  assert_eq!(state.scissor(), Some(Area::new(0, 0, 0, 0)));
  assert!(state.logic_op().is_none());
}

#[test]
fn stencil_states_reach_the_backend() {
  let mut ctx = common::context();
  let outline = StencilFace::default()
    .set_test(StencilComparison::NotEqual, 1, 0xff)
    .set_write_mask(0);
  let mark = StencilFace::default()
    .set_test(StencilComparison::Always, 1, 0xff)
    .set_operations(
      StencilOperation::Keep,
      StencilOperation::Keep,
      StencilOperation::Replace,
    );

  let state = RenderState::default().set_stencil(StencilState::separate(mark, outline));
  ctx.render_state_apply(&state).unwrap();

  let applied = ctx.backend().render_state().and_then(RenderState::stencil);
  assert_eq!(applied.map(|s| s.front), Some(mark));
  assert_eq!(applied.map(|s| s.back.write_mask), Some(0));
  assert_eq!(applied.map(|s| s.back.pass), Some(StencilOperation::Keep));

  let disabled = state.set_stencil(None);
  ctx.render_state_apply(&disabled).unwrap();
  assert_eq!(ctx.backend().render_state().and_then(RenderState::stencil), None);
  assert_eq!(RenderState::default().stencil(), None);
}
