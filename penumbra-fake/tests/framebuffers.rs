mod common;

use penumbra::context::Context;
use penumbra::error::Error;
use penumbra::framebuffer::{
  AttachmentSource, BlitFilter, BlitRegion, DepthAttachment, Framebuffer, FramebufferStatus,
  RenderbufferFormat,
};
use penumbra::handle::Resource as _;
use penumbra::texture::{
  Area, MagFilter, MinFilter, Texture2D, TextureFormat, TextureUnit, TextureWrap,
};
use penumbra_fake::FakeBackend;

fn texture(
  ctx: &mut Context<FakeBackend>,
  unit: &TextureUnit,
  format: TextureFormat,
) -> Texture2D {
  ctx
    .texture_2d_allocate(
      unit,
      64,
      64,
      format,
      TextureWrap::ClampToEdge,
      TextureWrap::ClampToEdge,
      MinFilter::Nearest,
      MagFilter::Nearest,
    )
    .unwrap()
}

// A framebuffer with one color texture, left unbound from every texture unit.
fn framebuffer(ctx: &mut Context<FakeBackend>) -> (Framebuffer, Texture2D) {
  let unit = ctx.texture_units()[0];
  let color = texture(ctx, &unit, TextureFormat::RGBA8);
  ctx.texture_unit_unbind(&unit).unwrap();

  let points = ctx.framebuffer_color_attachment_points();
  let buffers = ctx.framebuffer_draw_buffers();
  let mut builder = ctx.framebuffer_new_builder();
  builder
    .attach_color_texture_2d_at(points[0], buffers[0], &color)
    .unwrap();

  (ctx.framebuffer_allocate(builder).unwrap(), color)
}

fn blit(color: bool, depth: bool, filter: BlitFilter) -> BlitRegion {
  BlitRegion {
    source: Area::new(0, 0, 64, 64),
    target: Area::new(0, 0, 32, 32),
    color,
    depth,
    stencil: false,
    filter,
  }
}

#[test]
fn allocation_binds_for_drawing() {
  let mut ctx = common::context();
  let unit = ctx.texture_units()[0];
  let color = texture(&mut ctx, &unit, TextureFormat::RGBA8);
  let depth = ctx
    .renderbuffer_allocate(RenderbufferFormat::Depth24, 64, 64)
    .unwrap();

  let points = ctx.framebuffer_color_attachment_points();
  let buffers = ctx.framebuffer_draw_buffers();
  assert_eq!((points.len(), buffers.len()), (8, 8));

  let mut builder = ctx.framebuffer_new_builder();
  builder
    .attach_color_texture_2d_at(points[2], buffers[1], &color)
    .unwrap();
  builder.attach_depth_renderbuffer(&depth).unwrap();

  let fb = ctx.framebuffer_allocate(builder).unwrap();

  assert_eq!(ctx.backend().draw_framebuffer(), fb.handle().id());
  assert!(ctx.framebuffer_draw_is_bound(&fb).unwrap());
  assert!(!ctx.framebuffer_read_is_bound(&fb).unwrap());
  assert_eq!(fb.color_attachments().len(), 1);
  assert_eq!(fb.color_attachments()[0].point, points[2]);
  assert!(fb.has_depth());
  assert!(!fb.has_stencil());
  assert!(fb.attaches(depth.handle()));
}

#[test]
fn builder_rules() {
  let mut ctx = common::context();
  let unit = ctx.texture_units()[0];
  let first = texture(&mut ctx, &unit, TextureFormat::RGBA8);
  let second = texture(&mut ctx, &unit, TextureFormat::RGBA8);
  let float3 = texture(&mut ctx, &unit, TextureFormat::RGB32F);
  let depth = texture(&mut ctx, &unit, TextureFormat::Depth24Stencil8);

  let points = ctx.framebuffer_color_attachment_points();
  let buffers = ctx.framebuffer_draw_buffers();
  let mut builder = ctx.framebuffer_new_builder();

  // the last attachment at a point wins
  builder
    .attach_color_texture_2d_at(points[0], buffers[0], &first)
    .unwrap();
  builder
    .attach_color_texture_2d_at(points[0], buffers[0], &second)
    .unwrap();
  assert_eq!(
    builder.color_attachment(points[0]).map(|c| &c.source),
    Some(&AttachmentSource::Texture2D(second.clone()))
  );

  // a draw buffer maps to one point only
  assert!(matches!(
    builder.attach_color_texture_2d_at(points[1], buffers[0], &first),
    Err(Error::ConstraintViolation(_))
  ));

  assert!(matches!(
    builder.attach_color_texture_2d_at(points[1], buffers[1], &float3),
    Err(Error::ConstraintViolation(_))
  ));
  assert!(matches!(
    builder.attach_color_texture_2d_at(points[1], buffers[1], &depth),
    Err(Error::ConstraintViolation(_))
  ));
  assert!(matches!(
    builder.attach_depth_texture_2d(&first),
    Err(Error::ConstraintViolation(_))
  ));

  // depth and depth-stencil replace each other
  let renderbuffer = ctx
    .renderbuffer_allocate(RenderbufferFormat::Depth24, 64, 64)
    .unwrap();
  builder.attach_depth_renderbuffer(&renderbuffer).unwrap();
  builder.attach_depth_stencil_texture_2d(&depth).unwrap();
  assert!(matches!(
    builder.depth_attachment(),
    Some(DepthAttachment::DepthStencil(AttachmentSource::Texture2D(_)))
  ));

  builder.detach_depth();
  builder.detach_color_attachment(points[0]);
  assert_eq!(builder.color_attachments().count(), 0);
  assert!(builder.depth_attachment().is_none());
}

#[test]
fn incomplete_framebuffers_are_deleted() {
  let mut ctx = common::context();
  let empty = ctx.framebuffer_new_builder();

  assert!(matches!(
    ctx.framebuffer_allocate(empty),
    Err(Error::FramebufferIncomplete(FramebufferStatus::IncompleteMissingAttachment))
  ));

  let renderbuffer = ctx
    .renderbuffer_allocate(RenderbufferFormat::RGBA8, 16, 16)
    .unwrap();
  let points = ctx.framebuffer_color_attachment_points();
  let buffers = ctx.framebuffer_draw_buffers();
  let mut builder = ctx.framebuffer_new_builder();
  builder
    .attach_color_renderbuffer_at(points[0], buffers[0], &renderbuffer)
    .unwrap();

  ctx
    .backend_mut()
    .set_framebuffer_status(Some(FramebufferStatus::Unsupported));

  assert_eq!(
    ctx.framebuffer_allocate(builder),
    Err(Error::FramebufferIncomplete(FramebufferStatus::Unsupported))
  );
  assert_eq!(ctx.backend().draw_framebuffer(), 0);
  assert!(ctx.framebuffer_draw_current().is_none());

  // only the renderbuffer is left
  assert_eq!(ctx.backend().object_count(), 1);
}

#[test]
fn deleted_attachments_are_rejected() {
  let mut ctx = common::context();
  let renderbuffer = ctx
    .renderbuffer_allocate(RenderbufferFormat::RGB8, 16, 16)
    .unwrap();
  let points = ctx.framebuffer_color_attachment_points();
  let buffers = ctx.framebuffer_draw_buffers();
  let mut builder = ctx.framebuffer_new_builder();
  builder
    .attach_color_renderbuffer_at(points[0], buffers[0], &renderbuffer)
    .unwrap();

  ctx.renderbuffer_delete(&renderbuffer).unwrap();

  assert!(matches!(
    ctx.framebuffer_allocate(builder),
    Err(Error::ResourceDeleted { .. })
  ));
  assert!(matches!(
    ctx
      .framebuffer_new_builder()
      .attach_depth_renderbuffer(&renderbuffer),
    Err(Error::ResourceDeleted { .. })
  ));
}

#[test]
fn feedback_loops_are_rejected() {
  let mut ctx = common::context();
  let units = ctx.texture_units();
  let color = texture(&mut ctx, &units[0], TextureFormat::RGBA8);

  let points = ctx.framebuffer_color_attachment_points();
  let buffers = ctx.framebuffer_draw_buffers();
  let mut builder = ctx.framebuffer_new_builder();
  builder
    .attach_color_texture_2d_at(points[0], buffers[0], &color)
    .unwrap();

  // allocation binds the framebuffer even though the texture is still bound to unit 0
  let fb = ctx.framebuffer_allocate(builder).unwrap();

  assert!(matches!(
    ctx.texture_unit_bind_2d(&units[1], &color),
    Err(Error::ConstraintViolation(_))
  ));

  ctx.framebuffer_draw_unbind().unwrap();
  assert!(matches!(
    ctx.framebuffer_draw_bind(&fb),
    Err(Error::ConstraintViolation(_))
  ));

  ctx.texture_unit_unbind(&units[0]).unwrap();
  ctx.framebuffer_draw_bind(&fb).unwrap();
  assert_eq!(ctx.backend().draw_framebuffer(), fb.handle().id());

  // binding for reading only is not a loop
  ctx.framebuffer_draw_unbind().unwrap();
  ctx.framebuffer_read_bind(&fb).unwrap();
  ctx.texture_unit_bind_2d(&units[1], &color).unwrap();
}

#[test]
fn blit_rules() {
  let mut ctx = common::context();
  let (fb, _) = framebuffer(&mut ctx);

  ctx.framebuffer_draw_unbind().unwrap();
  assert!(matches!(
    ctx.framebuffer_blit(&blit(true, false, BlitFilter::Nearest)),
    Err(Error::ConstraintViolation(_))
  ));

  ctx.framebuffer_draw_bind(&fb).unwrap();
  ctx.framebuffer_read_bind(&fb).unwrap();
  assert!(matches!(
    ctx.framebuffer_blit(&blit(true, false, BlitFilter::Nearest)),
    Err(Error::ConstraintViolation(_))
  ));

  ctx.framebuffer_read_unbind().unwrap();
  assert_eq!(ctx.backend().read_framebuffer(), 0);

  assert!(matches!(
    ctx.framebuffer_blit(&blit(false, false, BlitFilter::Nearest)),
    Err(Error::ConstraintViolation(_))
  ));
  assert!(matches!(
    ctx.framebuffer_blit(&blit(false, true, BlitFilter::Linear)),
    Err(Error::ConstraintViolation(_))
  ));
  assert!(ctx.backend().blits().is_empty());

  let region = blit(true, false, BlitFilter::Linear);
  ctx.framebuffer_blit(&region).unwrap();
  assert_eq!(ctx.backend().blits(), &[region]);
}

#[test]
fn delete_unbinds_but_keeps_attachments() {
  let mut ctx = common::context();
  let (fb, color) = framebuffer(&mut ctx);
  ctx.framebuffer_read_bind(&fb).unwrap();

  ctx.framebuffer_delete(&fb).unwrap();

  assert!(fb.is_deleted());
  assert!(!color.is_deleted());
  assert_eq!(ctx.backend().draw_framebuffer(), 0);
  assert_eq!(ctx.backend().read_framebuffer(), 0);
  assert!(ctx.framebuffer_read_current().is_none());

  assert!(matches!(ctx.framebuffer_draw_bind(&fb), Err(Error::ResourceDeleted { .. })));
  assert!(matches!(ctx.framebuffer_read_bind(&fb), Err(Error::ResourceDeleted { .. })));
  assert!(matches!(ctx.framebuffer_delete(&fb), Err(Error::ResourceDeleted { .. })));
}

#[test]
fn renderbuffer_sizes() {
  let mut ctx = common::context();
  let max = ctx.capabilities().max_texture_size();

  for &(width, height) in &[(0, 1), (1, 0), (max + 1, 1)] {
    assert!(matches!(
      ctx.renderbuffer_allocate(RenderbufferFormat::RGBA8, width, height),
      Err(Error::InvalidSize(_))
    ));
  }

  let renderbuffer = ctx
    .renderbuffer_allocate(RenderbufferFormat::Depth24Stencil8, 1, 3)
    .unwrap();
  assert_eq!((renderbuffer.width(), renderbuffer.height()), (1, 3));
  assert_eq!(
    ctx.backend().renderbuffer_storage(renderbuffer.handle().id()),
    Some((RenderbufferFormat::Depth24Stencil8, 1, 3))
  );

  ctx.renderbuffer_delete(&renderbuffer).unwrap();
  assert_eq!(ctx.backend().renderbuffer_storage(renderbuffer.handle().id()), None);
}
