mod common;

use penumbra::context::Context;
use penumbra::error::Error;
use penumbra::handle::Resource as _;
use penumbra::texture::{MagFilter, MinFilter, Texture2D, TextureFormat, TextureWrap};
use penumbra_fake::FakeBackend;

fn texture(ctx: &mut Context<FakeBackend>) -> Texture2D {
  let unit = ctx.texture_units()[0];
  let texture = ctx
    .texture_2d_allocate(
      &unit,
      4,
      4,
      TextureFormat::RGBA8,
      TextureWrap::Repeat,
      TextureWrap::Repeat,
      MinFilter::Nearest,
      MagFilter::Nearest,
    )
    .unwrap();
  ctx.texture_unit_unbind(&unit).unwrap();

  texture
}

#[test]
fn scopes_take_units_after_their_parent() {
  let mut ctx = common::context();
  let a = texture(&mut ctx);
  let b = texture(&mut ctx);
  let c = texture(&mut ctx);
  let mut units = ctx.texture_unit_allocator(4).unwrap();

  let unit_a = units.bind_2d(&mut ctx, &a).unwrap();
  assert_eq!(unit_a.index(), 0);

  units
    .scope(&mut ctx, |units, ctx| {
      assert_eq!(units.depth(), 2);
      assert_eq!(units.bind_2d(ctx, &b)?.index(), 1);

      units.scope(ctx, |units, ctx| {
        assert_eq!(units.bind_2d(ctx, &c)?.index(), 2);
        assert_eq!(units.allocated(), 3);
        Ok(())
      })?;

      // the nested scope gave its unit back
      assert_eq!(units.allocated(), 2);
      assert_eq!(units.bind_2d(ctx, &c)?.index(), 2);
      Ok(())
    })
    .unwrap();

  assert_eq!(units.depth(), 1);
  assert_eq!(units.allocated(), 1);
  assert_eq!(ctx.backend().texture_unit(0), a.handle().id());
  assert_eq!(ctx.backend().texture_unit(1), 0);
  assert_eq!(ctx.backend().texture_unit(2), 0);
}

#[test]
fn leaving_a_scope_binds_back_what_the_parent_had() {
  let mut ctx = common::context();
  let a = texture(&mut ctx);
  let b = texture(&mut ctx);
  let mut units = ctx.texture_unit_allocator(2).unwrap();
  let unit_a = units.bind_2d(&mut ctx, &a).unwrap();

  units
    .scope(&mut ctx, |_, ctx| ctx.texture_unit_bind_2d(&unit_a, &b))
    .unwrap();

  assert_eq!(ctx.backend().texture_unit(0), a.handle().id());
  assert!(ctx.texture_unit_is_bound(&unit_a, &a).unwrap());
}

#[test]
fn deleted_textures_are_not_bound_back() {
  let mut ctx = common::context();
  let a = texture(&mut ctx);
  let mut units = ctx.texture_unit_allocator(2).unwrap();
  units.bind_2d(&mut ctx, &a).unwrap();

  units
    .scope(&mut ctx, |_, ctx| ctx.texture_delete(&a))
    .unwrap();

  assert_eq!(ctx.backend().texture_unit(0), 0);
  assert_eq!(units.allocated(), 1);
}

#[test]
fn allocation_takes_the_next_unit() {
  let mut ctx = common::context();
  let mut units = ctx.texture_unit_allocator(2).unwrap();

  let (unit, texture) = units
    .allocate_2d(
      &mut ctx,
      8,
      8,
      TextureFormat::R8,
      TextureWrap::ClampToEdge,
      TextureWrap::ClampToEdge,
      MinFilter::Linear,
      MagFilter::Linear,
    )
    .unwrap();
  let (cube_unit, cube) = units
    .allocate_cube(
      &mut ctx,
      8,
      TextureFormat::RGB8,
      TextureWrap::Repeat,
      TextureWrap::Repeat,
      TextureWrap::Repeat,
      MinFilter::Linear,
      MagFilter::Linear,
    )
    .unwrap();

  assert_eq!((unit.index(), cube_unit.index()), (0, 1));
  assert_eq!(ctx.backend().texture_unit(0), texture.handle().id());
  assert_eq!(ctx.backend().texture_unit(1), cube.handle().id());
}

#[test]
fn limits_are_enforced() {
  let mut ctx = common::context();
  let textures: Vec<_> = (0..17).map(|_| texture(&mut ctx)).collect();
  let mut units = ctx.texture_unit_allocator(2).unwrap();

  for texture in &textures[..16] {
    units.bind_2d(&mut ctx, texture).unwrap();
  }

  assert_eq!(units.available(), 0);
  assert!(matches!(
    units.bind_2d(&mut ctx, &textures[16]),
    Err(Error::ConstraintViolation(_))
  ));

  // too deep
  let nested = units.scope(&mut ctx, |units, ctx| units.scope(ctx, |_, _| Ok(())));
  assert!(matches!(nested, Err(Error::ConstraintViolation(_))));
  assert_eq!(units.depth(), 1);

  // too few units for the reservation
  let mut units = ctx.texture_unit_allocator(4).unwrap();
  units.bind_2d(&mut ctx, &textures[0]).unwrap();
  let reserved = units.scope_with_reserved(&mut ctx, 16, |_, _| Ok(()));
  assert!(matches!(reserved, Err(Error::ConstraintViolation(_))));
  assert!(units.scope_with_reserved(&mut ctx, 15, |_, _| Ok(())).is_ok());
}
