mod common;

use penumbra::context::Context;
use penumbra::error::Error;
use penumbra::handle::Resource as _;
use penumbra::texture::{
  Area, CubeFace, ImageTarget, MagFilter, MinFilter, Texture2D, TextureCube, TextureFormat,
  TextureUnit, TextureUpdate, TextureWrap,
};
use penumbra_fake::FakeBackend;

fn texture_2d(
  ctx: &mut Context<FakeBackend>,
  unit: &TextureUnit,
  width: u32,
  height: u32,
) -> Result<Texture2D, Error> {
  ctx.texture_2d_allocate(
    unit,
    width,
    height,
    TextureFormat::RGBA8,
    TextureWrap::ClampToEdge,
    TextureWrap::ClampToEdge,
    MinFilter::Linear,
    MagFilter::Linear,
  )
}

fn texture_cube(
  ctx: &mut Context<FakeBackend>,
  unit: &TextureUnit,
  size: u32,
) -> Result<TextureCube, Error> {
  ctx.texture_cube_allocate(
    unit,
    size,
    TextureFormat::RGB8,
    TextureWrap::Repeat,
    TextureWrap::Repeat,
    TextureWrap::Repeat,
    MinFilter::Nearest,
    MagFilter::Nearest,
  )
}

#[test]
fn allocation_binds_to_the_unit() {
  let mut ctx = common::context();
  let units = ctx.texture_units();
  assert_eq!(units.len(), 16);

  let texture = texture_2d(&mut ctx, &units[3], 4, 2).unwrap();

  assert_eq!((texture.width(), texture.height()), (4, 2));
  assert_eq!(texture.area(), Area::new(0, 0, 4, 2));
  assert_eq!(ctx.backend().texture_unit(3), texture.handle().id());
  assert!(ctx.texture_unit_is_bound(&units[3], &texture).unwrap());
  assert!(!ctx.texture_unit_is_bound(&units[0], &texture).unwrap());
}

#[test]
fn sizes_are_checked() {
  let mut ctx = common::context();
  let unit = ctx.texture_units()[0];
  let max = ctx.capabilities().max_texture_size();

  assert!(matches!(texture_2d(&mut ctx, &unit, 1, 2), Err(Error::InvalidSize(_))));
  assert!(matches!(texture_2d(&mut ctx, &unit, 2, 0), Err(Error::InvalidSize(_))));
  assert!(matches!(texture_2d(&mut ctx, &unit, max + 1, 2), Err(Error::InvalidSize(_))));
  assert!(matches!(texture_cube(&mut ctx, &unit, 1), Err(Error::InvalidSize(_))));
  assert_eq!(ctx.backend().object_count(), 0);

  assert!(texture_2d(&mut ctx, &unit, max, 2).is_ok());
  assert!(texture_2d(&mut ctx, &unit, 2, 2).is_ok());
}

#[test]
fn update_and_read_back() {
  let mut ctx = common::context();
  let unit = ctx.texture_units()[0];
  let texture = texture_2d(&mut ctx, &unit, 4, 2).unwrap();

  let mut update = TextureUpdate::new_2d(&texture, Area::new(1, 1, 2, 1)).unwrap();
  assert_eq!(update.data().len(), 8);

  update.set_texel(0, 0, &[1, 2, 3, 4]).unwrap();
  update.set_texel(1, 0, &[5, 6, 7, 8]).unwrap();
  assert!(matches!(update.set_texel(2, 0, &[0; 4]), Err(Error::Range { index: 2, len: 2 })));
  assert!(matches!(update.set_texel(0, 0, &[0; 3]), Err(Error::ConstraintViolation(_))));

  ctx.texture_2d_update(&unit, &update).unwrap();

  let image = ctx.texture_2d_get_image(&unit, &texture).unwrap();
  assert_eq!(image.len(), 4 * 2 * 4);
  assert!(image[..20].iter().all(|&b| b == 0));
  assert_eq!(&image[20..28], &[1, 2, 3, 4, 5, 6, 7, 8]);
  assert!(image[28..].iter().all(|&b| b == 0));

  assert!(matches!(
    TextureUpdate::new_2d(&texture, Area::new(3, 0, 2, 1)),
    Err(Error::ConstraintViolation(_))
  ));
}

#[test]
fn cube_faces_are_separate_images() {
  let mut ctx = common::context();
  let unit = ctx.texture_units()[1];
  let cube = texture_cube(&mut ctx, &unit, 2).unwrap();

  let mut update = TextureUpdate::new_cube(&cube, CubeFace::NegativeY, cube.area()).unwrap();
  update.data_mut().copy_from_slice(&[9; 12]);
  ctx.texture_cube_update(&unit, &update).unwrap();

  assert_eq!(
    ctx.texture_cube_get_image(&unit, &cube, CubeFace::NegativeY).unwrap(),
    vec![9; 12]
  );
  assert_eq!(
    ctx.texture_cube_get_image(&unit, &cube, CubeFace::PositiveX).unwrap(),
    vec![0; 12]
  );
  assert_eq!(
    ctx
      .backend()
      .texture_image(cube.handle().id(), ImageTarget::Cube(CubeFace::NegativeY)),
    Some(vec![9; 12])
  );

  // updates are checked against the kind of texture
  assert!(matches!(
    ctx.texture_2d_update(&unit, &update),
    Err(Error::ConstraintViolation(_))
  ));
}

#[test]
fn bind_and_unbind() {
  let mut ctx = common::context();
  let units = ctx.texture_units();
  let first = texture_2d(&mut ctx, &units[0], 2, 2).unwrap();
  let second = texture_2d(&mut ctx, &units[0], 2, 2).unwrap();

  assert!(!ctx.texture_unit_is_bound(&units[0], &first).unwrap());
  assert!(ctx.texture_unit_is_bound(&units[0], &second).unwrap());

  ctx.texture_unit_bind_2d(&units[0], &first).unwrap();
  assert!(ctx.texture_unit_is_bound(&units[0], &first).unwrap());
  assert_eq!(ctx.backend().texture_unit(0), first.handle().id());

  ctx.texture_unit_unbind(&units[0]).unwrap();
  assert!(ctx.texture_unit_current(&units[0]).is_none());
  assert_eq!(ctx.backend().texture_unit(0), 0);

  // unbinding an empty unit is fine
  ctx.texture_unit_unbind(&units[0]).unwrap();
}

#[test]
fn delete_unbinds_everywhere() {
  let mut ctx = common::context();
  let units = ctx.texture_units();
  let texture = texture_2d(&mut ctx, &units[0], 2, 2).unwrap();
  ctx.texture_unit_bind_2d(&units[5], &texture).unwrap();

  ctx.texture_delete(&texture).unwrap();

  assert!(texture.is_deleted());
  assert!(ctx.texture_unit_current(&units[0]).is_none());
  assert!(ctx.texture_unit_current(&units[5]).is_none());
  assert_eq!(ctx.backend().texture_unit(5), 0);
  assert_eq!(ctx.backend().object_count(), 0);

  assert!(matches!(
    ctx.texture_unit_bind_2d(&units[0], &texture),
    Err(Error::ResourceDeleted { .. })
  ));
  assert!(matches!(
    TextureUpdate::new_2d(&texture, Area::new(0, 0, 1, 1)),
    Err(Error::ResourceDeleted { .. })
  ));
  assert!(matches!(ctx.texture_delete(&texture), Err(Error::ResourceDeleted { .. })));
}

#[test]
fn only_textures_are_deleted_as_textures() {
  let mut ctx = common::context();
  let buffer = common::vertex_buffer(&mut ctx, 3);

  assert!(matches!(ctx.texture_delete(&buffer), Err(Error::ConstraintViolation(_))));
  assert!(!buffer.is_deleted());
}
