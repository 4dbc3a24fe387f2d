//! Textures.
//!
//! Textures are allocated on a [`TextureUnit`] and stay bound to it afterwards. Texture units are
//! obtained from the context with [`Context::texture_units`]; their number is the clamped
//! implementation limit.
//!
//! A texture attached to the framebuffer bound for drawing cannot be bound to a unit, and the
//! other way around: that would let a draw sample the image it renders to.

use crate::backend::texture::Texture as _;
use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::handle::{impl_Resource, Handle, Resource, ResourceKind};
use crate::scalar::ScalarType;
use log::{debug, trace};

/// Internal format of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureFormat {
  /// 8-bit normalized red.
  R8,
  /// 8-bit signed integral red.
  R8I,
  /// 8-bit unsigned integral red.
  R8UI,
  /// 16-bit floating point red.
  R16F,
  /// 16-bit signed integral red.
  R16I,
  /// 16-bit unsigned integral red.
  R16UI,
  /// 32-bit floating point red.
  R32F,
  /// 32-bit signed integral red.
  R32I,
  /// 32-bit unsigned integral red.
  R32UI,
  /// 8-bit normalized red, green.
  RG8,
  /// 8-bit signed integral red, green.
  RG8I,
  /// 8-bit unsigned integral red, green.
  RG8UI,
  /// 16-bit floating point red, green.
  RG16F,
  /// 16-bit signed integral red, green.
  RG16I,
  /// 16-bit unsigned integral red, green.
  RG16UI,
  /// 32-bit floating point red, green.
  RG32F,
  /// 32-bit signed integral red, green.
  RG32I,
  /// 32-bit unsigned integral red, green.
  RG32UI,
  /// 8-bit normalized red, green, blue.
  RGB8,
  /// 8-bit signed integral red, green, blue.
  RGB8I,
  /// 8-bit unsigned integral red, green, blue.
  RGB8UI,
  /// 16-bit floating point red, green, blue.
  RGB16F,
  /// 16-bit signed integral red, green, blue.
  RGB16I,
  /// 16-bit unsigned integral red, green, blue.
  RGB16UI,
  /// 32-bit floating point red, green, blue.
  RGB32F,
  /// 32-bit signed integral red, green, blue.
  RGB32I,
  /// 32-bit unsigned integral red, green, blue.
  RGB32UI,
  /// 8-bit normalized red, green, blue, alpha.
  RGBA8,
  /// 8-bit signed integral red, green, blue, alpha.
  RGBA8I,
  /// 8-bit unsigned integral red, green, blue, alpha.
  RGBA8UI,
  /// 16-bit floating point red, green, blue, alpha.
  RGBA16F,
  /// 16-bit signed integral red, green, blue, alpha.
  RGBA16I,
  /// 16-bit unsigned integral red, green, blue, alpha.
  RGBA16UI,
  /// 32-bit floating point red, green, blue, alpha.
  RGBA32F,
  /// 32-bit signed integral red, green, blue, alpha.
  RGBA32I,
  /// 32-bit unsigned integral red, green, blue, alpha.
  RGBA32UI,
  /// 16-bit depth.
  Depth16,
  /// 24-bit depth.
  Depth24,
  /// 32-bit floating point depth.
  Depth32F,
  /// 24-bit depth, 8-bit stencil.
  Depth24Stencil8,
}

impl TextureFormat {
  /// Number of components and type of each component of the pixel data.
  ///
  /// Depth formats are uploaded as a single component; the depth-stencil format as one packed
  /// unsigned int.
  pub fn pixel_layout(self) -> (usize, ScalarType) {
    use TextureFormat::*;

    let components = match self {
      R8 | R8I | R8UI | R16F | R16I | R16UI | R32F | R32I | R32UI => 1,
      RG8 | RG8I | RG8UI | RG16F | RG16I | RG16UI | RG32F | RG32I | RG32UI => 2,
      RGB8 | RGB8I | RGB8UI | RGB16F | RGB16I | RGB16UI | RGB32F | RGB32I | RGB32UI => 3,
      RGBA8 | RGBA8I | RGBA8UI | RGBA16F | RGBA16I | RGBA16UI | RGBA32F | RGBA32I | RGBA32UI => 4,
      Depth16 | Depth24 | Depth32F | Depth24Stencil8 => 1,
    };

    let scalar = match self {
      R8 | RG8 | RGB8 | RGBA8 | R8UI | RG8UI | RGB8UI | RGBA8UI => ScalarType::UnsignedByte,
      R8I | RG8I | RGB8I | RGBA8I => ScalarType::Byte,
      R16F | RG16F | RGB16F | RGBA16F => ScalarType::HalfFloat,
      R16I | RG16I | RGB16I | RGBA16I => ScalarType::Short,
      R16UI | RG16UI | RGB16UI | RGBA16UI | Depth16 => ScalarType::UnsignedShort,
      R32F | RG32F | RGB32F | RGBA32F | Depth32F => ScalarType::Float,
      R32I | RG32I | RGB32I | RGBA32I => ScalarType::Int,
      R32UI | RG32UI | RGB32UI | RGBA32UI | Depth24 | Depth24Stencil8 => ScalarType::UnsignedInt,
    };

    (components, scalar)
  }

  /// Size of one pixel, in bytes.
  pub fn bytes_per_pixel(self) -> usize {
    let (components, scalar) = self.pixel_layout();
    components * scalar.size_bytes()
  }

  /// Whether the format can be attached as a color attachment.
  ///
  /// Three-component float and integer formats are not required to be renderable.
  pub fn is_color_renderable(self) -> bool {
    use TextureFormat::*;

    !matches!(
      self,
      RGB8I
        | RGB8UI
        | RGB16F
        | RGB16I
        | RGB16UI
        | RGB32F
        | RGB32I
        | RGB32UI
        | Depth16
        | Depth24
        | Depth32F
        | Depth24Stencil8
    )
  }

  /// Whether the format can be attached as a depth attachment.
  pub fn is_depth_renderable(self) -> bool {
    matches!(
      self,
      TextureFormat::Depth16 | TextureFormat::Depth24 | TextureFormat::Depth32F
    )
  }

  /// Whether the format can be attached as a depth-stencil attachment.
  pub fn is_depth_stencil_renderable(self) -> bool {
    self == TextureFormat::Depth24Stencil8
  }
}

/// Wrapping mode of texture coordinates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureWrap {
  /// Clamp to the edge texels.
  ClampToEdge,
  /// Repeat, mirroring every other repetition.
  MirroredRepeat,
  /// Repeat.
  Repeat,
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation of the nearest texels.
  Linear,
  /// Nearest texel of the nearest mipmap.
  NearestMipmapNearest,
  /// Nearest texel, interpolated between mipmaps.
  NearestMipmapLinear,
  /// Linear interpolation in the nearest mipmap.
  LinearMipmapNearest,
  /// Linear interpolation, interpolated between mipmaps.
  LinearMipmapLinear,
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation of the nearest texels.
  Linear,
}

/// Kind of texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureTarget {
  /// 2D texture.
  Texture2D,
  /// Cube map.
  CubeMap,
}

/// Face of a cube map.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CubeFace {
  /// +X.
  PositiveX,
  /// -X.
  NegativeX,
  /// +Y.
  PositiveY,
  /// -Y.
  NegativeY,
  /// +Z.
  PositiveZ,
  /// -Z.
  NegativeZ,
}

impl CubeFace {
  /// Every face.
  pub const ALL: [CubeFace; 6] = [
    CubeFace::PositiveX,
    CubeFace::NegativeX,
    CubeFace::PositiveY,
    CubeFace::NegativeY,
    CubeFace::PositiveZ,
    CubeFace::NegativeZ,
  ];
}

/// Image of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ImageTarget {
  /// The image of a 2D texture.
  Texture2D,
  /// A face of a cube map.
  Cube(CubeFace),
}

/// A rectangular area, in pixels.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Area {
  /// Left.
  pub x: u32,
  /// Bottom.
  pub y: u32,
  /// Width.
  pub width: u32,
  /// Height.
  pub height: u32,
}

impl Area {
  /// Create an area.
  pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
    Area {
      x,
      y,
      width,
      height,
    }
  }

  /// Whether `other` lies entirely inside this area.
  pub fn contains(&self, other: &Area) -> bool {
    let (x_end, y_end) = (
      u64::from(self.x) + u64::from(self.width),
      u64::from(self.y) + u64::from(self.height),
    );

    other.x >= self.x
      && other.y >= self.y
      && u64::from(other.x) + u64::from(other.width) <= x_end
      && u64::from(other.y) + u64::from(other.height) <= y_end
  }

  /// Number of pixels.
  pub fn pixels(&self) -> usize {
    self.width as usize * self.height as usize
  }
}

/// Everything a backend needs to allocate a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TextureDescription {
  /// 2D texture or cube map.
  pub target: TextureTarget,
  /// Width, in pixels.
  pub width: u32,
  /// Height, in pixels.
  pub height: u32,
  /// Internal format.
  pub format: TextureFormat,
  /// Wrapping of the R coordinate (cube maps only).
  pub wrap_r: TextureWrap,
  /// Wrapping of the S coordinate.
  pub wrap_s: TextureWrap,
  /// Wrapping of the T coordinate.
  pub wrap_t: TextureWrap,
  /// Minification filter.
  pub min_filter: MinFilter,
  /// Magnification filter.
  pub mag_filter: MagFilter,
}

/// A texture unit.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TextureUnit {
  index: u32,
}

impl TextureUnit {
  pub(crate) fn new(index: u32) -> Self {
    TextureUnit { index }
  }

  /// Index of the unit.
  pub fn index(&self) -> u32 {
    self.index
  }
}

macro_rules! texture_type {
  ($(#[$doc:meta])* $t:ident) => {
    $(#[$doc])*
    #[derive(Clone, Debug)]
    pub struct $t {
      handle: Handle,
      desc: TextureDescription,
    }

    impl_Resource!($t);

    impl PartialEq for $t {
      fn eq(&self, rhs: &Self) -> bool {
        self.handle == rhs.handle
      }
    }

    impl Eq for $t {}

    impl $t {
      /// Description the texture was allocated with.
      pub fn description(&self) -> &TextureDescription {
        &self.desc
      }

      /// Width, in pixels.
      pub fn width(&self) -> u32 {
        self.desc.width
      }

      /// Height, in pixels.
      pub fn height(&self) -> u32 {
        self.desc.height
      }

      /// Internal format.
      pub fn format(&self) -> TextureFormat {
        self.desc.format
      }

      /// The whole image area.
      pub fn area(&self) -> Area {
        Area::new(0, 0, self.desc.width, self.desc.height)
      }
    }
  };
}

texture_type!(
  /// A 2D texture.
  Texture2D
);

texture_type!(
  /// A cube map.
  TextureCube
);

/// A texture bound to a unit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BoundTexture {
  /// A 2D texture.
  Texture2D(Texture2D),
  /// A cube map.
  Cube(TextureCube),
}

impl BoundTexture {
  /// Handle of the texture.
  pub fn handle(&self) -> &Handle {
    match *self {
      BoundTexture::Texture2D(ref t) => t.handle(),
      BoundTexture::Cube(ref t) => t.handle(),
    }
  }

  /// Kind of texture.
  pub fn target(&self) -> TextureTarget {
    match *self {
      BoundTexture::Texture2D(_) => TextureTarget::Texture2D,
      BoundTexture::Cube(_) => TextureTarget::CubeMap,
    }
  }

  fn description(&self) -> &TextureDescription {
    match *self {
      BoundTexture::Texture2D(ref t) => t.description(),
      BoundTexture::Cube(ref t) => t.description(),
    }
  }
}

/// Texels to upload to an area of a texture image.
#[derive(Clone, Debug)]
pub struct TextureUpdate {
  texture: BoundTexture,
  image: ImageTarget,
  area: Area,
  data: Vec<u8>,
}

impl TextureUpdate {
  /// Prepare an update of `area` of a 2D texture, initially zeroed.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if `area` does not lie inside the texture.
  pub fn new_2d(texture: &Texture2D, area: Area) -> Result<Self, Error> {
    Self::new(BoundTexture::Texture2D(texture.clone()), ImageTarget::Texture2D, area)
  }

  /// Prepare an update of `area` of a face of a cube map, initially zeroed.
  pub fn new_cube(texture: &TextureCube, face: CubeFace, area: Area) -> Result<Self, Error> {
    Self::new(BoundTexture::Cube(texture.clone()), ImageTarget::Cube(face), area)
  }

  fn new(texture: BoundTexture, image: ImageTarget, area: Area) -> Result<Self, Error> {
    texture.handle().check_not_deleted()?;

    let desc = texture.description();
    let whole = Area::new(0, 0, desc.width, desc.height);

    if !whole.contains(&area) {
      return Err(Error::constraint(format!(
        "area {:?} is not included in the texture area {:?}",
        area, whole
      )));
    }

    let data = vec![0; area.pixels() * desc.format.bytes_per_pixel()];

    Ok(TextureUpdate {
      texture,
      image,
      area,
      data,
    })
  }

  /// Updated area.
  pub fn area(&self) -> &Area {
    &self.area
  }

  /// Texels, row by row, bottom row first.
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Texels, row by row, bottom row first.
  pub fn data_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }

  /// Write the texel at `(x, y)`, relative to the updated area.
  pub fn set_texel(&mut self, x: u32, y: u32, texel: &[u8]) -> Result<(), Error> {
    let bpp = self.texture.description().format.bytes_per_pixel();

    if texel.len() != bpp {
      return Err(Error::constraint(format!(
        "texel of {} bytes, but the format has {} bytes per pixel",
        texel.len(),
        bpp
      )));
    }

    if x >= self.area.width {
      return Err(Error::range(x as usize, self.area.width as usize));
    }

    if y >= self.area.height {
      return Err(Error::range(y as usize, self.area.height as usize));
    }

    let start = (y as usize * self.area.width as usize + x as usize) * bpp;
    self.data[start..start + bpp].copy_from_slice(texel);

    Ok(())
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Every texture unit available.
  pub fn texture_units(&self) -> Vec<TextureUnit> {
    (0..self.capabilities().texture_units())
      .map(|index| TextureUnit { index })
      .collect()
  }

  /// Texture bound to a unit, if any.
  pub fn texture_unit_current(&self, unit: &TextureUnit) -> Option<&BoundTexture> {
    self
      .state
      .texture_units
      .get(unit.index as usize)
      .and_then(Option::as_ref)
  }

  /// Allocate a 2D texture on a unit.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::InvalidSize`] if a dimension is less than 2 or greater than the maximum
  /// texture size.
  #[allow(clippy::too_many_arguments)]
  pub fn texture_2d_allocate(
    &mut self,
    unit: &TextureUnit,
    width: u32,
    height: u32,
    format: TextureFormat,
    wrap_s: TextureWrap,
    wrap_t: TextureWrap,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) -> Result<Texture2D, Error> {
    let desc = TextureDescription {
      target: TextureTarget::Texture2D,
      width,
      height,
      format,
      wrap_r: TextureWrap::ClampToEdge,
      wrap_s,
      wrap_t,
      min_filter,
      mag_filter,
    };

    let handle = self.texture_allocate(unit, &desc)?;
    let texture = Texture2D { handle, desc };
    self.texture_bound(unit, BoundTexture::Texture2D(texture.clone()));

    Ok(texture)
  }

  /// Allocate a cube map of `size`×`size` faces on a unit.
  #[allow(clippy::too_many_arguments)]
  pub fn texture_cube_allocate(
    &mut self,
    unit: &TextureUnit,
    size: u32,
    format: TextureFormat,
    wrap_r: TextureWrap,
    wrap_s: TextureWrap,
    wrap_t: TextureWrap,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) -> Result<TextureCube, Error> {
    let desc = TextureDescription {
      target: TextureTarget::CubeMap,
      width: size,
      height: size,
      format,
      wrap_r,
      wrap_s,
      wrap_t,
      min_filter,
      mag_filter,
    };

    let handle = self.texture_allocate(unit, &desc)?;
    let texture = TextureCube { handle, desc };
    self.texture_bound(unit, BoundTexture::Cube(texture.clone()));

    Ok(texture)
  }

  fn texture_allocate(
    &mut self,
    unit: &TextureUnit,
    desc: &TextureDescription,
  ) -> Result<Handle, Error> {
    self.check_current()?;
    self.check_unit(unit)?;

    let max = self.capabilities().max_texture_size();

    for &(what, size) in &[("width", desc.width), ("height", desc.height)] {
      if size < 2 || size > max {
        return Err(Error::invalid_size(format!(
          "texture {} {} is not in [2, {}]",
          what, size, max
        )));
      }
    }

    let id = unsafe { self.backend.new_texture(unit.index, desc)? };
    debug!(
      "allocated {:?} texture {} {}×{} {:?} on unit {}",
      desc.target, id, desc.width, desc.height, desc.format, unit.index
    );

    Ok(Handle::new(ResourceKind::Texture, id))
  }

  fn texture_bound(&mut self, unit: &TextureUnit, texture: BoundTexture) {
    if let Some(slot) = self.state.texture_units.get_mut(unit.index as usize) {
      *slot = Some(texture);
    }
  }

  fn check_unit(&self, unit: &TextureUnit) -> Result<(), Error> {
    let units = self.state.texture_units.len();

    if (unit.index as usize) < units {
      Ok(())
    } else {
      Err(Error::range(unit.index as usize, units))
    }
  }

  /// Bind a 2D texture to a unit.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if the texture is attached to the framebuffer bound
  /// for drawing.
  pub fn texture_unit_bind_2d(
    &mut self,
    unit: &TextureUnit,
    texture: &Texture2D,
  ) -> Result<(), Error> {
    self.texture_unit_bind(unit, BoundTexture::Texture2D(texture.clone()))
  }

  /// Bind a cube map to a unit.
  pub fn texture_unit_bind_cube(
    &mut self,
    unit: &TextureUnit,
    texture: &TextureCube,
  ) -> Result<(), Error> {
    self.texture_unit_bind(unit, BoundTexture::Cube(texture.clone()))
  }

  pub(crate) fn texture_unit_bind(
    &mut self,
    unit: &TextureUnit,
    texture: BoundTexture,
  ) -> Result<(), Error> {
    self.check_current()?;
    self.check_unit(unit)?;
    texture.handle().check_not_deleted()?;

    if self.framebuffer_draw_attaches(texture.handle()) {
      return Err(Error::constraint(format!(
        "feedback loop: texture {} is attached to the draw framebuffer",
        texture.handle().id()
      )));
    }

    unsafe {
      self
        .backend
        .bind_texture(unit.index, texture.target(), texture.handle().id())?
    };
    trace!("bind texture {} to unit {}", texture.handle().id(), unit.index);
    self.texture_bound(unit, texture);

    Ok(())
  }

  /// Unbind whatever is bound to a unit.
  pub fn texture_unit_unbind(&mut self, unit: &TextureUnit) -> Result<(), Error> {
    self.check_current()?;
    self.check_unit(unit)?;

    if let Some(bound) = self.state.texture_units[unit.index as usize].take() {
      unsafe { self.backend.bind_texture(unit.index, bound.target(), 0)? };
      trace!("unbind unit {}", unit.index);
    }

    Ok(())
  }

  /// Whether `texture` is bound to a unit.
  pub fn texture_unit_is_bound<T>(&self, unit: &TextureUnit, texture: &T) -> Result<bool, Error>
  where
    T: Resource,
  {
    self.check_current()?;
    self.check_unit(unit)?;
    texture.handle().check_not_deleted()?;

    Ok(
      self
        .texture_unit_current(unit)
        .map_or(false, |bound| bound.handle() == texture.handle()),
    )
  }

  /// Bind a 2D texture to a unit and upload texels to it.
  pub fn texture_2d_update(
    &mut self,
    unit: &TextureUnit,
    update: &TextureUpdate,
  ) -> Result<(), Error> {
    if update.image != ImageTarget::Texture2D {
      return Err(Error::constraint("not an update of a 2D texture"));
    }

    self.texture_update(unit, update)
  }

  /// Bind a cube map to a unit and upload texels to one of its faces.
  pub fn texture_cube_update(
    &mut self,
    unit: &TextureUnit,
    update: &TextureUpdate,
  ) -> Result<(), Error> {
    if update.image == ImageTarget::Texture2D {
      return Err(Error::constraint("not an update of a cube map"));
    }

    self.texture_update(unit, update)
  }

  fn texture_update(&mut self, unit: &TextureUnit, update: &TextureUpdate) -> Result<(), Error> {
    self.texture_unit_bind(unit, update.texture.clone())?;

    let format = update.texture.description().format;

    unsafe {
      self
        .backend
        .write_texture(unit.index, update.image, format, &update.area, &update.data)
    }
  }

  /// Bind a 2D texture to a unit and read its image back.
  pub fn texture_2d_get_image(
    &mut self,
    unit: &TextureUnit,
    texture: &Texture2D,
  ) -> Result<Vec<u8>, Error> {
    self.texture_unit_bind_2d(unit, texture)?;
    self.texture_get_image(unit, texture.description(), ImageTarget::Texture2D)
  }

  /// Bind a cube map to a unit and read one of its faces back.
  pub fn texture_cube_get_image(
    &mut self,
    unit: &TextureUnit,
    texture: &TextureCube,
    face: CubeFace,
  ) -> Result<Vec<u8>, Error> {
    self.texture_unit_bind_cube(unit, texture)?;
    self.texture_get_image(unit, texture.description(), ImageTarget::Cube(face))
  }

  fn texture_get_image(
    &mut self,
    unit: &TextureUnit,
    desc: &TextureDescription,
    image: ImageTarget,
  ) -> Result<Vec<u8>, Error> {
    let pixels = desc.width as usize * desc.height as usize;
    let mut data = vec![0; pixels * desc.format.bytes_per_pixel()];

    unsafe {
      self
        .backend
        .read_texture(unit.index, image, desc.format, &mut data)?
    };

    Ok(data)
  }

  /// Delete a texture, unbinding it from every unit it is bound to.
  pub fn texture_delete<T>(&mut self, texture: &T) -> Result<(), Error>
  where
    T: Resource,
  {
    let handle = texture.handle();

    self.check_current()?;

    if handle.kind() != ResourceKind::Texture {
      return Err(Error::constraint(format!("{} is not a texture", handle.kind())));
    }

    handle.check_not_deleted()?;

    for index in 0..self.state.texture_units.len() {
      let bound_here = self.state.texture_units[index]
        .as_ref()
        .map_or(false, |bound| bound.handle() == handle);

      if bound_here {
        self.texture_unit_unbind(&TextureUnit {
          index: index as u32,
        })?;
      }
    }

    unsafe { self.backend.delete_texture(handle.id())? };
    debug!("delete texture {}", handle.id());

    handle.mark_deleted()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bytes_per_pixel() {
    assert_eq!(TextureFormat::R8.bytes_per_pixel(), 1);
    assert_eq!(TextureFormat::RGB8.bytes_per_pixel(), 3);
    assert_eq!(TextureFormat::RGBA16F.bytes_per_pixel(), 8);
    assert_eq!(TextureFormat::RGB32UI.bytes_per_pixel(), 12);
    assert_eq!(TextureFormat::Depth16.bytes_per_pixel(), 2);
    assert_eq!(TextureFormat::Depth24Stencil8.bytes_per_pixel(), 4);
  }

  #[test]
  fn renderability() {
    assert!(TextureFormat::RGBA8.is_color_renderable());
    assert!(!TextureFormat::RGB32F.is_color_renderable());
    assert!(!TextureFormat::Depth24.is_color_renderable());
    assert!(TextureFormat::Depth24.is_depth_renderable());
    assert!(!TextureFormat::Depth24Stencil8.is_depth_renderable());
    assert!(TextureFormat::Depth24Stencil8.is_depth_stencil_renderable());
  }

  #[test]
  fn area_inclusion() {
    let whole = Area::new(0, 0, 64, 32);

    assert!(whole.contains(&Area::new(0, 0, 64, 32)));
    assert!(whole.contains(&Area::new(10, 10, 4, 4)));
    assert!(!whole.contains(&Area::new(60, 0, 8, 8)));
    assert!(!whole.contains(&Area::new(0, 30, 1, 3)));
    assert!(!whole.contains(&Area::new(u32::MAX, 0, 2, 1)));
  }
}
