//! Texture backend interface.

use crate::error::Error;
use crate::texture::{Area, ImageTarget, TextureDescription, TextureFormat, TextureTarget};

/// Texture backend.
pub unsafe trait Texture {
  /// Allocate storage for a texture on a texture unit.
  ///
  /// The texture is left bound to `unit`.
  unsafe fn new_texture(&mut self, unit: u32, desc: &TextureDescription) -> Result<u32, Error>;

  /// Delete a texture.
  unsafe fn delete_texture(&mut self, texture: u32) -> Result<(), Error>;

  /// Bind a texture to a unit; `0` unbinds.
  unsafe fn bind_texture(
    &mut self,
    unit: u32,
    target: TextureTarget,
    texture: u32,
  ) -> Result<(), Error>;

  /// Upload texels to an area of an image of the texture bound to `unit`.
  unsafe fn write_texture(
    &mut self,
    unit: u32,
    target: ImageTarget,
    format: TextureFormat,
    area: &Area,
    data: &[u8],
  ) -> Result<(), Error>;

  /// Read back a whole image of the texture bound to `unit`.
  unsafe fn read_texture(
    &mut self,
    unit: u32,
    target: ImageTarget,
    format: TextureFormat,
    out: &mut [u8],
  ) -> Result<(), Error>;
}
