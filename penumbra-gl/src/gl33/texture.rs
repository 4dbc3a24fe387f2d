//! OpenGL texture implementation.

use crate::gl33::enums::{
  cube_face_to_gl, image_target_to_gl, mag_filter_to_gl, min_filter_to_gl, texture_format_to_gl,
  texture_target_to_gl, wrap_to_gl,
};
use crate::gl33::{check_errors, GL33};
use gl::types::*;
use log::trace;
use penumbra::backend::texture::Texture;
use penumbra::error::Error;
use penumbra::texture::{
  Area, CubeFace, ImageTarget, TextureDescription, TextureFormat, TextureTarget,
};
use std::os::raw::c_void;
use std::ptr;

const CUBE_FACES: [CubeFace; 6] = [
  CubeFace::PositiveX,
  CubeFace::NegativeX,
  CubeFace::PositiveY,
  CubeFace::NegativeY,
  CubeFace::PositiveZ,
  CubeFace::NegativeZ,
];

unsafe impl<S> Texture for GL33<S> {
  unsafe fn new_texture(&mut self, unit: u32, desc: &TextureDescription) -> Result<u32, Error> {
    let mut handle: GLuint = 0;
    gl::GenTextures(1, &mut handle);

    let target = texture_target_to_gl(desc.target);
    self.state.bind_texture(unit, target, handle);

    set_texture_levels(target);
    apply_sampling(target, desc);

    let (internal, format, ty) = texture_format_to_gl(desc.format);
    let images = match desc.target {
      TextureTarget::Texture2D => vec![gl::TEXTURE_2D],
      TextureTarget::CubeMap => CUBE_FACES.iter().map(|&f| cube_face_to_gl(f)).collect(),
    };

    for image in images {
      gl::TexImage2D(
        image,
        0,
        internal as GLint,
        desc.width as GLsizei,
        desc.height as GLsizei,
        0,
        format,
        ty,
        ptr::null(),
      );
    }

    if let Err(e) = check_errors("allocate texture") {
      gl::DeleteTextures(1, &handle);
      self.state.forget_texture(handle);
      return Err(e);
    }

    trace!(
      "new texture {} on unit {} ({}×{}, {:?})",
      handle,
      unit,
      desc.width,
      desc.height,
      desc.format
    );

    Ok(handle)
  }

  unsafe fn delete_texture(&mut self, texture: u32) -> Result<(), Error> {
    gl::DeleteTextures(1, &texture);
    self.state.forget_texture(texture);

    Ok(())
  }

  unsafe fn bind_texture(
    &mut self,
    unit: u32,
    target: TextureTarget,
    texture: u32,
  ) -> Result<(), Error> {
    self
      .state
      .bind_texture(unit, texture_target_to_gl(target), texture);

    Ok(())
  }

  unsafe fn write_texture(
    &mut self,
    unit: u32,
    target: ImageTarget,
    format: TextureFormat,
    area: &Area,
    data: &[u8],
  ) -> Result<(), Error> {
    self.state.set_texture_unit(unit);

    let (_, pixel_format, ty) = texture_format_to_gl(format);

    // rows are tightly packed
    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
    gl::TexSubImage2D(
      image_target_to_gl(target),
      0,
      area.x as GLint,
      area.y as GLint,
      area.width as GLsizei,
      area.height as GLsizei,
      pixel_format,
      ty,
      data.as_ptr() as *const c_void,
    );

    check_errors("write texture")
  }

  unsafe fn read_texture(
    &mut self,
    unit: u32,
    target: ImageTarget,
    format: TextureFormat,
    out: &mut [u8],
  ) -> Result<(), Error> {
    self.state.set_texture_unit(unit);

    let (_, pixel_format, ty) = texture_format_to_gl(format);

    gl::PixelStorei(gl::PACK_ALIGNMENT, 1);
    gl::GetTexImage(
      image_target_to_gl(target),
      0,
      pixel_format,
      ty,
      out.as_mut_ptr() as *mut c_void,
    );

    check_errors("read texture")
  }
}

// Textures have a single level; mipmapping filters then sample that level.
unsafe fn set_texture_levels(target: GLenum) {
  gl::TexParameteri(target, gl::TEXTURE_BASE_LEVEL, 0);
  gl::TexParameteri(target, gl::TEXTURE_MAX_LEVEL, 0);
}

unsafe fn apply_sampling(target: GLenum, desc: &TextureDescription) {
  gl::TexParameteri(target, gl::TEXTURE_WRAP_R, wrap_to_gl(desc.wrap_r) as GLint);
  gl::TexParameteri(target, gl::TEXTURE_WRAP_S, wrap_to_gl(desc.wrap_s) as GLint);
  gl::TexParameteri(target, gl::TEXTURE_WRAP_T, wrap_to_gl(desc.wrap_t) as GLint);
  gl::TexParameteri(
    target,
    gl::TEXTURE_MIN_FILTER,
    min_filter_to_gl(desc.min_filter) as GLint,
  );
  gl::TexParameteri(
    target,
    gl::TEXTURE_MAG_FILTER,
    mag_filter_to_gl(desc.mag_filter) as GLint,
  );
}
