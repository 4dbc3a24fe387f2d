use crate::FakeBackend;
use log::trace;
use penumbra::backend::texture::Texture;
use penumbra::error::Error;
use penumbra::texture::{
  Area, CubeFace, ImageTarget, TextureDescription, TextureFormat, TextureTarget,
};

#[derive(Debug)]
pub(crate) struct FakeTexture {
  pub(crate) desc: TextureDescription,
  // one image for 2D textures, one per face for cube maps
  images: Vec<Vec<u8>>,
}

impl FakeTexture {
  fn new(desc: TextureDescription) -> Self {
    let bytes = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel();
    let count = match desc.target {
      TextureTarget::Texture2D => 1,
      TextureTarget::CubeMap => CubeFace::ALL.len(),
    };

    FakeTexture {
      desc,
      images: vec![vec![0; bytes]; count],
    }
  }

  fn image_index(&self, image: ImageTarget) -> Option<usize> {
    match (self.desc.target, image) {
      (TextureTarget::Texture2D, ImageTarget::Texture2D) => Some(0),
      (TextureTarget::CubeMap, ImageTarget::Cube(face)) => {
        CubeFace::ALL.iter().position(|&f| f == face)
      }
      _ => None,
    }
  }

  pub(crate) fn image(&self, image: ImageTarget) -> Option<&[u8]> {
    self.image_index(image).map(|i| self.images[i].as_slice())
  }
}

impl FakeBackend {
  fn check_texture_unit(&self, unit: u32) -> Result<(), Error> {
    let units = self.limits.texture_units().max(0) as u32;

    if unit < units {
      Ok(())
    } else {
      Err(Error::driver(format!("texture unit {} out of {} units", unit, units)))
    }
  }

  // Texture bound to a unit, with the image and format checked.
  fn bound_image(
    &self,
    unit: u32,
    image: ImageTarget,
    format: TextureFormat,
  ) -> Result<(u32, usize), Error> {
    self.check_texture_unit(unit)?;

    let id = self.texture_unit(unit);
    let store = self.store.borrow();
    let texture = store
      .textures
      .get(&id)
      .ok_or_else(|| Error::driver(format!("no texture bound to unit {}", unit)))?;

    if texture.desc.format != format {
      return Err(Error::driver(format!(
        "texture {} has format {:?}, not {:?}",
        id, texture.desc.format, format
      )));
    }

    let index = texture
      .image_index(image)
      .ok_or_else(|| Error::driver(format!("texture {} has no {:?} image", id, image)))?;

    Ok((id, index))
  }
}

unsafe impl Texture for FakeBackend {
  unsafe fn new_texture(&mut self, unit: u32, desc: &TextureDescription) -> Result<u32, Error> {
    self.check_texture_unit(unit)?;

    let mut store = self.store.borrow_mut();
    let id = store.gen_name();
    store.textures.insert(id, FakeTexture::new(*desc));
    self.state.texture_units.insert(unit, (desc.target, id));

    trace!("fake: new {:?} texture {} on unit {}", desc.target, id, unit);
    Ok(id)
  }

  unsafe fn delete_texture(&mut self, texture: u32) -> Result<(), Error> {
    self
      .store
      .borrow_mut()
      .textures
      .remove(&texture)
      .ok_or_else(|| Self::unknown("texture", texture))?;

    self.state.texture_units.retain(|_, &mut (_, id)| id != texture);
    Ok(())
  }

  unsafe fn bind_texture(
    &mut self,
    unit: u32,
    target: TextureTarget,
    texture: u32,
  ) -> Result<(), Error> {
    self.check_texture_unit(unit)?;

    if texture == 0 {
      self.state.texture_units.remove(&unit);
      return Ok(());
    }

    match self.store.borrow().textures.get(&texture) {
      Some(fake) if fake.desc.target == target => (),
      Some(fake) => {
        return Err(Error::driver(format!(
          "texture {} is a {:?}, not a {:?}",
          texture, fake.desc.target, target
        )));
      }
      None => return Err(Self::unknown("texture", texture)),
    }

    self.state.texture_units.insert(unit, (target, texture));
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
    let (id, index) = self.bound_image(unit, target, format)?;
    let mut store = self.store.borrow_mut();
    let texture = store
      .textures
      .get_mut(&id)
      .ok_or_else(|| Self::unknown("texture", id))?;

    let bpp = format.bytes_per_pixel();
    let full = Area::new(0, 0, texture.desc.width, texture.desc.height);

    if !full.contains(area) || data.len() != area.pixels() * bpp {
      return Err(Error::driver(format!(
        "invalid update of texture {}: {:?} with {} bytes",
        id,
        area,
        data.len()
      )));
    }

    let row_len = area.width as usize * bpp;
    let image = &mut texture.images[index];

    for (row, src) in data.chunks_exact(row_len.max(1)).enumerate() {
      let start = ((area.y as usize + row) * full.width as usize + area.x as usize) * bpp;
      image[start..start + row_len].copy_from_slice(src);
    }

    Ok(())
  }

  unsafe fn read_texture(
    &mut self,
    unit: u32,
    target: ImageTarget,
    format: TextureFormat,
    out: &mut [u8],
  ) -> Result<(), Error> {
    let (id, index) = self.bound_image(unit, target, format)?;
    let store = self.store.borrow();
    let image = store
      .textures
      .get(&id)
      .map(|t| &t.images[index])
      .ok_or_else(|| Self::unknown("texture", id))?;

    if out.len() != image.len() {
      return Err(Error::driver(format!(
        "texture {} has {} bytes, not {}",
        id,
        image.len(),
        out.len()
      )));
    }

    out.copy_from_slice(image);
    Ok(())
  }
}
