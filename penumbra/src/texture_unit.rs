//! Scoped texture unit allocation.
//!
//! A [`TextureUnitAllocator`] hands out the texture units of a context in order, within a stack of
//! nested scopes. A scope starts with every unit of its parent already taken. When it ends, the
//! units it took are free again and the textures its parent had bound are bound back.
//!
//! ```ignore
//! let mut units = ctx.texture_unit_allocator(8)?;
//!
//! units.scope(&mut ctx, |units, ctx| {
//!   let albedo = units.bind_2d(ctx, &albedo)?;
//!   let shadows = units.bind_2d(ctx, &shadows)?;
//!   // draw with albedo and shadows
//!   Ok(())
//! })?;
//! ```

use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::texture::{
  BoundTexture, MagFilter, MinFilter, Texture2D, TextureCube, TextureFormat, TextureUnit,
  TextureWrap,
};
use log::trace;

#[derive(Clone, Debug)]
struct Scope {
  bindings: Vec<Option<BoundTexture>>,
  next: usize,
}

/// Allocator of texture units over a stack of scopes.
#[derive(Debug)]
pub struct TextureUnitAllocator {
  units: Vec<TextureUnit>,
  max_depth: usize,
  root: Scope,
  scopes: Vec<Scope>,
}

impl TextureUnitAllocator {
  /// Allocator over `units`, allowing at most `max_depth` scopes including the root one.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if `max_depth` is `0`.
  pub fn new(max_depth: usize, units: Vec<TextureUnit>) -> Result<Self, Error> {
    if max_depth < 1 {
      return Err(Error::constraint(
        "texture unit allocators need a stack depth of at least 1",
      ));
    }

    let root = Scope {
      bindings: vec![None; units.len()],
      next: 0,
    };

    Ok(TextureUnitAllocator {
      units,
      max_depth,
      root,
      scopes: Vec::new(),
    })
  }

  /// Number of scopes on the stack, the root one included.
  pub fn depth(&self) -> usize {
    self.scopes.len() + 1
  }

  /// Units taken in the current scope, its parents' included.
  pub fn allocated(&self) -> usize {
    self.current().next
  }

  /// Units still free in the current scope.
  pub fn available(&self) -> usize {
    self.units.len() - self.allocated()
  }

  fn current(&self) -> &Scope {
    self.scopes.last().unwrap_or(&self.root)
  }

  fn current_mut(&mut self) -> &mut Scope {
    self.scopes.last_mut().unwrap_or(&mut self.root)
  }

  /// Run `f` in a new scope.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if the stack is already `max_depth` scopes deep.
  pub fn scope<B, F, T>(&mut self, ctx: &mut Context<B>, f: F) -> Result<T, Error>
  where
    B: Backend,
    F: FnOnce(&mut Self, &mut Context<B>) -> Result<T, Error>,
  {
    self.scope_with_reserved(ctx, 0, f)
  }

  /// Run `f` in a new scope, failing upfront if fewer than `reserved` units are free.
  pub fn scope_with_reserved<B, F, T>(
    &mut self,
    ctx: &mut Context<B>,
    reserved: usize,
    f: F,
  ) -> Result<T, Error>
  where
    B: Backend,
    F: FnOnce(&mut Self, &mut Context<B>) -> Result<T, Error>,
  {
    self.check_available(reserved)?;

    if self.depth() >= self.max_depth {
      return Err(Error::constraint(format!(
        "texture unit scope limit reached: {}",
        self.max_depth
      )));
    }

    let scope = self.current().clone();
    self.scopes.push(scope);
    trace!("enter texture unit scope {}", self.depth());

    let result = f(self, ctx);
    let restored = self.leave(ctx);

    let value = result?;
    restored.map(|_| value)
  }

  fn leave<B>(&mut self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    trace!("leave texture unit scope {}", self.depth());
    self.scopes.pop();

    let units = &self.units;
    let parent = self.scopes.last_mut().unwrap_or(&mut self.root);
    let mut result = Ok(());

    for (unit, binding) in units.iter().zip(parent.bindings.iter_mut()) {
      if binding
        .as_ref()
        .map_or(false, |texture| texture.handle().is_deleted())
      {
        *binding = None;
      }

      let current = ctx.texture_unit_current(unit).map(BoundTexture::handle);
      if current == binding.as_ref().map(BoundTexture::handle) {
        continue;
      }

      let rebound = match binding {
        Some(texture) => ctx.texture_unit_bind(unit, texture.clone()),
        None => ctx.texture_unit_unbind(unit),
      };

      if result.is_ok() {
        result = rebound;
      }
    }

    result
  }

  fn check_available(&self, required: usize) -> Result<(), Error> {
    let required = self.allocated().saturating_add(required);

    if required > self.units.len() {
      Err(Error::constraint(format!(
        "out of texture units: {} required, {} available",
        required,
        self.units.len()
      )))
    } else {
      Ok(())
    }
  }

  fn next_unit(&self) -> Result<TextureUnit, Error> {
    self.check_available(1)?;
    Ok(self.units[self.allocated()])
  }

  fn taken(&mut self, texture: BoundTexture) {
    let scope = self.current_mut();
    scope.bindings[scope.next] = Some(texture);
    scope.next += 1;
  }

  /// Bind a 2D texture to the next free unit.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if every unit is taken, and with whatever binding
  /// the texture fails with.
  pub fn bind_2d<B>(
    &mut self,
    ctx: &mut Context<B>,
    texture: &Texture2D,
  ) -> Result<TextureUnit, Error>
  where
    B: Backend,
  {
    self.bind(ctx, BoundTexture::Texture2D(texture.clone()))
  }

  /// Bind a cube map to the next free unit.
  pub fn bind_cube<B>(
    &mut self,
    ctx: &mut Context<B>,
    texture: &TextureCube,
  ) -> Result<TextureUnit, Error>
  where
    B: Backend,
  {
    self.bind(ctx, BoundTexture::Cube(texture.clone()))
  }

  fn bind<B>(&mut self, ctx: &mut Context<B>, texture: BoundTexture) -> Result<TextureUnit, Error>
  where
    B: Backend,
  {
    let unit = self.next_unit()?;
    ctx.texture_unit_bind(&unit, texture.clone())?;
    trace!("unit {} taken by texture {}", unit.index(), texture.handle().id());
    self.taken(texture);

    Ok(unit)
  }

  /// Allocate a 2D texture on the next free unit.
  #[allow(clippy::too_many_arguments)]
  pub fn allocate_2d<B>(
    &mut self,
    ctx: &mut Context<B>,
    width: u32,
    height: u32,
    format: TextureFormat,
    wrap_s: TextureWrap,
    wrap_t: TextureWrap,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) -> Result<(TextureUnit, Texture2D), Error>
  where
    B: Backend,
  {
    let unit = self.next_unit()?;
    let texture = ctx.texture_2d_allocate(
      &unit, width, height, format, wrap_s, wrap_t, min_filter, mag_filter,
    )?;
    self.taken(BoundTexture::Texture2D(texture.clone()));

    Ok((unit, texture))
  }

  /// Allocate a cube map on the next free unit.
  #[allow(clippy::too_many_arguments)]
  pub fn allocate_cube<B>(
    &mut self,
    ctx: &mut Context<B>,
    size: u32,
    format: TextureFormat,
    wrap_r: TextureWrap,
    wrap_s: TextureWrap,
    wrap_t: TextureWrap,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) -> Result<(TextureUnit, TextureCube), Error>
  where
    B: Backend,
  {
    let unit = self.next_unit()?;
    let texture = ctx.texture_cube_allocate(
      &unit, size, format, wrap_r, wrap_s, wrap_t, min_filter, mag_filter,
    )?;
    self.taken(BoundTexture::Cube(texture.clone()));

    Ok((unit, texture))
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Allocator over every texture unit of the context.
  pub fn texture_unit_allocator(&self, max_depth: usize) -> Result<TextureUnitAllocator, Error> {
    TextureUnitAllocator::new(max_depth, self.texture_units())
  }
}
