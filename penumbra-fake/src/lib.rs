//! In-memory backend for penumbra.
//!
//! [`FakeBackend`] implements every backend trait of penumbra without a GPU. Objects are plain
//! values stored in memory: buffers and texture images hold real bytes, shaders are “compiled”
//! by a tiny GLSL scanner that reflects `uniform` and vertex `in` declarations, and draws are
//! recorded instead of rasterized. Everything the backend was asked to do can be inspected
//! afterwards, which makes it suitable for tests and headless environments.
//!
//! Objects follow the sharing rules of OpenGL: buffers, shaders, programs, textures and
//! renderbuffers are shared by every backend created with [`FakeBackend::new_shared`], while array
//! objects and framebuffers, being container objects, are not.
//!
//! The fake compiler rejects any shader with a line starting with `#error` and reports a uniform or
//! attribute as active only if its name is used outside of its declaration, mimicking a driver
//! optimising unused variables out.

mod array_object;
mod buffer;
mod draw;
mod framebuffer;
mod pool;
mod query;
mod render_state;
mod shader;
mod texture;

pub use crate::draw::DrawCall;
pub use crate::pool::ContextPool;

use crate::array_object::FakeArrayObject;
use crate::buffer::FakeBuffer;
use crate::framebuffer::{FakeFramebuffer, FakeRenderbuffer};
use crate::shader::{FakeProgram, FakeShader};
use crate::texture::FakeTexture;
use penumbra::array_object::AttributeLayout;
use penumbra::buffer::UsageHint;
use penumbra::draw::ClearOptions;
use penumbra::error::Error;
use penumbra::framebuffer::{BlitRegion, FramebufferStatus, RenderbufferFormat};
use penumbra::render_state::RenderState;
use penumbra::shader::UniformValue;
use penumbra::texture::{ImageTarget, TextureTarget};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Capabilities reported by the fake driver.
///
/// Values are reported as-is, so that limits outside of the range OpenGL 3.3 requires can be
/// simulated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FakeLimits {
  max_vertex_attribs: i32,
  max_texture_size: i32,
  texture_units: i32,
  max_color_attachments: i32,
  max_draw_buffers: i32,
}

impl Default for FakeLimits {
  /// Defaults:
  ///
  /// - `max_vertex_attribs`: `16`
  /// - `max_texture_size`: `8192`
  /// - `texture_units`: `16`
  /// - `max_color_attachments`: `8`
  /// - `max_draw_buffers`: `8`
  fn default() -> Self {
    FakeLimits {
      max_vertex_attribs: 16,
      max_texture_size: 8192,
      texture_units: 16,
      max_color_attachments: 8,
      max_draw_buffers: 8,
    }
  }
}

impl FakeLimits {
  /// Reported maximum number of vertex attributes.
  #[inline]
  pub fn set_max_vertex_attribs(self, max_vertex_attribs: i32) -> Self {
    FakeLimits {
      max_vertex_attribs,
      ..self
    }
  }

  /// Reported maximum number of vertex attributes.
  #[inline]
  pub fn max_vertex_attribs(&self) -> i32 {
    self.max_vertex_attribs
  }

  /// Reported maximum texture size.
  #[inline]
  pub fn set_max_texture_size(self, max_texture_size: i32) -> Self {
    FakeLimits {
      max_texture_size,
      ..self
    }
  }

  /// Reported maximum texture size.
  #[inline]
  pub fn max_texture_size(&self) -> i32 {
    self.max_texture_size
  }

  /// Reported number of texture units.
  #[inline]
  pub fn set_texture_units(self, texture_units: i32) -> Self {
    FakeLimits {
      texture_units,
      ..self
    }
  }

  /// Reported number of texture units.
  #[inline]
  pub fn texture_units(&self) -> i32 {
    self.texture_units
  }

  /// Reported maximum number of color attachments.
  #[inline]
  pub fn set_max_color_attachments(self, max_color_attachments: i32) -> Self {
    FakeLimits {
      max_color_attachments,
      ..self
    }
  }

  /// Reported maximum number of color attachments.
  #[inline]
  pub fn max_color_attachments(&self) -> i32 {
    self.max_color_attachments
  }

  /// Reported maximum number of draw buffers.
  #[inline]
  pub fn set_max_draw_buffers(self, max_draw_buffers: i32) -> Self {
    FakeLimits {
      max_draw_buffers,
      ..self
    }
  }

  /// Reported maximum number of draw buffers.
  #[inline]
  pub fn max_draw_buffers(&self) -> i32 {
    self.max_draw_buffers
  }
}

/// How many times the backend was asked to do things.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct FakeCounters {
  /// Calls to `make_current`.
  pub make_current: usize,
  /// Uniform values set.
  pub uniform_submissions: usize,
  /// Constant attribute values set.
  pub attribute_submissions: usize,
  /// Bytes written to buffers.
  pub bytes_uploaded: usize,
  /// Render states applied.
  pub render_state_applications: usize,
  /// Shaders compiled, successfully or not.
  pub compilations: usize,
  /// Programs linked, successfully or not.
  pub links: usize,
}

// Objects shared by every backend of a share group.
#[derive(Debug, Default)]
struct FakeStore {
  next_name: u32,
  buffers: HashMap<u32, FakeBuffer>,
  shaders: HashMap<u32, FakeShader>,
  programs: HashMap<u32, FakeProgram>,
  textures: HashMap<u32, FakeTexture>,
  renderbuffers: HashMap<u32, FakeRenderbuffer>,
}

impl FakeStore {
  fn gen_name(&mut self) -> u32 {
    self.next_name += 1;
    self.next_name
  }

  fn object_count(&self) -> usize {
    self.buffers.len()
      + self.shaders.len()
      + self.programs.len()
      + self.textures.len()
      + self.renderbuffers.len()
  }
}

// State private to one backend.
#[derive(Debug)]
struct FakeState {
  current: bool,
  array_buffer: u32,
  array_objects: HashMap<u32, FakeArrayObject>,
  array_object: u32,
  program: u32,
  attribute_values: HashMap<u32, UniformValue>,
  texture_units: HashMap<u32, (TextureTarget, u32)>,
  framebuffers: HashMap<u32, FakeFramebuffer>,
  draw_framebuffer: u32,
  read_framebuffer: u32,
  forced_status: Option<FramebufferStatus>,
  render_state: Option<RenderState>,
  draws: Vec<DrawCall>,
  clears: Vec<ClearOptions>,
  blits: Vec<BlitRegion>,
  counters: FakeCounters,
}

impl FakeState {
  fn new() -> Self {
    let mut array_objects = HashMap::new();
    // the default array object
    array_objects.insert(0, FakeArrayObject::default());

    FakeState {
      current: false,
      array_buffer: 0,
      array_objects,
      array_object: 0,
      program: 0,
      attribute_values: HashMap::new(),
      texture_units: HashMap::new(),
      framebuffers: HashMap::new(),
      draw_framebuffer: 0,
      read_framebuffer: 0,
      forced_status: None,
      render_state: None,
      draws: Vec::new(),
      clears: Vec::new(),
      blits: Vec::new(),
      counters: FakeCounters::default(),
    }
  }
}

/// An in-memory backend.
#[derive(Debug)]
pub struct FakeBackend {
  store: Rc<RefCell<FakeStore>>,
  state: FakeState,
  limits: FakeLimits,
}

impl Default for FakeBackend {
  fn default() -> Self {
    Self::new()
  }
}

impl FakeBackend {
  /// Create a backend with the default limits.
  pub fn new() -> Self {
    Self::with_limits(FakeLimits::default())
  }

  /// Create a backend reporting `limits`.
  pub fn with_limits(limits: FakeLimits) -> Self {
    FakeBackend {
      store: Rc::new(RefCell::new(FakeStore::default())),
      state: FakeState::new(),
      limits,
    }
  }

  /// Create a backend sharing its objects with `other`, and reporting the same limits.
  pub fn new_shared(other: &Self) -> Self {
    FakeBackend {
      store: other.store.clone(),
      state: FakeState::new(),
      limits: other.limits,
    }
  }

  /// Reported limits.
  pub fn limits(&self) -> &FakeLimits {
    &self.limits
  }

  /// Whether the backend is current.
  pub fn is_current(&self) -> bool {
    self.state.current
  }

  /// Counters.
  pub fn counters(&self) -> &FakeCounters {
    &self.state.counters
  }

  /// Number of live shared objects (buffers, shaders, programs, textures and renderbuffers).
  pub fn object_count(&self) -> usize {
    self.store.borrow().object_count()
  }

  /// Bytes of a buffer.
  pub fn buffer_data(&self, buffer: u32) -> Option<Vec<u8>> {
    self.store.borrow().buffers.get(&buffer).map(|b| b.data.clone())
  }

  /// Usage hint a buffer was created with.
  pub fn buffer_usage(&self, buffer: u32) -> Option<UsageHint> {
    self.store.borrow().buffers.get(&buffer).map(|b| b.usage)
  }

  /// Bound array buffer; `0` if none.
  pub fn bound_array_buffer(&self) -> u32 {
    self.state.array_buffer
  }

  /// Bound array object; `0` is the default one.
  pub fn bound_array_object(&self) -> u32 {
    self.state.array_object
  }

  /// Source of an attribute of an array object, if enabled.
  pub fn array_object_attribute(
    &self,
    array_object: u32,
    location: u32,
  ) -> Option<(u32, AttributeLayout)> {
    self
      .state
      .array_objects
      .get(&array_object)
      .and_then(|ao| ao.attributes.get(&location).copied())
  }

  /// Index buffer of an array object, if any.
  pub fn array_object_index_buffer(&self, array_object: u32) -> Option<u32> {
    self
      .state
      .array_objects
      .get(&array_object)
      .and_then(|ao| ao.index_buffer)
  }

  /// Program in use; `0` if none.
  pub fn current_program(&self) -> u32 {
    self.state.program
  }

  /// Value last set to a uniform of a program.
  pub fn uniform_value(&self, program: u32, location: i32) -> Option<UniformValue> {
    self
      .store
      .borrow()
      .programs
      .get(&program)
      .and_then(|p| p.values.get(&location).copied())
  }

  /// Constant value of an attribute.
  pub fn attribute_value(&self, location: u32) -> Option<UniformValue> {
    self.state.attribute_values.get(&location).copied()
  }

  /// Texture bound to a unit; `0` if none.
  pub fn texture_unit(&self, unit: u32) -> u32 {
    self.state.texture_units.get(&unit).map_or(0, |&(_, id)| id)
  }

  /// Texels of an image of a texture.
  pub fn texture_image(&self, texture: u32, image: ImageTarget) -> Option<Vec<u8>> {
    let store = self.store.borrow();
    let texture = store.textures.get(&texture)?;
    texture.image(image).map(<[u8]>::to_vec)
  }

  /// Format and size of a renderbuffer.
  pub fn renderbuffer_storage(&self, renderbuffer: u32) -> Option<(RenderbufferFormat, u32, u32)> {
    self
      .store
      .borrow()
      .renderbuffers
      .get(&renderbuffer)
      .map(|r| (r.format, r.width, r.height))
  }

  /// Framebuffer bound for drawing; `0` for the default one.
  pub fn draw_framebuffer(&self) -> u32 {
    self.state.draw_framebuffer
  }

  /// Framebuffer bound for reading; `0` for the default one.
  pub fn read_framebuffer(&self) -> u32 {
    self.state.read_framebuffer
  }

  /// Force the status reported for framebuffers created from now on; `None` computes it.
  pub fn set_framebuffer_status(&mut self, status: Option<FramebufferStatus>) {
    self.state.forced_status = status;
  }

  /// Last render state applied.
  pub fn render_state(&self) -> Option<&RenderState> {
    self.state.render_state.as_ref()
  }

  /// Every draw, in order.
  pub fn draws(&self) -> &[DrawCall] {
    &self.state.draws
  }

  /// Every clear, in order.
  pub fn clears(&self) -> &[ClearOptions] {
    &self.state.clears
  }

  /// Every blit, in order.
  pub fn blits(&self) -> &[BlitRegion] {
    &self.state.blits
  }

  fn unknown(what: &str, id: u32) -> Error {
    Error::driver(format!("{} {} does not exist", what, id))
  }
}
