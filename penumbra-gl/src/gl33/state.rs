//! Graphics state.
//!
//! OpenGL keeps a lot of implicit state per context. [`GLState`] mirrors the parts penumbra touches
//! so that redundant driver calls can be skipped, and so that binding something temporarily can
//! restore what was bound before.

use crate::gl33::enums::{
  blending_equation_from_gl, blending_equation_to_gl, blending_factor_from_gl,
  blending_factor_to_gl, depth_comparison_from_gl, depth_comparison_to_gl,
  face_culling_mode_from_gl, face_culling_mode_to_gl, face_winding_from_gl, face_winding_to_gl,
  logic_op_to_gl, polygon_mode_to_gl, stencil_func_to_gl, stencil_op_to_gl, GlEnumError,
};
use gl::types::*;
use log::trace;
use penumbra::blending::{Blending, Equation, Factor};
use penumbra::depth_test::{DepthComparison, DepthState};
use penumbra::error::Error;
use penumbra::face_culling::{FaceCulling, FaceCullingMode, FaceWinding};
use penumbra::render_state::{ColorMask, LogicOp, PolygonMode};
use penumbra::stencil::{StencilFace, StencilState};
use penumbra::texture::Area;
use std::error;
use std::fmt;
use std::marker::PhantomData;

/// Cached value.
///
/// A cached value is used to prevent issuing costly GPU commands if we know the target value is
/// already set to what the command tries to set. An empty cache is always invalid, forcing the
/// next command through.
#[derive(Debug)]
pub(crate) struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  pub(crate) fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// A cache that does not know the value yet.
  pub(crate) fn unknown() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  pub(crate) fn invalidate(&mut self) {
    self.0 = None;
  }

  pub(crate) fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  pub(crate) fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }

  /// Check if the cached value is invalid regarding a value.
  pub(crate) fn is_invalid(&self, new_val: &T) -> bool {
    match self.0 {
      Some(ref t) => t != new_val,
      None => true,
    }
  }
}

/// Whether a bind should go through the cache or be forced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BlendingEquations {
  rgb: Equation,
  alpha: Equation,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BlendingFactors {
  src_rgb: Factor,
  dst_rgb: Factor,
  src_alpha: Factor,
  dst_alpha: Factor,
}

/// The graphics state of one context.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // vertex array standing for the default one, which core profiles do not have
  default_vertex_array: GLuint,

  // bindings
  bound_array_buffer: Cached<GLuint>,
  bound_vertex_array: Cached<GLuint>,
  current_program: Cached<GLuint>,
  bound_draw_framebuffer: Cached<GLuint>,
  bound_read_framebuffer: Cached<GLuint>,
  bound_renderbuffer: Cached<GLuint>,

  // texture
  current_texture_unit: Cached<u32>,
  bound_textures: Vec<(GLenum, GLuint)>,

  // blending
  blending_state: Cached<bool>,
  blending_equations: Cached<BlendingEquations>,
  blending_funcs: Cached<BlendingFactors>,

  // depth
  depth_test: Cached<bool>,
  depth_test_comparison: Cached<DepthComparison>,
  depth_write: Cached<bool>,
  depth_clamp: Cached<bool>,

  // stencil
  stencil_test: Cached<bool>,
  stencil_front: Cached<StencilFace>,
  stencil_back: Cached<StencilFace>,

  // face culling
  face_culling_state: Cached<bool>,
  face_culling_winding: Cached<FaceWinding>,
  face_culling_mode: Cached<FaceCullingMode>,

  // scissor
  scissor_state: Cached<bool>,
  scissor_region: Cached<Area>,

  // rasterization
  polygon_mode: Cached<PolygonMode>,
  color_mask: Cached<ColorMask>,
  logic_op_state: Cached<bool>,
  logic_op: Cached<LogicOp>,

  // clear values
  clear_color: Cached<[GLfloat; 4]>,
  clear_depth: Cached<GLfloat>,
  clear_stencil: Cached<GLint>,
}

impl GLState {
  /// Read the state of the context current on the calling thread.
  pub(crate) fn from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let mut default_vertex_array: GLuint = 0;
      gl::GenVertexArrays(1, &mut default_vertex_array);
      gl::BindVertexArray(default_vertex_array);

      let blending_state = Cached::new(get_ctx_capability(gl::BLEND)?);
      let blending_equations = Cached::new(get_ctx_blending_equations()?);
      let blending_funcs = Cached::new(get_ctx_blending_factors()?);
      let depth_test = Cached::new(get_ctx_capability(gl::DEPTH_TEST)?);
      let depth_test_comparison = Cached::new(get_ctx_depth_comparison()?);
      let depth_clamp = Cached::new(get_ctx_capability(gl::DEPTH_CLAMP)?);
      let stencil_test = Cached::new(get_ctx_capability(gl::STENCIL_TEST)?);
      let face_culling_state = Cached::new(get_ctx_capability(gl::CULL_FACE)?);
      let face_culling_winding = Cached::new(get_ctx_face_culling_winding()?);
      let face_culling_mode = Cached::new(get_ctx_face_culling_mode()?);
      let scissor_state = Cached::new(get_ctx_capability(gl::SCISSOR_TEST)?);
      let logic_op_state = Cached::new(get_ctx_capability(gl::COLOR_LOGIC_OP)?);
      let current_texture_unit = Cached::new(get_ctx_current_texture_unit());
      let current_program = Cached::new(get_ctx_integer(gl::CURRENT_PROGRAM));
      let bound_draw_framebuffer = Cached::new(get_ctx_integer(gl::DRAW_FRAMEBUFFER_BINDING));
      let bound_read_framebuffer = Cached::new(get_ctx_integer(gl::READ_FRAMEBUFFER_BINDING));

      Ok(GLState {
        _a: PhantomData,
        default_vertex_array,
        bound_array_buffer: Cached::new(get_ctx_integer(gl::ARRAY_BUFFER_BINDING)),
        bound_vertex_array: Cached::new(default_vertex_array),
        current_program,
        bound_draw_framebuffer,
        bound_read_framebuffer,
        bound_renderbuffer: Cached::unknown(),
        current_texture_unit,
        bound_textures: Vec::new(),
        blending_state,
        blending_equations,
        blending_funcs,
        depth_test,
        depth_test_comparison,
        depth_write: Cached::unknown(),
        depth_clamp,
        stencil_test,
        stencil_front: Cached::unknown(),
        stencil_back: Cached::unknown(),
        face_culling_state,
        face_culling_winding,
        face_culling_mode,
        scissor_state,
        scissor_region: Cached::unknown(),
        polygon_mode: Cached::unknown(),
        color_mask: Cached::unknown(),
        logic_op_state,
        logic_op: Cached::unknown(),
        clear_color: Cached::unknown(),
        clear_depth: Cached::unknown(),
        clear_stencil: Cached::unknown(),
      })
    }
  }

  /// Forget everything cached.
  ///
  /// Bindings made by code other than the backend are not seen by the caches; this forces every
  /// next command to reach the driver.
  pub fn invalidate(&mut self) {
    trace!("invalidating cached state");

    self.bound_array_buffer.invalidate();
    self.bound_vertex_array.invalidate();
    self.current_program.invalidate();
    self.bound_draw_framebuffer.invalidate();
    self.bound_read_framebuffer.invalidate();
    self.bound_renderbuffer.invalidate();
    self.current_texture_unit.invalidate();
    self.bound_textures.clear();
    self.blending_state.invalidate();
    self.blending_equations.invalidate();
    self.blending_funcs.invalidate();
    self.depth_test.invalidate();
    self.depth_test_comparison.invalidate();
    self.depth_write.invalidate();
    self.depth_clamp.invalidate();
    self.stencil_test.invalidate();
    self.stencil_front.invalidate();
    self.stencil_back.invalidate();
    self.face_culling_state.invalidate();
    self.face_culling_winding.invalidate();
    self.face_culling_mode.invalidate();
    self.scissor_state.invalidate();
    self.scissor_region.invalidate();
    self.polygon_mode.invalidate();
    self.color_mask.invalidate();
    self.logic_op_state.invalidate();
    self.logic_op.invalidate();
    self.clear_color.invalidate();
    self.clear_depth.invalidate();
    self.clear_stencil.invalidate();
  }

  /// Driver name of the vertex array standing for the default one.
  pub fn default_vertex_array(&self) -> GLuint {
    self.default_vertex_array
  }

  pub(crate) fn array_buffer(&self) -> GLuint {
    self.bound_array_buffer.get().copied().unwrap_or(0)
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer.set(handle);
    }
  }

  /// Driver name of the bound vertex array; `0` is reported for the default one.
  pub(crate) fn vertex_array(&self) -> GLuint {
    match self.bound_vertex_array.get() {
      Some(&handle) if handle != self.default_vertex_array => handle,
      _ => 0,
    }
  }

  /// Bind a vertex array; `0` binds the default one.
  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    let handle = if handle == 0 {
      self.default_vertex_array
    } else {
      handle
    };

    if bind == Bind::Forced || self.bound_vertex_array.is_invalid(&handle) {
      gl::BindVertexArray(handle);
      self.bound_vertex_array.set(handle);
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.is_invalid(&handle) {
      gl::UseProgram(handle);
      self.current_program.set(handle);
    }
  }

  pub(crate) unsafe fn bind_draw_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, handle);
      self.bound_draw_framebuffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_read_framebuffer(&mut self, handle: GLuint) {
    if self.bound_read_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::READ_FRAMEBUFFER, handle);
      self.bound_read_framebuffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_renderbuffer(&mut self, handle: GLuint) {
    if self.bound_renderbuffer.is_invalid(&handle) {
      gl::BindRenderbuffer(gl::RENDERBUFFER, handle);
      self.bound_renderbuffer.set(handle);
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
      self.current_texture_unit.set(unit);
    }
  }

  /// Bind a texture to a unit, making the unit active.
  pub(crate) unsafe fn bind_texture(&mut self, unit: u32, target: GLenum, handle: GLuint) {
    self.set_texture_unit(unit);

    let unit = unit as usize;

    match self.bound_textures.get(unit).copied() {
      Some(bound) if bound == (target, handle) => (),

      Some(_) => {
        gl::BindTexture(target, handle);
        self.bound_textures[unit] = (target, handle);
      }

      None => {
        gl::BindTexture(target, handle);

        // not enough registered texture units; grow a bit more
        self.bound_textures.resize(unit + 1, (gl::TEXTURE_2D, 0));
        self.bound_textures[unit] = (target, handle);
      }
    }
  }

  /// Forget a deleted buffer; the driver unbinds it from the current context.
  pub(crate) fn forget_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer.get() == Some(&handle) {
      self.bound_array_buffer.set(0);
    }
  }

  /// Forget a deleted vertex array; the driver falls back to vertex array `0`, which core
  /// profiles cannot draw with.
  pub(crate) fn forget_vertex_array(&mut self, handle: GLuint) {
    if self.bound_vertex_array.get() == Some(&handle) {
      self.bound_vertex_array.invalidate();
    }
  }

  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    if self.current_program.get() == Some(&handle) {
      self.current_program.invalidate();
    }
  }

  pub(crate) fn forget_texture(&mut self, handle: GLuint) {
    for bound in self.bound_textures.iter_mut().filter(|(_, h)| *h == handle) {
      bound.1 = 0;
    }
  }

  pub(crate) fn forget_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.get() == Some(&handle) {
      self.bound_draw_framebuffer.set(0);
    }

    if self.bound_read_framebuffer.get() == Some(&handle) {
      self.bound_read_framebuffer.set(0);
    }
  }

  pub(crate) fn forget_renderbuffer(&mut self, handle: GLuint) {
    if self.bound_renderbuffer.get() == Some(&handle) {
      self.bound_renderbuffer.set(0);
    }
  }

  pub(crate) unsafe fn set_blending(&mut self, blending: Option<Blending>) {
    match blending {
      Some(blending) => {
        set_capability(&mut self.blending_state, gl::BLEND, true);

        let equations = BlendingEquations {
          rgb: blending.equation_rgb,
          alpha: blending.equation_alpha,
        };

        if self.blending_equations.is_invalid(&equations) {
          gl::BlendEquationSeparate(
            blending_equation_to_gl(equations.rgb),
            blending_equation_to_gl(equations.alpha),
          );
          self.blending_equations.set(equations);
        }

        let factors = BlendingFactors {
          src_rgb: blending.src_rgb,
          dst_rgb: blending.dst_rgb,
          src_alpha: blending.src_alpha,
          dst_alpha: blending.dst_alpha,
        };

        if self.blending_funcs.is_invalid(&factors) {
          gl::BlendFuncSeparate(
            blending_factor_to_gl(factors.src_rgb),
            blending_factor_to_gl(factors.dst_rgb),
            blending_factor_to_gl(factors.src_alpha),
            blending_factor_to_gl(factors.dst_alpha),
          );
          self.blending_funcs.set(factors);
        }
      }

      None => set_capability(&mut self.blending_state, gl::BLEND, false),
    }
  }

  pub(crate) unsafe fn set_depth(&mut self, depth: DepthState) {
    match depth.test {
      Some(comparison) => {
        set_capability(&mut self.depth_test, gl::DEPTH_TEST, true);

        if self.depth_test_comparison.is_invalid(&comparison) {
          gl::DepthFunc(depth_comparison_to_gl(comparison));
          self.depth_test_comparison.set(comparison);
        }
      }

      None => set_capability(&mut self.depth_test, gl::DEPTH_TEST, false),
    }

    if self.depth_write.is_invalid(&depth.write) {
      gl::DepthMask(if depth.write { gl::TRUE } else { gl::FALSE });
      self.depth_write.set(depth.write);
    }

    set_capability(&mut self.depth_clamp, gl::DEPTH_CLAMP, depth.clamp);
  }

  pub(crate) unsafe fn set_stencil(&mut self, stencil: Option<StencilState>) {
    match stencil {
      Some(stencil) => {
        set_capability(&mut self.stencil_test, gl::STENCIL_TEST, true);
        set_stencil_face(&mut self.stencil_front, gl::FRONT, stencil.front);
        set_stencil_face(&mut self.stencil_back, gl::BACK, stencil.back);
      }

      None => set_capability(&mut self.stencil_test, gl::STENCIL_TEST, false),
    }
  }

  /// Stencil write masks of front and back faces, as far as the cache knows.
  pub(crate) fn stencil_write_masks(&self) -> Option<(GLuint, GLuint)> {
    let front = self.stencil_front.get()?;
    let back = self.stencil_back.get()?;
    Some((front.write_mask, back.write_mask))
  }

  /// Forget the stencil configuration of both faces.
  pub(crate) fn invalidate_stencil_faces(&mut self) {
    self.stencil_front.invalidate();
    self.stencil_back.invalidate();
  }

  pub(crate) unsafe fn set_face_culling(&mut self, face_culling: Option<FaceCulling>) {
    match face_culling {
      Some(face_culling) => {
        set_capability(&mut self.face_culling_state, gl::CULL_FACE, true);

        if self.face_culling_winding.is_invalid(&face_culling.winding) {
          gl::FrontFace(face_winding_to_gl(face_culling.winding));
          self.face_culling_winding.set(face_culling.winding);
        }

        if self.face_culling_mode.is_invalid(&face_culling.mode) {
          gl::CullFace(face_culling_mode_to_gl(face_culling.mode));
          self.face_culling_mode.set(face_culling.mode);
        }
      }

      None => set_capability(&mut self.face_culling_state, gl::CULL_FACE, false),
    }
  }

  pub(crate) unsafe fn set_scissor(&mut self, scissor: Option<Area>) {
    match scissor {
      Some(area) => {
        set_capability(&mut self.scissor_state, gl::SCISSOR_TEST, true);

        if self.scissor_region.is_invalid(&area) {
          gl::Scissor(
            area.x as GLint,
            area.y as GLint,
            area.width as GLsizei,
            area.height as GLsizei,
          );
          self.scissor_region.set(area);
        }
      }

      None => set_capability(&mut self.scissor_state, gl::SCISSOR_TEST, false),
    }
  }

  pub(crate) unsafe fn set_polygon_mode(&mut self, mode: PolygonMode) {
    if self.polygon_mode.is_invalid(&mode) {
      gl::PolygonMode(gl::FRONT_AND_BACK, polygon_mode_to_gl(mode));
      self.polygon_mode.set(mode);
    }
  }

  pub(crate) unsafe fn set_color_mask(&mut self, mask: ColorMask) {
    if self.color_mask.is_invalid(&mask) {
      gl::ColorMask(
        gl_bool(mask.red),
        gl_bool(mask.green),
        gl_bool(mask.blue),
        gl_bool(mask.alpha),
      );
      self.color_mask.set(mask);
    }
  }

  pub(crate) unsafe fn set_logic_op(&mut self, logic_op: Option<LogicOp>) {
    match logic_op {
      Some(op) => {
        set_capability(&mut self.logic_op_state, gl::COLOR_LOGIC_OP, true);

        if self.logic_op.is_invalid(&op) {
          gl::LogicOp(logic_op_to_gl(op));
          self.logic_op.set(op);
        }
      }

      None => set_capability(&mut self.logic_op_state, gl::COLOR_LOGIC_OP, false),
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&color) {
      gl::ClearColor(color[0], color[1], color[2], color[3]);
      self.clear_color.set(color);
    }
  }

  pub(crate) unsafe fn set_clear_depth(&mut self, depth: GLfloat) {
    if self.clear_depth.is_invalid(&depth) {
      gl::ClearDepth(depth as GLdouble);
      self.clear_depth.set(depth);
    }
  }

  pub(crate) unsafe fn set_clear_stencil(&mut self, stencil: GLint) {
    if self.clear_stencil.is_invalid(&stencil) {
      gl::ClearStencil(stencil);
      self.clear_stencil.set(stencil);
    }
  }

  /// Whether the depth buffer is writable, as far as the cache knows.
  pub(crate) fn depth_write(&self) -> Option<bool> {
    self.depth_write.get().copied()
  }

  /// Color mask, as far as the cache knows.
  pub(crate) fn color_mask(&self) -> Option<ColorMask> {
    self.color_mask.get().copied()
  }
}

unsafe fn set_capability(cache: &mut Cached<bool>, capability: GLenum, enabled: bool) {
  if cache.is_invalid(&enabled) {
    if enabled {
      gl::Enable(capability);
    } else {
      gl::Disable(capability);
    }

    cache.set(enabled);
  }
}

unsafe fn set_stencil_face(cache: &mut Cached<StencilFace>, face: GLenum, value: StencilFace) {
  if cache.is_invalid(&value) {
    gl::StencilFuncSeparate(
      face,
      stencil_func_to_gl(value.comparison),
      value.reference,
      value.read_mask,
    );
    gl::StencilOpSeparate(
      face,
      stencil_op_to_gl(value.stencil_fail),
      stencil_op_to_gl(value.depth_fail),
      stencil_op_to_gl(value.pass),
    );
    gl::StencilMaskSeparate(face, value.write_mask);
    cache.set(value);
  }
}

fn gl_bool(b: bool) -> GLboolean {
  if b {
    gl::TRUE
  } else {
    gl::FALSE
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum StateQueryError {
  /// Corrupted capability state.
  UnknownCapabilityState(GLenum, GLboolean),
  /// A state value penumbra has no representation for.
  UnknownEnum(GlEnumError),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StateQueryError::UnknownCapabilityState(cap, s) => {
        write!(f, "unknown state {} for capability {:#x}", s, cap)
      }

      StateQueryError::UnknownEnum(ref e) => write!(f, "{}", e),
    }
  }
}

impl error::Error for StateQueryError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      StateQueryError::UnknownEnum(e) => Some(e),
      _ => None,
    }
  }
}

impl From<GlEnumError> for StateQueryError {
  fn from(e: GlEnumError) -> Self {
    StateQueryError::UnknownEnum(e)
  }
}

impl From<StateQueryError> for Error {
  fn from(e: StateQueryError) -> Self {
    Error::driver(e.to_string())
  }
}

unsafe fn get_ctx_capability(capability: GLenum) -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(capability);

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownCapabilityState(capability, state)),
  }
}

unsafe fn get_ctx_integer(name: GLenum) -> GLuint {
  let mut value = 0;
  gl::GetIntegerv(name, &mut value);
  value as GLuint
}

unsafe fn get_ctx_current_texture_unit() -> u32 {
  get_ctx_integer(gl::ACTIVE_TEXTURE) - gl::TEXTURE0
}

unsafe fn get_ctx_blending_equations() -> Result<BlendingEquations, StateQueryError> {
  let rgb = blending_equation_from_gl(get_ctx_integer(gl::BLEND_EQUATION_RGB))?;
  let alpha = blending_equation_from_gl(get_ctx_integer(gl::BLEND_EQUATION_ALPHA))?;

  Ok(BlendingEquations { rgb, alpha })
}

unsafe fn get_ctx_blending_factors() -> Result<BlendingFactors, StateQueryError> {
  let factor = |name| blending_factor_from_gl(get_ctx_integer(name));

  Ok(BlendingFactors {
    src_rgb: factor(gl::BLEND_SRC_RGB)?,
    dst_rgb: factor(gl::BLEND_DST_RGB)?,
    src_alpha: factor(gl::BLEND_SRC_ALPHA)?,
    dst_alpha: factor(gl::BLEND_DST_ALPHA)?,
  })
}

unsafe fn get_ctx_depth_comparison() -> Result<DepthComparison, StateQueryError> {
  Ok(depth_comparison_from_gl(get_ctx_integer(gl::DEPTH_FUNC))?)
}

unsafe fn get_ctx_face_culling_winding() -> Result<FaceWinding, StateQueryError> {
  Ok(face_winding_from_gl(get_ctx_integer(gl::FRONT_FACE))?)
}

unsafe fn get_ctx_face_culling_mode() -> Result<FaceCullingMode, StateQueryError> {
  Ok(face_culling_mode_from_gl(get_ctx_integer(gl::CULL_FACE_MODE))?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_caches_are_always_invalid() {
    let cached: Cached<u32> = Cached::unknown();

    assert!(cached.is_invalid(&0));
    assert!(cached.is_invalid(&1));
  }

  #[test]
  fn cached_values_are_compared() {
    let mut cached = Cached::new(3);

    assert!(!cached.is_invalid(&3));
    assert!(cached.is_invalid(&4));

    cached.set(4);
    assert!(!cached.is_invalid(&4));

    cached.invalidate();
    assert!(cached.is_invalid(&4));
    assert_eq!(cached.get(), None);
  }

  #[test]
  fn state_query_errors_become_driver_errors() {
    let e = Error::from(StateQueryError::UnknownCapabilityState(gl::BLEND, 3));
    assert_eq!(e, Error::driver("unknown state 3 for capability 0xbe2"));

    let e = Error::from(StateQueryError::from(
      depth_comparison_from_gl(gl::ONE).unwrap_err(),
    ));
    assert_eq!(e, Error::driver("unknown depth comparison: 0x1"));
  }
}
