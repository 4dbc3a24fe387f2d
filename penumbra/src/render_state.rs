//! GPU render state.
//!
//! Such a state controls how the GPU must operate some fixed pipeline functionality, such as the
//! blending, depth test, stencil test or face culling operations.

use crate::backend::render_state::RenderState as _;
use crate::backend::Backend;
use crate::blending::Blending;
use crate::context::Context;
use crate::depth_test::DepthState;
use crate::error::Error;
use crate::face_culling::FaceCulling;
use crate::stencil::StencilState;
use crate::texture::Area;
use log::trace;

/// How polygons are rasterized.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum PolygonMode {
  /// Vertices only.
  Point,
  /// Edges only.
  Line,
  /// Filled.
  Fill,
}

/// Logical operation applied between the fragment color and the stored color.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum LogicOp {
  /// `0`
  Clear,
  /// `src & dst`
  And,
  /// `src & !dst`
  AndReverse,
  /// `src`
  Copy,
  /// `!src & dst`
  AndInverted,
  /// `dst`
  NoOp,
  /// `src ^ dst`
  Xor,
  /// `src | dst`
  Or,
  /// `!(src | dst)`
  Nor,
  /// `!(src ^ dst)`
  Equiv,
  /// `!dst`
  Invert,
  /// `src | !dst`
  OrReverse,
  /// `!src`
  CopyInverted,
  /// `!src | dst`
  OrInverted,
  /// `!(src & dst)`
  Nand,
  /// `1`
  Set,
}

/// Channels written to color attachments.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ColorMask {
  /// Red.
  pub red: bool,
  /// Green.
  pub green: bool,
  /// Blue.
  pub blue: bool,
  /// Alpha.
  pub alpha: bool,
}

impl Default for ColorMask {
  /// Every channel is written.
  fn default() -> Self {
    ColorMask {
      red: true,
      green: true,
      blue: true,
      alpha: true,
    }
  }
}

/// GPU render state.
///
/// You can get a default value with `RenderState::default` and set the operations you want with the
/// various `RenderState::set_*` methods.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct RenderState {
  blending: Option<Blending>,
  depth: DepthState,
  stencil: Option<StencilState>,
  face_culling: Option<FaceCulling>,
  scissor: Option<Area>,
  polygon_mode: PolygonMode,
  color_mask: ColorMask,
  logic_op: Option<LogicOp>,
}

impl RenderState {
  /// Override the blending configuration.
  pub fn set_blending<B>(self, blending: B) -> Self
  where
    B: Into<Option<Blending>>,
  {
    RenderState {
      blending: blending.into(),
      ..self
    }
  }

  /// Blending configuration.
  pub fn blending(&self) -> Option<Blending> {
    self.blending
  }

  /// Override the depth state.
  pub fn set_depth(self, depth: DepthState) -> Self {
    RenderState { depth, ..self }
  }

  /// Depth state.
  pub fn depth(&self) -> DepthState {
    self.depth
  }

  /// Override the stencil state.
  pub fn set_stencil<S>(self, stencil: S) -> Self
  where
    S: Into<Option<StencilState>>,
  {
    RenderState {
      stencil: stencil.into(),
      ..self
    }
  }

  /// Stencil state; `None` disables the stencil test.
  pub fn stencil(&self) -> Option<StencilState> {
    self.stencil
  }

  /// Override the face culling configuration.
  pub fn set_face_culling<FC>(self, face_culling: FC) -> Self
  where
    FC: Into<Option<FaceCulling>>,
  {
    RenderState {
      face_culling: face_culling.into(),
      ..self
    }
  }

  /// Face culling configuration.
  pub fn face_culling(&self) -> Option<FaceCulling> {
    self.face_culling
  }

  /// Override the scissor region.
  pub fn set_scissor<S>(self, scissor: S) -> Self
  where
    S: Into<Option<Area>>,
  {
    RenderState {
      scissor: scissor.into(),
      ..self
    }
  }

  /// Scissor region.
  pub fn scissor(&self) -> Option<Area> {
    self.scissor
  }

  /// Override the polygon mode.
  pub fn set_polygon_mode(self, polygon_mode: PolygonMode) -> Self {
    RenderState {
      polygon_mode,
      ..self
    }
  }

  /// Polygon mode.
  pub fn polygon_mode(&self) -> PolygonMode {
    self.polygon_mode
  }

  /// Override the color mask.
  pub fn set_color_mask(self, color_mask: ColorMask) -> Self {
    RenderState { color_mask, ..self }
  }

  /// Color mask.
  pub fn color_mask(&self) -> ColorMask {
    self.color_mask
  }

  /// Override the logical operation.
  pub fn set_logic_op<L>(self, logic_op: L) -> Self
  where
    L: Into<Option<LogicOp>>,
  {
    RenderState {
      logic_op: logic_op.into(),
      ..self
    }
  }

  /// Logical operation.
  pub fn logic_op(&self) -> Option<LogicOp> {
    self.logic_op
  }
}

impl Default for RenderState {
  /// The default `RenderState`.
  ///
  ///   - `blending`: `None`
  ///   - `depth`: `DepthState::default()`
  ///   - `stencil`: `None`
  ///   - `face_culling`: `None`
  ///   - `scissor`: `None`
  ///   - `polygon_mode`: `PolygonMode::Fill`
  ///   - `color_mask`: every channel
  ///   - `logic_op`: `None`
  fn default() -> Self {
    RenderState {
      blending: None,
      depth: DepthState::default(),
      stencil: None,
      face_culling: None,
      scissor: None,
      polygon_mode: PolygonMode::Fill,
      color_mask: ColorMask::default(),
      logic_op: None,
    }
  }
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Apply a render state.
  pub fn render_state_apply(&mut self, state: &RenderState) -> Result<(), Error> {
    self.check_current()?;
    trace!("apply render state {:?}", state);

    unsafe { self.backend.apply_render_state(state) }
  }
}
