//! Face culling is the operation of removing triangles if they’re facing the screen in a specific
//! direction with a specific mode.

/// Face culling setup.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct FaceCulling {
  /// Winding of front faces.
  pub winding: FaceWinding,
  /// Which faces are removed.
  pub mode: FaceCullingMode,
}

impl FaceCulling {
  /// Create a [`FaceCulling`] setup.
  pub fn new(winding: FaceWinding, mode: FaceCullingMode) -> Self {
    FaceCulling { winding, mode }
  }
}

impl Default for FaceCulling {
  /// [`FaceWinding::CounterClockwise`] and [`FaceCullingMode::Back`].
  fn default() -> Self {
    FaceCulling::new(FaceWinding::CounterClockwise, FaceCullingMode::Back)
  }
}

/// Order of the vertices of front faces.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FaceWinding {
  /// Clockwise.
  Clockwise,
  /// Counter-clockwise.
  CounterClockwise,
}

/// Faces to remove.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum FaceCullingMode {
  /// Remove front faces.
  Front,
  /// Remove back faces.
  Back,
  /// Remove both.
  Both,
}
