//! Depth test related features.

/// Comparison used to decide whether a fragment passes the depth test.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum DepthComparison {
  /// Never passes.
  Never,
  /// Always passes.
  Always,
  /// Passes if the incoming depth is equal to the stored one.
  Equal,
  /// Passes if the incoming depth is not equal to the stored one.
  NotEqual,
  /// Passes if the incoming depth is less than the stored one.
  Less,
  /// Passes if the incoming depth is less than or equal to the stored one.
  LessOrEqual,
  /// Passes if the incoming depth is greater than the stored one.
  Greater,
  /// Passes if the incoming depth is greater than or equal to the stored one.
  GreaterOrEqual,
}

/// Depth state.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct DepthState {
  /// Depth test; `None` disables it.
  pub test: Option<DepthComparison>,
  /// Whether depth values are written.
  pub write: bool,
  /// Whether depth values are clamped instead of clipped.
  pub clamp: bool,
}

impl Default for DepthState {
  /// Test with [`DepthComparison::Less`], write, no clamping.
  fn default() -> Self {
    DepthState {
      test: Some(DepthComparison::Less),
      write: true,
      clamp: false,
    }
  }
}
