//! Stencil test related features.
//!
//! Front and back faces each have their own test and operations. [`StencilState::new`] configures
//! both faces the same way.

/// Comparison between the masked reference value and the masked stored value.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum StencilComparison {
  /// Never passes.
  Never,
  /// Always passes.
  Always,
  /// Passes if the reference is equal to the stored value.
  Equal,
  /// Passes if the reference is not equal to the stored value.
  NotEqual,
  /// Passes if the reference is less than the stored value.
  Less,
  /// Passes if the reference is less than or equal to the stored value.
  LessOrEqual,
  /// Passes if the reference is greater than the stored value.
  Greater,
  /// Passes if the reference is greater than or equal to the stored value.
  GreaterOrEqual,
}

/// What happens to the stored value.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum StencilOperation {
  /// Keep it.
  Keep,
  /// Set it to `0`.
  Zero,
  /// Set it to the reference value.
  Replace,
  /// Increment it, saturating.
  Increment,
  /// Increment it, wrapping to `0`.
  IncrementWrap,
  /// Decrement it, saturating at `0`.
  Decrement,
  /// Decrement it, wrapping to the maximum.
  DecrementWrap,
  /// Invert its bits.
  Invert,
}

/// Stencil test and operations of one face.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct StencilFace {
  /// Test.
  pub comparison: StencilComparison,
  /// Reference value.
  pub reference: i32,
  /// Mask applied to both the reference and the stored value before comparing them.
  pub read_mask: u32,
  /// Bits of the stored value that can be written.
  pub write_mask: u32,
  /// Operation when the stencil test fails.
  pub stencil_fail: StencilOperation,
  /// Operation when the stencil test passes but the depth test fails.
  pub depth_fail: StencilOperation,
  /// Operation when both tests pass.
  pub pass: StencilOperation,
}

impl StencilFace {
  /// Override the test.
  pub fn set_test(self, comparison: StencilComparison, reference: i32, read_mask: u32) -> Self {
    StencilFace {
      comparison,
      reference,
      read_mask,
      ..self
    }
  }

  /// Override the operations, in the order stencil fail, depth fail, pass.
  pub fn set_operations(
    self,
    stencil_fail: StencilOperation,
    depth_fail: StencilOperation,
    pass: StencilOperation,
  ) -> Self {
    StencilFace {
      stencil_fail,
      depth_fail,
      pass,
      ..self
    }
  }

  /// Override the write mask.
  pub fn set_write_mask(self, write_mask: u32) -> Self {
    StencilFace { write_mask, ..self }
  }
}

impl Default for StencilFace {
  /// Always pass against `0`, every bit readable and writable, keep the stored value.
  fn default() -> Self {
    StencilFace {
      comparison: StencilComparison::Always,
      reference: 0,
      read_mask: !0,
      write_mask: !0,
      stencil_fail: StencilOperation::Keep,
      depth_fail: StencilOperation::Keep,
      pass: StencilOperation::Keep,
    }
  }
}

/// Stencil state of both faces.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct StencilState {
  /// Front faces.
  pub front: StencilFace,
  /// Back faces.
  pub back: StencilFace,
}

impl StencilState {
  /// Same configuration for both faces.
  pub fn new(face: StencilFace) -> Self {
    StencilState {
      front: face,
      back: face,
    }
  }

  /// Different configurations per face.
  pub fn separate(front: StencilFace, back: StencilFace) -> Self {
    StencilState { front, back }
  }
}
