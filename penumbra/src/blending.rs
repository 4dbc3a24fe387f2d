//! Blending.
//!
//! Given two pixels *src* and *dst* (the pixel being computed and the pixel already stored in
//! the framebuffer), each is multiplied by a [`Factor`] and the results are combined with an
//! [`Equation`]. Color and alpha channels can be blended differently.

/// Blending equation. Used to state how blending factors and pixel data should be blended.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Equation {
  /// `blended = src * srcK + dst * dstK`
  Additive,
  /// `blended = src * srcK - dst * dstK`
  Subtract,
  /// `blended = dst * dstK - src * srcK`
  ReverseSubtract,
  /// `blended = min(src, dst)`
  Min,
  /// `blended = max(src, dst)`
  Max,
}

/// Blending factors. Pixel data are multiplied by these factors before being combined.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Factor {
  /// `1 * color = color`
  One,
  /// `0 * color = 0`
  Zero,
  /// `src * color`
  SrcColor,
  /// `(1 - src) * color`
  SrcColorComplement,
  /// `dst * color`
  DestColor,
  /// `(1 - dst) * color`
  DestColorComplement,
  /// `srcA * color`
  SrcAlpha,
  /// `(1 - srcA) * color`
  SrcAlphaComplement,
  /// `dstA * color`
  DstAlpha,
  /// `(1 - dstA) * color`
  DstAlphaComplement,
  /// `constant * color`
  ConstantColor,
  /// `(1 - constant) * color`
  ConstantColorComplement,
  /// `constantA * color`
  ConstantAlpha,
  /// `(1 - constantA) * color`
  ConstantAlphaComplement,
  /// `min(srcA, 1 - dstA) * color`
  SrcAlphaSaturate,
}

/// Blending configuration.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Blending {
  /// Equation of the color channels.
  pub equation_rgb: Equation,
  /// Equation of the alpha channel.
  pub equation_alpha: Equation,
  /// Source factor of the color channels.
  pub src_rgb: Factor,
  /// Destination factor of the color channels.
  pub dst_rgb: Factor,
  /// Source factor of the alpha channel.
  pub src_alpha: Factor,
  /// Destination factor of the alpha channel.
  pub dst_alpha: Factor,
}

impl Blending {
  /// Blend every channel the same way.
  pub fn new(equation: Equation, src: Factor, dst: Factor) -> Self {
    Blending {
      equation_rgb: equation,
      equation_alpha: equation,
      src_rgb: src,
      dst_rgb: dst,
      src_alpha: src,
      dst_alpha: dst,
    }
  }

  /// Blend the alpha channel differently from the color channels.
  pub fn separate(
    equation_rgb: Equation,
    equation_alpha: Equation,
    (src_rgb, dst_rgb): (Factor, Factor),
    (src_alpha, dst_alpha): (Factor, Factor),
  ) -> Self {
    Blending {
      equation_rgb,
      equation_alpha,
      src_rgb,
      dst_rgb,
      src_alpha,
      dst_alpha,
    }
  }
}
