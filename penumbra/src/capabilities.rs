//! Implementation capabilities.
//!
//! Drivers are not trusted: every limit they report goes through [`clamp`] before being used.
//! Counts (attributes, units, attachment points) are clamped down to a sane ceiling; a value below
//! the minimum OpenGL 3.3 requires is a [`Error::NonCompliantImplementation`].

use crate::backend::query::Query;
use crate::error::Error;
use log::{debug, error, warn};
use std::fmt;

/// Default ceiling applied to reported counts.
pub const DEFAULT_CEILING: u32 = 1024;

/// Limits queried from the implementation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Limit {
  /// Maximum number of vertex attributes.
  MaxVertexAttribs,
  /// Maximum width/height of a texture.
  MaxTextureSize,
  /// Number of texture units available to fragment shaders.
  MaxTextureImageUnits,
  /// Number of framebuffer color attachment points.
  MaxColorAttachments,
  /// Number of framebuffer draw buffers.
  MaxDrawBuffers,
}

impl Limit {
  /// Every limit.
  pub const ALL: [Limit; 5] = [
    Limit::MaxVertexAttribs,
    Limit::MaxTextureSize,
    Limit::MaxTextureImageUnits,
    Limit::MaxColorAttachments,
    Limit::MaxDrawBuffers,
  ];

  /// Smallest value a compliant implementation may report.
  pub fn minimum(self) -> u32 {
    match self {
      Limit::MaxVertexAttribs => 16,
      Limit::MaxTextureSize => 1024,
      Limit::MaxTextureImageUnits => 16,
      Limit::MaxColorAttachments => 8,
      Limit::MaxDrawBuffers => 8,
    }
  }

  /// Whether the limit is a count that gets clamped to the ceiling.
  ///
  /// Texture sizes are only checked against their minimum.
  pub fn is_clamped(self) -> bool {
    !matches!(self, Limit::MaxTextureSize)
  }
}

impl fmt::Display for Limit {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Limit::MaxVertexAttribs => f.write_str("maximum vertex attributes"),
      Limit::MaxTextureSize => f.write_str("maximum texture size"),
      Limit::MaxTextureImageUnits => f.write_str("texture units"),
      Limit::MaxColorAttachments => f.write_str("maximum color attachments"),
      Limit::MaxDrawBuffers => f.write_str("maximum draw buffers"),
    }
  }
}

/// Validate a value reported by the implementation.
///
/// Values under [`Limit::minimum`] are rejected. Values over `ceiling` are clamped to it if the
/// limit is a count; a ceiling under the minimum of a count is rejected as well.
pub fn clamp(limit: Limit, reported: i32, ceiling: u32) -> Result<u32, Error> {
  debug!("implementation reports {}: {}", limit, reported);

  let minimum = limit.minimum();

  if reported < minimum as i32 {
    let message = format!(
      "reported {} {} is less than the required {}",
      limit, reported, minimum
    );
    error!("{}", message);
    return Err(Error::non_compliant(message));
  }

  if limit.is_clamped() && ceiling < minimum {
    let message = format!(
      "ceiling {} would clamp {} under the required {}",
      ceiling, limit, minimum
    );
    error!("{}", message);
    return Err(Error::non_compliant(message));
  }

  let reported = reported as u32;

  if limit.is_clamped() && reported > ceiling {
    warn!(
      "clamped unreasonable {} {} to {}",
      limit, reported, ceiling
    );
    Ok(ceiling)
  } else {
    Ok(reported)
  }
}

/// Validated limits of an implementation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Capabilities {
  max_vertex_attribs: u32,
  max_texture_size: u32,
  texture_units: u32,
  max_color_attachments: u32,
  max_draw_buffers: u32,
}

impl Capabilities {
  /// Query every limit from a backend and validate it.
  pub fn query<B>(backend: &mut B, ceiling: u32) -> Result<Self, Error>
  where
    B: ?Sized + Query,
  {
    let mut get = |limit| {
      let reported = unsafe { backend.query_limit(limit)? };
      clamp(limit, reported, ceiling)
    };

    Ok(Capabilities {
      max_vertex_attribs: get(Limit::MaxVertexAttribs)?,
      max_texture_size: get(Limit::MaxTextureSize)?,
      texture_units: get(Limit::MaxTextureImageUnits)?,
      max_color_attachments: get(Limit::MaxColorAttachments)?,
      max_draw_buffers: get(Limit::MaxDrawBuffers)?,
    })
  }

  /// Maximum number of vertex attributes.
  pub fn max_vertex_attribs(&self) -> u32 {
    self.max_vertex_attribs
  }

  /// Maximum width/height of a texture.
  pub fn max_texture_size(&self) -> u32 {
    self.max_texture_size
  }

  /// Number of texture units.
  pub fn texture_units(&self) -> u32 {
    self.texture_units
  }

  /// Number of color attachment points.
  pub fn max_color_attachments(&self) -> u32 {
    self.max_color_attachments
  }

  /// Number of draw buffers.
  pub fn max_draw_buffers(&self) -> u32 {
    self.max_draw_buffers
  }
}
