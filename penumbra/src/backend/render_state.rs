//! Render state backend interface.

use crate::error::Error;
use crate::render_state::RenderState as State;

/// Render state backend.
pub unsafe trait RenderState {
  /// Apply every part of a render state.
  unsafe fn apply_render_state(&mut self, state: &State) -> Result<(), Error>;
}
