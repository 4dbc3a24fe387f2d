//! Render state implementation for OpenGL 3.3.

use crate::gl33::{check_errors, GL33};
use penumbra::backend::render_state::RenderState;
use penumbra::error::Error;
use penumbra::render_state::RenderState as State;

unsafe impl<S> RenderState for GL33<S> {
  unsafe fn apply_render_state(&mut self, state: &State) -> Result<(), Error> {
    self.state.set_blending(state.blending());
    self.state.set_depth(state.depth());
    self.state.set_stencil(state.stencil());
    self.state.set_face_culling(state.face_culling());
    self.state.set_scissor(state.scissor());
    self.state.set_polygon_mode(state.polygon_mode());
    self.state.set_color_mask(state.color_mask());
    self.state.set_logic_op(state.logic_op());

    check_errors("apply render state")
  }
}
