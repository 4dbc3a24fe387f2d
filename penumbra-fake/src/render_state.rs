use crate::FakeBackend;
use penumbra::backend::render_state::RenderState;
use penumbra::error::Error;
use penumbra::render_state::RenderState as State;

unsafe impl RenderState for FakeBackend {
  unsafe fn apply_render_state(&mut self, state: &State) -> Result<(), Error> {
    self.state.render_state = Some(*state);
    self.state.counters.render_state_applications += 1;

    Ok(())
  }
}
