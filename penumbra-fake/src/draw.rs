use crate::FakeBackend;
use log::trace;
use penumbra::backend::draw::Draw;
use penumbra::buffer::IndexType;
use penumbra::draw::{ClearOptions, Primitive};
use penumbra::error::Error;

/// A recorded draw.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DrawCall {
  /// Primitive drawn.
  pub primitive: Primitive,
  /// First vertex; `0` for indexed draws.
  pub first: usize,
  /// Number of vertices or indices.
  pub count: usize,
  /// Type of the indices, for indexed draws.
  pub index_type: Option<IndexType>,
  /// Number of instances.
  pub instances: usize,
  /// Program in use.
  pub program: u32,
  /// Bound array object.
  pub array_object: u32,
  /// Framebuffer bound for drawing.
  pub framebuffer: u32,
}

impl FakeBackend {
  fn check_draw(&self) -> Result<(), Error> {
    if self.state.program == 0 {
      return Err(Error::driver("no program in use"));
    }

    let store = self.store.borrow();
    let bound = self.state.array_object;
    let array_object = self
      .state
      .array_objects
      .get(&bound)
      .ok_or_else(|| Self::unknown("array object", bound))?;

    for (location, &(buffer, _)) in &array_object.attributes {
      if !store.buffers.contains_key(&buffer) {
        return Err(Error::driver(format!(
          "attribute {} reads from deleted buffer {}",
          location, buffer
        )));
      }
    }

    Ok(())
  }

  fn record(&mut self, call: DrawCall) {
    trace!("fake: {:?}", call);
    self.state.draws.push(call);
  }
}

unsafe impl Draw for FakeBackend {
  unsafe fn draw_arrays(
    &mut self,
    primitive: Primitive,
    first: usize,
    count: usize,
    instances: usize,
  ) -> Result<(), Error> {
    self.check_draw()?;

    self.record(DrawCall {
      primitive,
      first,
      count,
      index_type: None,
      instances,
      program: self.state.program,
      array_object: self.state.array_object,
      framebuffer: self.state.draw_framebuffer,
    });

    Ok(())
  }

  unsafe fn draw_elements(
    &mut self,
    primitive: Primitive,
    count: usize,
    index_type: IndexType,
    instances: usize,
  ) -> Result<(), Error> {
    self.check_draw()?;

    let bound = self.state.array_object;
    let index_buffer = self
      .array_object_index_buffer(bound)
      .ok_or_else(|| Error::driver(format!("array object {} has no index buffer", bound)))?;

    if !self.store.borrow().buffers.contains_key(&index_buffer) {
      return Err(Self::unknown("index buffer", index_buffer));
    }

    self.record(DrawCall {
      primitive,
      first: 0,
      count,
      index_type: Some(index_type),
      instances,
      program: self.state.program,
      array_object: bound,
      framebuffer: self.state.draw_framebuffer,
    });

    Ok(())
  }

  unsafe fn clear(&mut self, options: &ClearOptions) -> Result<(), Error> {
    self.state.clears.push(*options);
    Ok(())
  }
}
