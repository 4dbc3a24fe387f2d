use crate::FakeBackend;
use log::trace;
use penumbra::backend::buffer::{Buffer, BufferTarget};
use penumbra::buffer::UsageHint;
use penumbra::error::Error;

#[derive(Debug)]
pub(crate) struct FakeBuffer {
  pub(crate) target: BufferTarget,
  pub(crate) usage: UsageHint,
  pub(crate) data: Vec<u8>,
}

impl FakeBackend {
  fn check_buffer_range(
    &self,
    target: BufferTarget,
    buffer: u32,
    offset: usize,
    len: usize,
  ) -> Result<(), Error> {
    let store = self.store.borrow();
    let fake = store
      .buffers
      .get(&buffer)
      .ok_or_else(|| Self::unknown("buffer", buffer))?;

    if fake.target != target {
      return Err(Error::driver(format!(
        "buffer {} was created as {:?}, not {:?}",
        buffer, fake.target, target
      )));
    }

    if offset + len > fake.data.len() {
      return Err(Error::driver(format!(
        "range {}..{} out of buffer {} of {} bytes",
        offset,
        offset + len,
        buffer,
        fake.data.len()
      )));
    }

    Ok(())
  }
}

unsafe impl Buffer for FakeBackend {
  unsafe fn new_buffer(
    &mut self,
    target: BufferTarget,
    bytes: usize,
    usage: UsageHint,
  ) -> Result<u32, Error> {
    let mut store = self.store.borrow_mut();
    let id = store.gen_name();

    store.buffers.insert(
      id,
      FakeBuffer {
        target,
        usage,
        data: vec![0; bytes],
      },
    );

    if target == BufferTarget::Array {
      self.state.array_buffer = id;
    }

    trace!("fake: new {:?} buffer {} ({} bytes, {:?})", target, id, bytes, usage);
    Ok(id)
  }

  unsafe fn delete_buffer(&mut self, target: BufferTarget, buffer: u32) -> Result<(), Error> {
    self.check_buffer_range(target, buffer, 0, 0)?;
    self.store.borrow_mut().buffers.remove(&buffer);

    if self.state.array_buffer == buffer {
      self.state.array_buffer = 0;
    }

    Ok(())
  }

  unsafe fn bind_array_buffer(&mut self, buffer: u32) -> Result<(), Error> {
    if buffer != 0 {
      self.check_buffer_range(BufferTarget::Array, buffer, 0, 0)?;
    }

    self.state.array_buffer = buffer;
    Ok(())
  }

  unsafe fn write_buffer(
    &mut self,
    target: BufferTarget,
    buffer: u32,
    offset: usize,
    data: &[u8],
  ) -> Result<(), Error> {
    self.check_buffer_range(target, buffer, offset, data.len())?;

    if let Some(fake) = self.store.borrow_mut().buffers.get_mut(&buffer) {
      fake.data[offset..offset + data.len()].copy_from_slice(data);
    }

    self.state.counters.bytes_uploaded += data.len();
    Ok(())
  }

  unsafe fn read_buffer(
    &mut self,
    target: BufferTarget,
    buffer: u32,
    offset: usize,
    out: &mut [u8],
  ) -> Result<(), Error> {
    self.check_buffer_range(target, buffer, offset, out.len())?;

    if let Some(fake) = self.store.borrow().buffers.get(&buffer) {
      out.copy_from_slice(&fake.data[offset..offset + out.len()]);
    }

    Ok(())
  }
}
