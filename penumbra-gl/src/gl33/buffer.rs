//! OpenGL buffer implementation.
//!
//! Data transfers go through the `COPY_WRITE_BUFFER` binding point, which nothing else uses, so
//! that neither the array buffer binding nor the index buffer of the bound vertex array changes.

use crate::gl33::enums::usage_hint_to_gl;
use crate::gl33::state::Bind;
use crate::gl33::{check_errors, GL33};
use gl::types::*;
use log::trace;
use penumbra::backend::buffer::{Buffer, BufferTarget};
use penumbra::buffer::UsageHint;
use penumbra::error::Error;
use std::os::raw::c_void;

unsafe impl<S> Buffer for GL33<S> {
  unsafe fn new_buffer(
    &mut self,
    target: BufferTarget,
    bytes: usize,
    usage: UsageHint,
  ) -> Result<u32, Error> {
    let mut handle: GLuint = 0;
    gl::GenBuffers(1, &mut handle);

    let zeroes = vec![0u8; bytes];

    match target {
      BufferTarget::Array => {
        self.state.bind_array_buffer(handle, Bind::Forced);
        gl::BufferData(
          gl::ARRAY_BUFFER,
          bytes as GLsizeiptr,
          zeroes.as_ptr() as *const c_void,
          usage_hint_to_gl(usage),
        );
      }

      BufferTarget::Index => {
        gl::BindBuffer(gl::COPY_WRITE_BUFFER, handle);
        gl::BufferData(
          gl::COPY_WRITE_BUFFER,
          bytes as GLsizeiptr,
          zeroes.as_ptr() as *const c_void,
          usage_hint_to_gl(usage),
        );
        gl::BindBuffer(gl::COPY_WRITE_BUFFER, 0);
      }
    }

    if let Err(e) = check_errors("allocate buffer") {
      gl::DeleteBuffers(1, &handle);
      self.state.forget_buffer(handle);
      return Err(e);
    }

    trace!("new {:?} buffer {} ({} bytes)", target, handle, bytes);
    Ok(handle)
  }

  unsafe fn delete_buffer(&mut self, _: BufferTarget, buffer: u32) -> Result<(), Error> {
    gl::DeleteBuffers(1, &buffer);
    self.state.forget_buffer(buffer);

    Ok(())
  }

  unsafe fn bind_array_buffer(&mut self, buffer: u32) -> Result<(), Error> {
    self.state.bind_array_buffer(buffer, Bind::Cached);
    Ok(())
  }

  unsafe fn write_buffer(
    &mut self,
    _: BufferTarget,
    buffer: u32,
    offset: usize,
    data: &[u8],
  ) -> Result<(), Error> {
    gl::BindBuffer(gl::COPY_WRITE_BUFFER, buffer);
    gl::BufferSubData(
      gl::COPY_WRITE_BUFFER,
      offset as GLintptr,
      data.len() as GLsizeiptr,
      data.as_ptr() as *const c_void,
    );
    gl::BindBuffer(gl::COPY_WRITE_BUFFER, 0);

    check_errors("write buffer")
  }

  unsafe fn read_buffer(
    &mut self,
    _: BufferTarget,
    buffer: u32,
    offset: usize,
    out: &mut [u8],
  ) -> Result<(), Error> {
    gl::BindBuffer(gl::COPY_WRITE_BUFFER, buffer);
    gl::GetBufferSubData(
      gl::COPY_WRITE_BUFFER,
      offset as GLintptr,
      out.len() as GLsizeiptr,
      out.as_mut_ptr() as *mut c_void,
    );
    gl::BindBuffer(gl::COPY_WRITE_BUFFER, 0);

    check_errors("read buffer")
  }
}
