//! OpenGL vertex array implementation.

use crate::gl33::enums::scalar_type_to_gl;
use crate::gl33::state::Bind;
use crate::gl33::{check_errors, GL33};
use gl::types::*;
use log::trace;
use penumbra::array_object::{AttributeKind, AttributeLayout, VertexAttribute};
use penumbra::backend::array_object::ArrayObject;
use penumbra::buffer::IndexBuffer;
use penumbra::error::Error;
use penumbra::handle::Resource as _;
use std::os::raw::c_void;

unsafe impl<S> ArrayObject for GL33<S> {
  unsafe fn new_array_object(
    &mut self,
    index_buffer: Option<&IndexBuffer>,
    attributes: &[Option<VertexAttribute>],
  ) -> Result<u32, Error> {
    let mut handle: GLuint = 0;
    gl::GenVertexArrays(1, &mut handle);
    self.state.bind_vertex_array(handle, Bind::Forced);

    if let Some(index_buffer) = index_buffer {
      // recorded by the vertex array
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer.handle().id());
    }

    for (location, attribute) in attributes.iter().enumerate() {
      if let Some(attribute) = attribute {
        self.enable_attribute_array(
          location as u32,
          attribute.buffer().handle().id(),
          attribute.layout(),
        )?;
      }
    }

    if let Err(e) = check_errors("allocate vertex array") {
      gl::DeleteVertexArrays(1, &handle);
      self.state.forget_vertex_array(handle);
      return Err(e);
    }

    trace!("new vertex array {}", handle);
    Ok(handle)
  }

  unsafe fn delete_array_object(&mut self, array_object: u32) -> Result<(), Error> {
    gl::DeleteVertexArrays(1, &array_object);
    self.state.forget_vertex_array(array_object);

    Ok(())
  }

  unsafe fn bind_array_object(&mut self, array_object: u32) -> Result<(), Error> {
    self.state.bind_vertex_array(array_object, Bind::Cached);
    Ok(())
  }

  unsafe fn enable_attribute_array(
    &mut self,
    location: u32,
    buffer: u32,
    layout: &AttributeLayout,
  ) -> Result<(), Error> {
    // attribute pointers source from the array buffer binding; restore it afterwards
    let previous = self.state.array_buffer();
    self.state.bind_array_buffer(buffer, Bind::Cached);

    let components = layout.components as GLint;
    let ty = scalar_type_to_gl(layout.scalar_type);
    let stride = layout.stride as GLsizei;
    let offset = layout.offset as *const c_void;

    match layout.kind {
      AttributeKind::FloatingPoint { normalized } => {
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        gl::VertexAttribPointer(location, components, ty, normalized, stride, offset);
      }

      AttributeKind::Integral => {
        gl::VertexAttribIPointer(location, components, ty, stride, offset);
      }
    }

    gl::EnableVertexAttribArray(location);
    gl::VertexAttribDivisor(location, layout.divisor);

    self.state.bind_array_buffer(previous, Bind::Cached);

    check_errors("enable vertex attribute")
  }

  unsafe fn disable_attribute_array(&mut self, location: u32) -> Result<(), Error> {
    gl::DisableVertexAttribArray(location);
    check_errors("disable vertex attribute")
  }
}
