use crate::FakeBackend;
use log::trace;
use penumbra::array_object::{AttributeLayout, VertexAttribute};
use penumbra::backend::array_object::ArrayObject;
use penumbra::buffer::IndexBuffer;
use penumbra::error::Error;
use penumbra::handle::Resource as _;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub(crate) struct FakeArrayObject {
  pub(crate) index_buffer: Option<u32>,
  pub(crate) attributes: BTreeMap<u32, (u32, AttributeLayout)>,
}

impl FakeBackend {
  pub(crate) fn check_attribute_location(&self, location: u32) -> Result<(), Error> {
    let max = self.limits.max_vertex_attribs().max(0) as u32;

    if location < max {
      Ok(())
    } else {
      Err(Error::driver(format!(
        "attribute location {} out of {} locations",
        location, max
      )))
    }
  }
}

unsafe impl ArrayObject for FakeBackend {
  unsafe fn new_array_object(
    &mut self,
    index_buffer: Option<&IndexBuffer>,
    attributes: &[Option<VertexAttribute>],
  ) -> Result<u32, Error> {
    let mut fake = FakeArrayObject {
      index_buffer: index_buffer.map(|ib| ib.handle().id()),
      attributes: BTreeMap::new(),
    };

    for (location, attribute) in attributes.iter().enumerate() {
      if let Some(attribute) = attribute {
        let location = location as u32;
        self.check_attribute_location(location)?;
        fake
          .attributes
          .insert(location, (attribute.buffer().handle().id(), *attribute.layout()));
      }
    }

    let id = self.store.borrow_mut().gen_name();
    trace!(
      "fake: new array object {} ({} attributes)",
      id,
      fake.attributes.len()
    );

    self.state.array_objects.insert(id, fake);
    self.state.array_object = id;

    Ok(id)
  }

  unsafe fn delete_array_object(&mut self, array_object: u32) -> Result<(), Error> {
    if array_object == 0 {
      return Err(Error::driver("the default array object cannot be deleted"));
    }

    self
      .state
      .array_objects
      .remove(&array_object)
      .ok_or_else(|| Self::unknown("array object", array_object))?;

    if self.state.array_object == array_object {
      self.state.array_object = 0;
    }

    Ok(())
  }

  unsafe fn bind_array_object(&mut self, array_object: u32) -> Result<(), Error> {
    if !self.state.array_objects.contains_key(&array_object) {
      return Err(Self::unknown("array object", array_object));
    }

    self.state.array_object = array_object;
    Ok(())
  }

  unsafe fn enable_attribute_array(
    &mut self,
    location: u32,
    buffer: u32,
    layout: &AttributeLayout,
  ) -> Result<(), Error> {
    self.check_attribute_location(location)?;

    if !self.store.borrow().buffers.contains_key(&buffer) {
      return Err(Self::unknown("buffer", buffer));
    }

    let bound = self.state.array_object;
    if let Some(fake) = self.state.array_objects.get_mut(&bound) {
      fake.attributes.insert(location, (buffer, *layout));
    }

    Ok(())
  }

  unsafe fn disable_attribute_array(&mut self, location: u32) -> Result<(), Error> {
    self.check_attribute_location(location)?;

    let bound = self.state.array_object;
    if let Some(fake) = self.state.array_objects.get_mut(&bound) {
      fake.attributes.remove(&location);
    }

    Ok(())
  }
}
