//! Resource handles.
//!
//! Every GPU-side object (buffers, array objects, shaders, programs, textures, framebuffers and
//! renderbuffers) is represented by a [`Handle`]. A handle carries the name the driver gave to the
//! object and a _deleted_ flag shared by every clone of the handle. Once an object is deleted,
//! every operation taking it fails with [`Error::ResourceDeleted`].
//!
//! Handles compare by identity: two handles are equal only if they come from the same allocation,
//! even if the driver reuses a name after a deletion.

use crate::error::Error;
use std::{
  fmt,
  hash::{Hash, Hasher},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

/// Kind of GPU resource.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKind {
  /// Array buffer (vertex data).
  ArrayBuffer,
  /// Index buffer.
  IndexBuffer,
  /// Array object.
  ArrayObject,
  /// Shader.
  Shader,
  /// Linked program.
  Program,
  /// Texture (2D or cube).
  Texture,
  /// Framebuffer.
  Framebuffer,
  /// Renderbuffer.
  Renderbuffer,
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ResourceKind::ArrayBuffer => f.write_str("array buffer"),
      ResourceKind::IndexBuffer => f.write_str("index buffer"),
      ResourceKind::ArrayObject => f.write_str("array object"),
      ResourceKind::Shader => f.write_str("shader"),
      ResourceKind::Program => f.write_str("program"),
      ResourceKind::Texture => f.write_str("texture"),
      ResourceKind::Framebuffer => f.write_str("framebuffer"),
      ResourceKind::Renderbuffer => f.write_str("renderbuffer"),
    }
  }
}

#[derive(Debug)]
struct HandleInner {
  id: u32,
  kind: ResourceKind,
  deleted: AtomicBool,
}

/// Handle to a GPU resource.
#[derive(Clone)]
pub struct Handle {
  inner: Arc<HandleInner>,
}

impl Handle {
  pub(crate) fn new(kind: ResourceKind, id: u32) -> Self {
    let inner = Arc::new(HandleInner {
      id,
      kind,
      deleted: AtomicBool::new(false),
    });

    Handle { inner }
  }

  /// Name of the object, as given by the driver.
  #[inline]
  pub fn id(&self) -> u32 {
    self.inner.id
  }

  /// Kind of the object.
  #[inline]
  pub fn kind(&self) -> ResourceKind {
    self.inner.kind
  }

  /// Whether the object has been deleted.
  #[inline]
  pub fn is_deleted(&self) -> bool {
    self.inner.deleted.load(Ordering::Acquire)
  }

  /// Fail with [`Error::ResourceDeleted`] if the object has been deleted.
  pub fn check_not_deleted(&self) -> Result<(), Error> {
    if self.is_deleted() {
      Err(Error::deleted(self.kind(), self.id()))
    } else {
      Ok(())
    }
  }

  /// Flip the deleted flag.
  ///
  /// Fails if the object was already deleted.
  pub(crate) fn mark_deleted(&self) -> Result<(), Error> {
    if self.inner.deleted.swap(true, Ordering::AcqRel) {
      Err(Error::deleted(self.kind(), self.id()))
    } else {
      Ok(())
    }
  }
}

impl PartialEq for Handle {
  fn eq(&self, rhs: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &rhs.inner)
  }
}

impl Eq for Handle {}

impl Hash for Handle {
  fn hash<H>(&self, state: &mut H)
  where
    H: Hasher,
  {
    self.inner.kind.hash(state);
    self.inner.id.hash(state);
  }
}

impl fmt::Debug for Handle {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Handle")
      .field("kind", &self.kind())
      .field("id", &self.id())
      .field("deleted", &self.is_deleted())
      .finish()
  }
}

/// Types backed by a GPU resource.
pub trait Resource {
  /// Handle of the resource.
  fn handle(&self) -> &Handle;

  /// Whether the resource has been deleted.
  fn is_deleted(&self) -> bool {
    self.handle().is_deleted()
  }
}

impl Resource for Handle {
  fn handle(&self) -> &Handle {
    self
  }
}

/// Implement [`Resource`] for a type with a `handle` field.
macro_rules! impl_Resource {
  ($t:ty) => {
    impl $crate::handle::Resource for $t {
      fn handle(&self) -> &$crate::handle::Handle {
        &self.handle
      }
    }
  };
}

pub(crate) use impl_Resource;
