//! Graphics contexts.
//!
//! A [`Context`] wraps a backend and tracks everything the driver would otherwise track
//! implicitly: which objects are bound, which program is active and which limits the
//! implementation has. Every operation of the crate is a method of [`Context`], spread over the
//! modules of the concern it belongs to.
//!
//! A context is current on at most one thread at a time, and a thread has at most one current
//! context. Operations on a context that is not current on the calling thread fail with
//! [`Error::ContextNotCurrent`]. Contexts are not [`Send`]: move the backend to a thread and create
//! the context there instead.

use crate::array_object::ArrayObject;
use crate::backend::Backend;
use crate::buffer::ArrayBuffer;
use crate::capabilities::{Capabilities, DEFAULT_CEILING};
use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::shader::Program;
use crate::texture::BoundTexture;
use log::{debug, warn};
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local!(static CURRENT_CONTEXT: Cell<Option<u64>> = Cell::new(None));

/// Context options.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ContextOpt {
  strict_array_objects: bool,
  capability_ceiling: u32,
}

impl Default for ContextOpt {
  /// Defaults:
  ///
  /// - `strict_array_objects`: `false`
  /// - `capability_ceiling`: `1024`
  fn default() -> Self {
    ContextOpt {
      strict_array_objects: false,
      capability_ceiling: DEFAULT_CEILING,
    }
  }
}

impl ContextOpt {
  /// Make array object builders reject the assignment of an already assigned location instead of
  /// replacing it.
  #[inline]
  pub fn set_strict_array_objects(self, strict_array_objects: bool) -> Self {
    ContextOpt {
      strict_array_objects,
      ..self
    }
  }

  /// Whether array object builders are strict.
  #[inline]
  pub fn strict_array_objects(&self) -> bool {
    self.strict_array_objects
  }

  /// Ceiling reported counts are clamped to.
  #[inline]
  pub fn set_capability_ceiling(self, capability_ceiling: u32) -> Self {
    ContextOpt {
      capability_ceiling,
      ..self
    }
  }

  /// Ceiling reported counts are clamped to.
  #[inline]
  pub fn capability_ceiling(&self) -> u32 {
    self.capability_ceiling
  }
}

/// What a context has bound.
#[derive(Debug)]
pub(crate) struct BindingState {
  pub(crate) array_buffer: Option<ArrayBuffer>,
  pub(crate) array_object: ArrayObject,
  pub(crate) default_array_object: ArrayObject,
  pub(crate) program: Option<Program>,
  pub(crate) draw_framebuffer: Option<Framebuffer>,
  pub(crate) read_framebuffer: Option<Framebuffer>,
  pub(crate) texture_units: Vec<Option<BoundTexture>>,
}

impl BindingState {
  fn new(capabilities: &Capabilities) -> Self {
    let default_array_object = ArrayObject::default_object(capabilities.max_vertex_attribs());

    BindingState {
      array_buffer: None,
      array_object: default_array_object.clone(),
      default_array_object,
      program: None,
      draw_framebuffer: None,
      read_framebuffer: None,
      texture_units: vec![None; capabilities.texture_units() as usize],
    }
  }
}

/// A graphics context.
#[derive(Debug)]
pub struct Context<B> {
  pub(crate) backend: B,
  id: u64,
  share_group: u64,
  opt: ContextOpt,
  capabilities: Capabilities,
  pub(crate) state: BindingState,
  _not_send: PhantomData<*const ()>,
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Create a context and make it current on the calling thread.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::NonCompliantImplementation`] if the implementation reports a limit below
  /// what OpenGL 3.3 requires.
  pub fn new(backend: B, opt: ContextOpt) -> Result<Self, Error> {
    let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
    Self::with_share_group(backend, opt, id, id)
  }

  /// Create a context sharing its resources with `other`, and make it current on the calling
  /// thread.
  ///
  /// Binding state is never shared.
  pub fn new_shared(other: &Self, backend: B, opt: ContextOpt) -> Result<Self, Error> {
    let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
    Self::with_share_group(backend, opt, id, other.share_group)
  }

  fn with_share_group(
    mut backend: B,
    opt: ContextOpt,
    id: u64,
    share_group: u64,
  ) -> Result<Self, Error> {
    unsafe { backend.make_current()? };

    let capabilities = match Capabilities::query(&mut backend, opt.capability_ceiling()) {
      Ok(capabilities) => capabilities,
      Err(e) => {
        if let Err(release) = unsafe { backend.release_current() } {
          warn!("cannot release context {}: {}", id, release);
        }

        return Err(e);
      }
    };

    CURRENT_CONTEXT.with(|current| current.set(Some(id)));
    debug!("created context {} (share group {})", id, share_group);

    Ok(Context {
      backend,
      id,
      share_group,
      opt,
      capabilities,
      state: BindingState::new(&capabilities),
      _not_send: PhantomData,
    })
  }

  /// Make the context current on the calling thread.
  pub fn make_current(&mut self) -> Result<(), Error> {
    unsafe { self.backend.make_current()? };
    CURRENT_CONTEXT.with(|current| current.set(Some(self.id)));

    Ok(())
  }

  /// Release the context from the calling thread.
  pub fn release_current(&mut self) -> Result<(), Error> {
    self.check_current()?;

    unsafe { self.backend.release_current()? };
    CURRENT_CONTEXT.with(|current| current.set(None));

    Ok(())
  }

  /// Context information: vendor.
  pub fn vendor(&self) -> Result<String, Error> {
    self.check_current()?;
    self.backend.backend_author()
  }

  /// Context information: renderer.
  pub fn renderer(&self) -> Result<String, Error> {
    self.check_current()?;
    self.backend.backend_name()
  }

  /// Context information: version.
  pub fn version(&self) -> Result<String, Error> {
    self.check_current()?;
    self.backend.backend_version()
  }

  /// Context information: shading language version.
  pub fn shading_language_version(&self) -> Result<String, Error> {
    self.check_current()?;
    self.backend.backend_shading_lang_version()
  }
}

impl<B> Context<B> {
  /// Unique identifier of the context.
  pub fn id(&self) -> u64 {
    self.id
  }

  /// Whether the context is current on the calling thread.
  pub fn is_current(&self) -> bool {
    CURRENT_CONTEXT.with(|current| current.get() == Some(self.id))
  }

  /// Whether resources created with `other` can be used with this context.
  pub fn is_shared_with(&self, other: &Self) -> bool {
    self.share_group == other.share_group
  }

  /// Options the context was created with.
  pub fn opt(&self) -> &ContextOpt {
    &self.opt
  }

  /// Validated limits of the implementation.
  pub fn capabilities(&self) -> &Capabilities {
    &self.capabilities
  }

  /// Access the backend.
  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Access the backend mutably.
  ///
  /// Changing bindings behind the context’s back makes its tracked state wrong.
  pub fn backend_mut(&mut self) -> &mut B {
    &mut self.backend
  }

  pub(crate) fn check_current(&self) -> Result<(), Error> {
    if self.is_current() {
      Ok(())
    } else {
      Err(Error::ContextNotCurrent)
    }
  }
}

impl<B> Drop for Context<B> {
  fn drop(&mut self) {
    CURRENT_CONTEXT.with(|current| {
      if current.get() == Some(self.id) {
        current.set(None);
      }
    });

    debug!("dropped context {}", self.id);
  }
}
