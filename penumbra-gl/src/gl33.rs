//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 core backend for penumbra. The backend type is [`GL33`].

mod array_object;
mod buffer;
mod draw;
pub mod enums;
mod framebuffer;
mod query;
mod render_state;
mod shader;
mod state;
mod texture;

pub use self::enums::GlEnumError;
pub use self::state::{GLState, StateQueryError};

use log::{debug, error};
use penumbra::error::Error;
use std::fmt;
use std::os::raw::c_void;

/// The windowing side of an OpenGL context.
///
/// Implemented by whatever owns the actual context (a window, a pbuffer, an offscreen surface).
pub trait Surface {
  /// Error reported by the windowing system.
  type Err: fmt::Display;

  /// Make the context of the surface current on the calling thread.
  fn make_current(&mut self) -> Result<(), Self::Err>;

  /// Release the context of the surface from the calling thread.
  fn release_current(&mut self) -> Result<(), Self::Err>;

  /// Address of an OpenGL function; null if unavailable.
  fn get_proc_address(&mut self, symbol: &str) -> *const c_void;
}

/// An OpenGL 3.3 backend.
///
/// This type is to be used as a penumbra backend type. It implements every backend trait.
#[derive(Debug)]
pub struct GL33<S> {
  surface: S,
  pub(crate) state: GLState,
}

impl<S> GL33<S>
where
  S: Surface,
{
  /// Create a new OpenGL 3.3 backend.
  ///
  /// The context of the surface is made current on the calling thread and OpenGL functions are
  /// loaded from it.
  pub fn new(mut surface: S) -> Result<Self, Error> {
    surface
      .make_current()
      .map_err(|e| Error::driver(format!("cannot make the surface current: {}", e)))?;

    gl::load_with(|symbol| surface.get_proc_address(symbol));

    let state = GLState::from_context()?;
    debug!("created OpenGL 3.3 backend");

    Ok(GL33 { surface, state })
  }
}

impl<S> GL33<S> {
  /// The surface the backend draws to.
  pub fn surface(&self) -> &S {
    &self.surface
  }

  /// The surface the backend draws to, mutably.
  pub fn surface_mut(&mut self) -> &mut S {
    &mut self.surface
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// Changing OpenGL state without going through the backend makes its caches wrong; call
  /// [`GLState::invalidate`] afterwards.
  pub unsafe fn state(&mut self) -> &mut GLState {
    &mut self.state
  }
}

/// Drain the OpenGL error queue, failing with the first error found.
pub(crate) unsafe fn check_errors(operation: &str) -> Result<(), Error> {
  let mut first = None;

  loop {
    let e = gl::GetError();

    if e == gl::NO_ERROR {
      break;
    }

    error!("{}: OpenGL error {:#x}", operation, e);
    first.get_or_insert(e);
  }

  match first {
    None => Ok(()),
    Some(e) => Err(Error::driver(format!(
      "{}: {}",
      operation,
      error_name(e)
    ))),
  }
}

fn error_name(e: gl::types::GLenum) -> String {
  match e {
    gl::INVALID_ENUM => "invalid enum".to_owned(),
    gl::INVALID_VALUE => "invalid value".to_owned(),
    gl::INVALID_OPERATION => "invalid operation".to_owned(),
    gl::INVALID_FRAMEBUFFER_OPERATION => "invalid framebuffer operation".to_owned(),
    gl::OUT_OF_MEMORY => "out of memory".to_owned(),
    _ => format!("error {:#x}", e),
  }
}
