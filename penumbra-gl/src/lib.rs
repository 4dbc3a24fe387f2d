//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for penumbra. A backend
//! wraps a [`Surface`](gl33::Surface), the windowing side of a context, and turns the requests of
//! a [`penumbra::Context`] into driver calls.
//!
//! ```ignore
//! let backend = GL33::new(surface)?;
//! let mut ctx = Context::new(backend, ContextOpt::default())?;
//! ```

#[cfg(feature = "gl33")]
pub mod gl33;

#[cfg(feature = "gl33")]
pub use gl33::{GlEnumError, StateQueryError, Surface, GL33};
