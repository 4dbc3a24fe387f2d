//! # What is this?
//!
//! penumbra is a checked layer over OpenGL 3.3. It does not hide OpenGL behind a different
//! rendering model: it keeps OpenGL objects and operations, and makes the mistakes OpenGL lets
//! through silently fail loudly instead.
//!
//! - Every object (buffers, array objects, shaders, programs, textures, framebuffers and
//!   renderbuffers) is a typed [`Handle`](handle::Handle). Once deleted, every use of it fails
//!   with [`Error::ResourceDeleted`](error::Error::ResourceDeleted) rather than reaching the
//!   driver with a stale name.
//! - The [`Context`](context::Context) tracks what is bound. Binding a texture that is also an
//!   attachment of the framebuffer bound for drawing, drawing without an active program or with a
//!   deleted buffer, blitting a framebuffer onto itself: all of these are caught before the
//!   driver sees them.
//! - Limits reported by the driver are [validated](capabilities) before being used.
//! - Uniforms and attributes are checked against the types reflected from the linked program,
//!   and [`CheckedExecution`](execution::CheckedExecution) refuses to draw until every one of them
//!   has been assigned.
//!
//! # Backends
//!
//! penumbra does not talk to a driver itself. It drives a backend implementing the traits of the
//! [`backend`] module, which receives requests that have already been validated. Backends live in
//! their own crates:
//!
//! - `penumbra-gl`, over OpenGL 3.3 core.
//! - `penumbra-fake`, an in-memory implementation suited for tests and headless environments.
//!
//! # Threads
//!
//! A context is current on at most one thread and is not [`Send`]. Decoding resources on other
//! threads and uploading them on a thread owning a context is what the [`loader`] module does.

pub mod array_object;
pub mod backend;
pub mod blending;
pub mod buffer;
pub mod capabilities;
pub mod context;
pub mod cursor;
pub mod depth_test;
pub mod descriptor;
pub mod draw;
pub mod error;
pub mod execution;
pub mod face_culling;
pub mod framebuffer;
pub mod handle;
pub mod loader;
pub mod reload;
pub mod render_state;
pub mod scalar;
pub mod shader;
pub mod stencil;
pub mod texture;
pub mod texture_unit;

pub use crate::context::{Context, ContextOpt};
pub use crate::error::Error;
