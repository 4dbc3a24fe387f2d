//! Backend interfacing.
//!
//! A backend is the driver-facing side of penumbra: it turns the already validated requests of a
//! [`Context`](crate::context::Context) into driver calls. Backends never validate lifecycles nor
//! bindings themselves; they are handed driver names of live objects only.
//!
//! Each concern has its own trait. [`Backend`] gathers them all and is implemented automatically.

pub mod array_object;
pub mod buffer;
pub mod context;
pub mod draw;
pub mod framebuffer;
pub mod query;
pub mod render_state;
pub mod shader;
pub mod texture;

/// Every backend trait.
pub trait Backend:
  context::ContextBackend
  + query::Query
  + buffer::Buffer
  + array_object::ArrayObject
  + shader::Shader
  + texture::Texture
  + framebuffer::Framebuffer
  + render_state::RenderState
  + draw::Draw
{
}

impl<B> Backend for B where
  B: context::ContextBackend
    + query::Query
    + buffer::Buffer
    + array_object::ArrayObject
    + shader::Shader
    + texture::Texture
    + framebuffer::Framebuffer
    + render_state::RenderState
    + draw::Draw
{
}
