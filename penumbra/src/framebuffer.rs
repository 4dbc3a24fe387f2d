//! Framebuffers and renderbuffers.
//!
//! A [`Framebuffer`] is described by a [`FramebufferBuilder`]: color attachments are keyed by a
//! [`ColorAttachmentPoint`] and routed to a [`DrawBuffer`], both obtained from the context. There
//! is at most one depth attachment or one combined depth-stencil attachment, never both.
//! Attaching at an occupied point replaces what was attached there.
//!
//! Allocating a framebuffer binds it for drawing and checks its completeness; an incomplete
//! framebuffer is deleted right away and reported with its [`FramebufferStatus`].

use crate::backend::framebuffer::Framebuffer as _;
use crate::backend::Backend;
use crate::context::Context;
use crate::error::Error;
use crate::handle::{impl_Resource, Handle, Resource, ResourceKind};
use crate::texture::{Area, CubeFace, Texture2D, TextureCube, TextureFormat};
use log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A color attachment point.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ColorAttachmentPoint {
  index: u32,
}

impl ColorAttachmentPoint {
  /// Index of the point (`GL_COLOR_ATTACHMENT0 + index`).
  pub fn index(&self) -> u32 {
    self.index
  }
}

/// A draw buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DrawBuffer {
  index: u32,
}

impl DrawBuffer {
  /// Index of the draw buffer (fragment shader output location).
  pub fn index(&self) -> u32 {
    self.index
  }
}

/// Renderbuffer storage format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RenderbufferFormat {
  /// 8-bit normalized red, green, blue.
  RGB8,
  /// 8-bit normalized red, green, blue, alpha.
  RGBA8,
  /// 24-bit depth.
  Depth24,
  /// 24-bit depth, 8-bit stencil.
  Depth24Stencil8,
}

impl RenderbufferFormat {
  /// Whether the format can be attached as a color attachment.
  pub fn is_color_renderable(self) -> bool {
    matches!(self, RenderbufferFormat::RGB8 | RenderbufferFormat::RGBA8)
  }

  /// Whether the format can be attached as a depth attachment.
  pub fn is_depth_renderable(self) -> bool {
    self == RenderbufferFormat::Depth24
  }

  /// Whether the format can be attached as a depth-stencil attachment.
  pub fn is_depth_stencil_renderable(self) -> bool {
    self == RenderbufferFormat::Depth24Stencil8
  }
}

/// Storage for a framebuffer attachment that cannot be sampled.
#[derive(Clone, Debug)]
pub struct Renderbuffer {
  handle: Handle,
  format: RenderbufferFormat,
  width: u32,
  height: u32,
}

impl_Resource!(Renderbuffer);

impl PartialEq for Renderbuffer {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for Renderbuffer {}

impl Renderbuffer {
  /// Storage format.
  pub fn format(&self) -> RenderbufferFormat {
    self.format
  }

  /// Width, in pixels.
  pub fn width(&self) -> u32 {
    self.width
  }

  /// Height, in pixels.
  pub fn height(&self) -> u32 {
    self.height
  }
}

/// Image attached to a framebuffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttachmentSource {
  /// A 2D texture.
  Texture2D(Texture2D),
  /// A face of a cube map.
  CubeFace(TextureCube, CubeFace),
  /// A renderbuffer.
  Renderbuffer(Renderbuffer),
}

impl AttachmentSource {
  /// Handle of the attached object.
  pub fn handle(&self) -> &Handle {
    match *self {
      AttachmentSource::Texture2D(ref t) => t.handle(),
      AttachmentSource::CubeFace(ref t, _) => t.handle(),
      AttachmentSource::Renderbuffer(ref r) => r.handle(),
    }
  }

  /// Whether the attached object is a texture.
  pub fn is_texture(&self) -> bool {
    !matches!(*self, AttachmentSource::Renderbuffer(_))
  }
}

/// A color attachment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColorAttachment {
  /// Attachment point.
  pub point: ColorAttachmentPoint,
  /// Draw buffer the attachment is rendered to through.
  pub draw_buffer: DrawBuffer,
  /// Attached image.
  pub source: AttachmentSource,
}

/// The depth or depth-stencil attachment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DepthAttachment {
  /// Depth only.
  Depth(AttachmentSource),
  /// Combined depth and stencil.
  DepthStencil(AttachmentSource),
}

impl DepthAttachment {
  /// Attached image.
  pub fn source(&self) -> &AttachmentSource {
    match *self {
      DepthAttachment::Depth(ref s) | DepthAttachment::DepthStencil(ref s) => s,
    }
  }
}

/// Description of a framebuffer.
#[derive(Debug)]
pub struct FramebufferBuilder {
  max_color_attachments: u32,
  max_draw_buffers: u32,
  colors: BTreeMap<ColorAttachmentPoint, ColorAttachment>,
  depth: Option<DepthAttachment>,
}

impl FramebufferBuilder {
  fn new(max_color_attachments: u32, max_draw_buffers: u32) -> Self {
    FramebufferBuilder {
      max_color_attachments,
      max_draw_buffers,
      colors: BTreeMap::new(),
      depth: None,
    }
  }

  /// Color attachments, by attachment point.
  pub fn color_attachments(&self) -> impl Iterator<Item = &ColorAttachment> {
    self.colors.values()
  }

  /// Color attachment at a point, if any.
  pub fn color_attachment(&self, point: ColorAttachmentPoint) -> Option<&ColorAttachment> {
    self.colors.get(&point)
  }

  /// Depth or depth-stencil attachment, if any.
  pub fn depth_attachment(&self) -> Option<&DepthAttachment> {
    self.depth.as_ref()
  }

  /// Attach a 2D texture at a color attachment point.
  pub fn attach_color_texture_2d_at(
    &mut self,
    point: ColorAttachmentPoint,
    draw_buffer: DrawBuffer,
    texture: &Texture2D,
  ) -> Result<(), Error> {
    check_color_format(texture.format())?;
    self.attach_color(point, draw_buffer, AttachmentSource::Texture2D(texture.clone()))
  }

  /// Attach a face of a cube map at a color attachment point.
  pub fn attach_color_texture_cube_at(
    &mut self,
    point: ColorAttachmentPoint,
    draw_buffer: DrawBuffer,
    texture: &TextureCube,
    face: CubeFace,
  ) -> Result<(), Error> {
    check_color_format(texture.format())?;
    self.attach_color(
      point,
      draw_buffer,
      AttachmentSource::CubeFace(texture.clone(), face),
    )
  }

  /// Attach a renderbuffer at a color attachment point.
  pub fn attach_color_renderbuffer_at(
    &mut self,
    point: ColorAttachmentPoint,
    draw_buffer: DrawBuffer,
    renderbuffer: &Renderbuffer,
  ) -> Result<(), Error> {
    if !renderbuffer.format.is_color_renderable() {
      return Err(Error::constraint(format!(
        "renderbuffer format {:?} is not color-renderable",
        renderbuffer.format
      )));
    }

    self.attach_color(
      point,
      draw_buffer,
      AttachmentSource::Renderbuffer(renderbuffer.clone()),
    )
  }

  fn attach_color(
    &mut self,
    point: ColorAttachmentPoint,
    draw_buffer: DrawBuffer,
    source: AttachmentSource,
  ) -> Result<(), Error> {
    source.handle().check_not_deleted()?;

    if point.index >= self.max_color_attachments {
      return Err(Error::range(
        point.index as usize,
        self.max_color_attachments as usize,
      ));
    }

    if draw_buffer.index >= self.max_draw_buffers {
      return Err(Error::range(
        draw_buffer.index as usize,
        self.max_draw_buffers as usize,
      ));
    }

    if let Some(other) = self
      .colors
      .values()
      .find(|c| c.draw_buffer == draw_buffer && c.point != point)
    {
      return Err(Error::constraint(format!(
        "draw buffer {} is already mapped to color attachment {}",
        draw_buffer.index, other.point.index
      )));
    }

    trace!(
      "attach {} {} at color {} (draw buffer {})",
      source.handle().kind(),
      source.handle().id(),
      point.index,
      draw_buffer.index
    );

    self.colors.insert(
      point,
      ColorAttachment {
        point,
        draw_buffer,
        source,
      },
    );

    Ok(())
  }

  /// Attach a 2D texture as the depth attachment, replacing any depth or depth-stencil attachment.
  pub fn attach_depth_texture_2d(&mut self, texture: &Texture2D) -> Result<(), Error> {
    texture.handle().check_not_deleted()?;

    if !texture.format().is_depth_renderable() {
      return Err(Error::constraint(format!(
        "texture format {:?} is not depth-renderable",
        texture.format()
      )));
    }

    self.depth = Some(DepthAttachment::Depth(AttachmentSource::Texture2D(
      texture.clone(),
    )));
    Ok(())
  }

  /// Attach a renderbuffer as the depth attachment, replacing any depth or depth-stencil
  /// attachment.
  pub fn attach_depth_renderbuffer(&mut self, renderbuffer: &Renderbuffer) -> Result<(), Error> {
    renderbuffer.handle().check_not_deleted()?;

    if !renderbuffer.format.is_depth_renderable() {
      return Err(Error::constraint(format!(
        "renderbuffer format {:?} is not depth-renderable",
        renderbuffer.format
      )));
    }

    self.depth = Some(DepthAttachment::Depth(AttachmentSource::Renderbuffer(
      renderbuffer.clone(),
    )));
    Ok(())
  }

  /// Attach a 2D texture as the depth-stencil attachment, replacing any depth or depth-stencil
  /// attachment.
  pub fn attach_depth_stencil_texture_2d(&mut self, texture: &Texture2D) -> Result<(), Error> {
    texture.handle().check_not_deleted()?;

    if !texture.format().is_depth_stencil_renderable() {
      return Err(Error::constraint(format!(
        "texture format {:?} is not depth-stencil-renderable",
        texture.format()
      )));
    }

    self.depth = Some(DepthAttachment::DepthStencil(AttachmentSource::Texture2D(
      texture.clone(),
    )));
    Ok(())
  }

  /// Attach a renderbuffer as the depth-stencil attachment, replacing any depth or depth-stencil
  /// attachment.
  pub fn attach_depth_stencil_renderbuffer(
    &mut self,
    renderbuffer: &Renderbuffer,
  ) -> Result<(), Error> {
    renderbuffer.handle().check_not_deleted()?;

    if !renderbuffer.format.is_depth_stencil_renderable() {
      return Err(Error::constraint(format!(
        "renderbuffer format {:?} is not depth-stencil-renderable",
        renderbuffer.format
      )));
    }

    self.depth = Some(DepthAttachment::DepthStencil(
      AttachmentSource::Renderbuffer(renderbuffer.clone()),
    ));
    Ok(())
  }

  /// Remove the depth or depth-stencil attachment.
  pub fn detach_depth(&mut self) {
    self.depth = None;
  }

  /// Remove the color attachment at a point.
  pub fn detach_color_attachment(&mut self, point: ColorAttachmentPoint) {
    self.colors.remove(&point);
  }

  fn check_references(&self) -> Result<(), Error> {
    for color in self.colors.values() {
      color.source.handle().check_not_deleted()?;
    }

    if let Some(ref depth) = self.depth {
      depth.source().handle().check_not_deleted()?;
    }

    Ok(())
  }
}

fn check_color_format(format: TextureFormat) -> Result<(), Error> {
  if format.is_color_renderable() {
    Ok(())
  } else {
    Err(Error::constraint(format!(
      "texture format {:?} is not color-renderable",
      format
    )))
  }
}

/// An allocated framebuffer.
#[derive(Clone, Debug)]
pub struct Framebuffer {
  handle: Handle,
  colors: Arc<Vec<ColorAttachment>>,
  depth: Option<DepthAttachment>,
}

impl_Resource!(Framebuffer);

impl PartialEq for Framebuffer {
  fn eq(&self, rhs: &Self) -> bool {
    self.handle == rhs.handle
  }
}

impl Eq for Framebuffer {}

impl Framebuffer {
  /// Color attachments.
  pub fn color_attachments(&self) -> &[ColorAttachment] {
    &self.colors
  }

  /// Depth or depth-stencil attachment, if any.
  pub fn depth_attachment(&self) -> Option<&DepthAttachment> {
    self.depth.as_ref()
  }

  /// Whether the framebuffer has a depth or depth-stencil attachment.
  pub fn has_depth(&self) -> bool {
    self.depth.is_some()
  }

  /// Whether the framebuffer has a depth-stencil attachment.
  pub fn has_stencil(&self) -> bool {
    matches!(self.depth, Some(DepthAttachment::DepthStencil(_)))
  }

  /// Whether an object is attached to the framebuffer.
  pub fn attaches(&self, handle: &Handle) -> bool {
    self.colors.iter().any(|c| c.source.handle() == handle)
      || self
        .depth
        .as_ref()
        .map_or(false, |d| d.source().handle() == handle)
  }

  fn textures(&self) -> impl Iterator<Item = &Handle> {
    self
      .colors
      .iter()
      .map(|c| &c.source)
      .chain(self.depth.as_ref().map(DepthAttachment::source))
      .filter(|s| s.is_texture())
      .map(AttachmentSource::handle)
  }
}

/// Completeness of a framebuffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FramebufferStatus {
  /// The framebuffer can be rendered to.
  Complete,
  /// The default framebuffer does not exist.
  Undefined,
  /// An attachment is not complete.
  IncompleteAttachment,
  /// There is no attachment.
  IncompleteMissingAttachment,
  /// A draw buffer has no attachment.
  IncompleteDrawBuffer,
  /// The read buffer has no attachment.
  IncompleteReadBuffer,
  /// The combination of formats is not supported.
  Unsupported,
  /// Attachments do not have the same number of samples.
  IncompleteMultisample,
  /// Attachments are not all layered.
  IncompleteLayerTargets,
  /// Status the backend did not recognize.
  Unknown(u32),
}

impl fmt::Display for FramebufferStatus {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      FramebufferStatus::Complete => f.write_str("complete"),
      FramebufferStatus::Undefined => f.write_str("undefined"),
      FramebufferStatus::IncompleteAttachment => f.write_str("incomplete attachment"),
      FramebufferStatus::IncompleteMissingAttachment => f.write_str("missing attachment"),
      FramebufferStatus::IncompleteDrawBuffer => f.write_str("incomplete draw buffer"),
      FramebufferStatus::IncompleteReadBuffer => f.write_str("incomplete read buffer"),
      FramebufferStatus::Unsupported => f.write_str("unsupported"),
      FramebufferStatus::IncompleteMultisample => f.write_str("incomplete multisample"),
      FramebufferStatus::IncompleteLayerTargets => f.write_str("incomplete layer targets"),
      FramebufferStatus::Unknown(status) => write!(f, "unknown status {:#x}", status),
    }
  }
}

/// Filter used when a blit scales.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BlitFilter {
  /// Nearest pixel.
  Nearest,
  /// Linear interpolation.
  Linear,
}

/// A copy between the read framebuffer and the draw framebuffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BlitRegion {
  /// Area of the read framebuffer.
  pub source: Area,
  /// Area of the draw framebuffer.
  pub target: Area,
  /// Copy color.
  pub color: bool,
  /// Copy depth.
  pub depth: bool,
  /// Copy stencil.
  pub stencil: bool,
  /// Filter.
  pub filter: BlitFilter,
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Every color attachment point available.
  pub fn framebuffer_color_attachment_points(&self) -> Vec<ColorAttachmentPoint> {
    (0..self.capabilities().max_color_attachments())
      .map(|index| ColorAttachmentPoint { index })
      .collect()
  }

  /// Every draw buffer available.
  pub fn framebuffer_draw_buffers(&self) -> Vec<DrawBuffer> {
    (0..self.capabilities().max_draw_buffers())
      .map(|index| DrawBuffer { index })
      .collect()
  }

  /// Start describing a framebuffer.
  pub fn framebuffer_new_builder(&self) -> FramebufferBuilder {
    FramebufferBuilder::new(
      self.capabilities().max_color_attachments(),
      self.capabilities().max_draw_buffers(),
    )
  }

  /// Create a framebuffer from a builder.
  ///
  /// The new framebuffer is left bound for drawing.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::FramebufferIncomplete`] if the driver reports the framebuffer as
  /// incomplete; the framebuffer is deleted and the default framebuffer bound for drawing.
  pub fn framebuffer_allocate(
    &mut self,
    builder: FramebufferBuilder,
  ) -> Result<Framebuffer, Error> {
    self.check_current()?;
    builder.check_references()?;

    let id = unsafe { self.backend.new_framebuffer(&builder)? };
    debug!("allocated framebuffer {}", id);

    let framebuffer = Framebuffer {
      handle: Handle::new(ResourceKind::Framebuffer, id),
      colors: Arc::new(builder.colors.into_iter().map(|(_, c)| c).collect()),
      depth: builder.depth,
    };

    self.state.draw_framebuffer = Some(framebuffer.clone());

    let status = unsafe { self.backend.framebuffer_status()? };

    if status == FramebufferStatus::Complete {
      return Ok(framebuffer);
    }

    debug!("framebuffer {} is {}", id, status);
    self.framebuffer_delete(&framebuffer)?;

    Err(Error::FramebufferIncomplete(status))
  }

  /// Bind a framebuffer for drawing.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if a texture attached to the framebuffer is bound
  /// to a texture unit.
  pub fn framebuffer_draw_bind(&mut self, framebuffer: &Framebuffer) -> Result<(), Error> {
    self.check_current()?;
    framebuffer.handle.check_not_deleted()?;

    for texture in framebuffer.textures() {
      let bound = self
        .state
        .texture_units
        .iter()
        .flatten()
        .any(|bound| bound.handle() == texture);

      if bound {
        return Err(Error::constraint(format!(
          "feedback loop: texture {} of framebuffer {} is bound to a texture unit",
          texture.id(),
          framebuffer.handle.id()
        )));
      }
    }

    unsafe { self.backend.bind_draw_framebuffer(framebuffer.handle.id())? };
    trace!("bind draw framebuffer {}", framebuffer.handle.id());
    self.state.draw_framebuffer = Some(framebuffer.clone());

    Ok(())
  }

  /// Bind the default framebuffer for drawing.
  pub fn framebuffer_draw_unbind(&mut self) -> Result<(), Error> {
    self.check_current()?;

    if self.state.draw_framebuffer.take().is_some() {
      unsafe { self.backend.bind_draw_framebuffer(0)? };
      trace!("unbind draw framebuffer");
    }

    Ok(())
  }

  /// Whether `framebuffer` is bound for drawing.
  pub fn framebuffer_draw_is_bound(&self, framebuffer: &Framebuffer) -> Result<bool, Error> {
    self.check_current()?;
    framebuffer.handle.check_not_deleted()?;

    Ok(self.state.draw_framebuffer.as_ref() == Some(framebuffer))
  }

  /// Framebuffer bound for drawing, if not the default one.
  pub fn framebuffer_draw_current(&self) -> Option<&Framebuffer> {
    self.state.draw_framebuffer.as_ref()
  }

  /// Bind a framebuffer for reading.
  pub fn framebuffer_read_bind(&mut self, framebuffer: &Framebuffer) -> Result<(), Error> {
    self.check_current()?;
    framebuffer.handle.check_not_deleted()?;

    unsafe { self.backend.bind_read_framebuffer(framebuffer.handle.id())? };
    trace!("bind read framebuffer {}", framebuffer.handle.id());
    self.state.read_framebuffer = Some(framebuffer.clone());

    Ok(())
  }

  /// Bind the default framebuffer for reading.
  pub fn framebuffer_read_unbind(&mut self) -> Result<(), Error> {
    self.check_current()?;

    if self.state.read_framebuffer.take().is_some() {
      unsafe { self.backend.bind_read_framebuffer(0)? };
      trace!("unbind read framebuffer");
    }

    Ok(())
  }

  /// Whether `framebuffer` is bound for reading.
  pub fn framebuffer_read_is_bound(&self, framebuffer: &Framebuffer) -> Result<bool, Error> {
    self.check_current()?;
    framebuffer.handle.check_not_deleted()?;

    Ok(self.state.read_framebuffer.as_ref() == Some(framebuffer))
  }

  /// Framebuffer bound for reading, if not the default one.
  pub fn framebuffer_read_current(&self) -> Option<&Framebuffer> {
    self.state.read_framebuffer.as_ref()
  }

  /// Copy a region of the read framebuffer to the draw framebuffer.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if the same framebuffer is bound for reading and
  /// drawing, if nothing is to be copied or if depth or stencil are copied with linear filtering.
  pub fn framebuffer_blit(&mut self, region: &BlitRegion) -> Result<(), Error> {
    self.check_current()?;

    for fb in self
      .state
      .draw_framebuffer
      .iter()
      .chain(self.state.read_framebuffer.iter())
    {
      fb.handle.check_not_deleted()?;
    }

    if self.state.draw_framebuffer == self.state.read_framebuffer {
      return Err(Error::constraint(
        "the draw and read framebuffers must be different",
      ));
    }

    if !(region.color || region.depth || region.stencil) {
      return Err(Error::constraint("a blit must copy at least one buffer"));
    }

    if (region.depth || region.stencil) && region.filter != BlitFilter::Nearest {
      return Err(Error::constraint(
        "depth and stencil blits require nearest filtering",
      ));
    }

    unsafe { self.backend.blit_framebuffer(region) }
  }

  /// Delete a framebuffer, unbinding it first if bound.
  ///
  /// Attached textures and renderbuffers are not deleted.
  pub fn framebuffer_delete(&mut self, framebuffer: &Framebuffer) -> Result<(), Error> {
    self.check_current()?;
    framebuffer.handle.check_not_deleted()?;

    if self.state.draw_framebuffer.as_ref() == Some(framebuffer) {
      self.framebuffer_draw_unbind()?;
    }

    if self.state.read_framebuffer.as_ref() == Some(framebuffer) {
      self.framebuffer_read_unbind()?;
    }

    unsafe { self.backend.delete_framebuffer(framebuffer.handle.id())? };
    debug!("delete framebuffer {}", framebuffer.handle.id());

    framebuffer.handle.mark_deleted()
  }

  /// Allocate a renderbuffer.
  pub fn renderbuffer_allocate(
    &mut self,
    format: RenderbufferFormat,
    width: u32,
    height: u32,
  ) -> Result<Renderbuffer, Error> {
    self.check_current()?;

    let max = self.capabilities().max_texture_size();

    for &(what, size) in &[("width", width), ("height", height)] {
      if size < 1 || size > max {
        return Err(Error::invalid_size(format!(
          "renderbuffer {} {} is not in [1, {}]",
          what, size, max
        )));
      }
    }

    let id = unsafe { self.backend.new_renderbuffer(format, width, height)? };
    debug!(
      "allocated renderbuffer {} {}×{} {:?}",
      id, width, height, format
    );

    Ok(Renderbuffer {
      handle: Handle::new(ResourceKind::Renderbuffer, id),
      format,
      width,
      height,
    })
  }

  /// Delete a renderbuffer.
  pub fn renderbuffer_delete(&mut self, renderbuffer: &Renderbuffer) -> Result<(), Error> {
    self.check_current()?;
    renderbuffer.handle.check_not_deleted()?;

    unsafe { self.backend.delete_renderbuffer(renderbuffer.handle.id())? };
    debug!("delete renderbuffer {}", renderbuffer.handle.id());

    renderbuffer.handle.mark_deleted()
  }

  pub(crate) fn framebuffer_draw_attaches(&self, handle: &Handle) -> bool {
    self
      .state
      .draw_framebuffer
      .as_ref()
      .map_or(false, |fb| fb.attaches(handle))
  }
}
