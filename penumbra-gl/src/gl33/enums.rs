//! Conversions between penumbra types and OpenGL enums.
//!
//! Values read back from the driver go through the `*_from_gl` functions, which reject enums they
//! do not know with a [`GlEnumError`].

use gl::types::*;
use penumbra::blending::{Equation, Factor};
use penumbra::buffer::{IndexType, UsageHint};
use penumbra::depth_test::DepthComparison;
use penumbra::draw::Primitive;
use penumbra::error::Error;
use penumbra::face_culling::{FaceCullingMode, FaceWinding};
use penumbra::framebuffer::{BlitFilter, FramebufferStatus, RenderbufferFormat};
use penumbra::render_state::{LogicOp, PolygonMode};
use penumbra::scalar::ScalarType;
use penumbra::shader::{ShaderStage, ShaderType};
use penumbra::stencil::{StencilComparison, StencilOperation};
use penumbra::texture::{
  CubeFace, ImageTarget, MagFilter, MinFilter, TextureFormat, TextureTarget, TextureWrap,
};
use std::error;
use std::fmt;

/// An OpenGL enum that does not map to any value of the expected kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GlEnumError {
  kind: &'static str,
  value: GLenum,
}

impl GlEnumError {
  fn new(kind: &'static str, value: GLenum) -> Self {
    GlEnumError { kind, value }
  }

  /// What the enum was expected to be.
  pub fn kind(&self) -> &'static str {
    self.kind
  }

  /// The rejected value.
  pub fn value(&self) -> GLenum {
    self.value
  }
}

impl fmt::Display for GlEnumError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "unknown {}: {:#x}", self.kind, self.value)
  }
}

impl error::Error for GlEnumError {}

impl From<GlEnumError> for Error {
  fn from(e: GlEnumError) -> Self {
    Error::driver(e.to_string())
  }
}

// Both directions of a one-to-one mapping.
macro_rules! gl_enum {
  ($kind:literal, $t:ident, $to_gl:ident, $from_gl:ident, { $($v:ident => $e:path),* $(,)? }) => {
    pub fn $to_gl(value: $t) -> GLenum {
      match value {
        $($t::$v => $e),*
      }
    }

    pub fn $from_gl(value: GLenum) -> Result<$t, GlEnumError> {
      match value {
        $($e => Ok($t::$v),)*
        _ => Err(GlEnumError::new($kind, value)),
      }
    }
  };
}

gl_enum!("usage hint", UsageHint, usage_hint_to_gl, usage_hint_from_gl, {
  StreamDraw => gl::STREAM_DRAW,
  StreamRead => gl::STREAM_READ,
  StreamCopy => gl::STREAM_COPY,
  StaticDraw => gl::STATIC_DRAW,
  StaticRead => gl::STATIC_READ,
  StaticCopy => gl::STATIC_COPY,
  DynamicDraw => gl::DYNAMIC_DRAW,
  DynamicRead => gl::DYNAMIC_READ,
  DynamicCopy => gl::DYNAMIC_COPY,
});

gl_enum!("scalar type", ScalarType, scalar_type_to_gl, scalar_type_from_gl, {
  Byte => gl::BYTE,
  UnsignedByte => gl::UNSIGNED_BYTE,
  Short => gl::SHORT,
  UnsignedShort => gl::UNSIGNED_SHORT,
  Int => gl::INT,
  UnsignedInt => gl::UNSIGNED_INT,
  HalfFloat => gl::HALF_FLOAT,
  Float => gl::FLOAT,
});

gl_enum!("primitive", Primitive, primitive_to_gl, primitive_from_gl, {
  Points => gl::POINTS,
  Lines => gl::LINES,
  LineStrip => gl::LINE_STRIP,
  LineLoop => gl::LINE_LOOP,
  Triangles => gl::TRIANGLES,
  TriangleStrip => gl::TRIANGLE_STRIP,
  TriangleFan => gl::TRIANGLE_FAN,
});

gl_enum!("texture wrap", TextureWrap, wrap_to_gl, wrap_from_gl, {
  ClampToEdge => gl::CLAMP_TO_EDGE,
  MirroredRepeat => gl::MIRRORED_REPEAT,
  Repeat => gl::REPEAT,
});

gl_enum!("minification filter", MinFilter, min_filter_to_gl, min_filter_from_gl, {
  Nearest => gl::NEAREST,
  Linear => gl::LINEAR,
  NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
  NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
  LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
  LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
});

gl_enum!("magnification filter", MagFilter, mag_filter_to_gl, mag_filter_from_gl, {
  Nearest => gl::NEAREST,
  Linear => gl::LINEAR,
});

gl_enum!("blending equation", Equation, blending_equation_to_gl, blending_equation_from_gl, {
  Additive => gl::FUNC_ADD,
  Subtract => gl::FUNC_SUBTRACT,
  ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
  Min => gl::MIN,
  Max => gl::MAX,
});

gl_enum!("blending factor", Factor, blending_factor_to_gl, blending_factor_from_gl, {
  One => gl::ONE,
  Zero => gl::ZERO,
  SrcColor => gl::SRC_COLOR,
  SrcColorComplement => gl::ONE_MINUS_SRC_COLOR,
  DestColor => gl::DST_COLOR,
  DestColorComplement => gl::ONE_MINUS_DST_COLOR,
  SrcAlpha => gl::SRC_ALPHA,
  SrcAlphaComplement => gl::ONE_MINUS_SRC_ALPHA,
  DstAlpha => gl::DST_ALPHA,
  DstAlphaComplement => gl::ONE_MINUS_DST_ALPHA,
  ConstantColor => gl::CONSTANT_COLOR,
  ConstantColorComplement => gl::ONE_MINUS_CONSTANT_COLOR,
  ConstantAlpha => gl::CONSTANT_ALPHA,
  ConstantAlphaComplement => gl::ONE_MINUS_CONSTANT_ALPHA,
  SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
});

gl_enum!("depth comparison", DepthComparison, depth_comparison_to_gl, depth_comparison_from_gl, {
  Never => gl::NEVER,
  Always => gl::ALWAYS,
  Equal => gl::EQUAL,
  NotEqual => gl::NOTEQUAL,
  Less => gl::LESS,
  LessOrEqual => gl::LEQUAL,
  Greater => gl::GREATER,
  GreaterOrEqual => gl::GEQUAL,
});

gl_enum!("stencil comparison", StencilComparison, stencil_func_to_gl, stencil_func_from_gl, {
  Never => gl::NEVER,
  Always => gl::ALWAYS,
  Equal => gl::EQUAL,
  NotEqual => gl::NOTEQUAL,
  Less => gl::LESS,
  LessOrEqual => gl::LEQUAL,
  Greater => gl::GREATER,
  GreaterOrEqual => gl::GEQUAL,
});

gl_enum!("stencil operation", StencilOperation, stencil_op_to_gl, stencil_op_from_gl, {
  Keep => gl::KEEP,
  Zero => gl::ZERO,
  Replace => gl::REPLACE,
  Increment => gl::INCR,
  IncrementWrap => gl::INCR_WRAP,
  Decrement => gl::DECR,
  DecrementWrap => gl::DECR_WRAP,
  Invert => gl::INVERT,
});

gl_enum!("face winding", FaceWinding, face_winding_to_gl, face_winding_from_gl, {
  Clockwise => gl::CW,
  CounterClockwise => gl::CCW,
});

gl_enum!("face culling mode", FaceCullingMode, face_culling_mode_to_gl, face_culling_mode_from_gl, {
  Front => gl::FRONT,
  Back => gl::BACK,
  Both => gl::FRONT_AND_BACK,
});

gl_enum!("polygon mode", PolygonMode, polygon_mode_to_gl, polygon_mode_from_gl, {
  Point => gl::POINT,
  Line => gl::LINE,
  Fill => gl::FILL,
});

gl_enum!("logic operation", LogicOp, logic_op_to_gl, logic_op_from_gl, {
  Clear => gl::CLEAR,
  And => gl::AND,
  AndReverse => gl::AND_REVERSE,
  Copy => gl::COPY,
  AndInverted => gl::AND_INVERTED,
  NoOp => gl::NOOP,
  Xor => gl::XOR,
  Or => gl::OR,
  Nor => gl::NOR,
  Equiv => gl::EQUIV,
  Invert => gl::INVERT,
  OrReverse => gl::OR_REVERSE,
  CopyInverted => gl::COPY_INVERTED,
  OrInverted => gl::OR_INVERTED,
  Nand => gl::NAND,
  Set => gl::SET,
});

pub fn index_type_to_gl(index_type: IndexType) -> GLenum {
  match index_type {
    IndexType::UnsignedByte => gl::UNSIGNED_BYTE,
    IndexType::UnsignedShort => gl::UNSIGNED_SHORT,
    IndexType::UnsignedInt => gl::UNSIGNED_INT,
  }
}

pub fn shader_stage_to_gl(stage: ShaderStage) -> GLenum {
  match stage {
    ShaderStage::Vertex => gl::VERTEX_SHADER,
    ShaderStage::Geometry => gl::GEOMETRY_SHADER,
    ShaderStage::Fragment => gl::FRAGMENT_SHADER,
  }
}

/// Type of an active uniform or attribute.
///
/// Types penumbra does not reflect (arrays of samplers, shadow samplers, doubles…) are rejected.
pub fn shader_type_from_gl(ty: GLenum) -> Result<ShaderType, GlEnumError> {
  let ty = match ty {
    gl::BOOL => ShaderType::Bool,
    gl::INT => ShaderType::Int,
    gl::UNSIGNED_INT => ShaderType::UInt,
    gl::FLOAT => ShaderType::Float,
    gl::BOOL_VEC2 => ShaderType::BVec2,
    gl::BOOL_VEC3 => ShaderType::BVec3,
    gl::BOOL_VEC4 => ShaderType::BVec4,
    gl::INT_VEC2 => ShaderType::IVec2,
    gl::INT_VEC3 => ShaderType::IVec3,
    gl::INT_VEC4 => ShaderType::IVec4,
    gl::UNSIGNED_INT_VEC2 => ShaderType::UVec2,
    gl::UNSIGNED_INT_VEC3 => ShaderType::UVec3,
    gl::UNSIGNED_INT_VEC4 => ShaderType::UVec4,
    gl::FLOAT_VEC2 => ShaderType::Vec2,
    gl::FLOAT_VEC3 => ShaderType::Vec3,
    gl::FLOAT_VEC4 => ShaderType::Vec4,
    gl::FLOAT_MAT2 => ShaderType::Mat2,
    gl::FLOAT_MAT3 => ShaderType::Mat3,
    gl::FLOAT_MAT4 => ShaderType::Mat4,
    gl::FLOAT_MAT2x3 => ShaderType::Mat2x3,
    gl::FLOAT_MAT2x4 => ShaderType::Mat2x4,
    gl::FLOAT_MAT3x2 => ShaderType::Mat3x2,
    gl::FLOAT_MAT3x4 => ShaderType::Mat3x4,
    gl::FLOAT_MAT4x2 => ShaderType::Mat4x2,
    gl::FLOAT_MAT4x3 => ShaderType::Mat4x3,
    gl::SAMPLER_2D => ShaderType::Sampler2D,
    gl::SAMPLER_3D => ShaderType::Sampler3D,
    gl::SAMPLER_CUBE => ShaderType::SamplerCube,
    _ => return Err(GlEnumError::new("shader type", ty)),
  };

  Ok(ty)
}

pub fn texture_target_to_gl(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture2D => gl::TEXTURE_2D,
    TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
  }
}

pub fn cube_face_to_gl(face: CubeFace) -> GLenum {
  match face {
    CubeFace::PositiveX => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
    CubeFace::NegativeX => gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
    CubeFace::PositiveY => gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
    CubeFace::NegativeY => gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
    CubeFace::PositiveZ => gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
    CubeFace::NegativeZ => gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
  }
}

pub fn image_target_to_gl(target: ImageTarget) -> GLenum {
  match target {
    ImageTarget::Texture2D => gl::TEXTURE_2D,
    ImageTarget::Cube(face) => cube_face_to_gl(face),
  }
}

pub fn blit_filter_to_gl(filter: BlitFilter) -> GLenum {
  match filter {
    BlitFilter::Nearest => gl::NEAREST,
    BlitFilter::Linear => gl::LINEAR,
  }
}

/// Internal format, pixel format and pixel type of a texture format.
pub fn texture_format_to_gl(format: TextureFormat) -> (GLenum, GLenum, GLenum) {
  use TextureFormat::*;

  let internal = match format {
    R8 => gl::R8,
    R8I => gl::R8I,
    R8UI => gl::R8UI,
    R16F => gl::R16F,
    R16I => gl::R16I,
    R16UI => gl::R16UI,
    R32F => gl::R32F,
    R32I => gl::R32I,
    R32UI => gl::R32UI,
    RG8 => gl::RG8,
    RG8I => gl::RG8I,
    RG8UI => gl::RG8UI,
    RG16F => gl::RG16F,
    RG16I => gl::RG16I,
    RG16UI => gl::RG16UI,
    RG32F => gl::RG32F,
    RG32I => gl::RG32I,
    RG32UI => gl::RG32UI,
    RGB8 => gl::RGB8,
    RGB8I => gl::RGB8I,
    RGB8UI => gl::RGB8UI,
    RGB16F => gl::RGB16F,
    RGB16I => gl::RGB16I,
    RGB16UI => gl::RGB16UI,
    RGB32F => gl::RGB32F,
    RGB32I => gl::RGB32I,
    RGB32UI => gl::RGB32UI,
    RGBA8 => gl::RGBA8,
    RGBA8I => gl::RGBA8I,
    RGBA8UI => gl::RGBA8UI,
    RGBA16F => gl::RGBA16F,
    RGBA16I => gl::RGBA16I,
    RGBA16UI => gl::RGBA16UI,
    RGBA32F => gl::RGBA32F,
    RGBA32I => gl::RGBA32I,
    RGBA32UI => gl::RGBA32UI,
    Depth16 => gl::DEPTH_COMPONENT16,
    Depth24 => gl::DEPTH_COMPONENT24,
    Depth32F => gl::DEPTH_COMPONENT32F,
    Depth24Stencil8 => gl::DEPTH24_STENCIL8,
  };

  let integral = matches!(
    format,
    R8I
      | R8UI
      | R16I
      | R16UI
      | R32I
      | R32UI
      | RG8I
      | RG8UI
      | RG16I
      | RG16UI
      | RG32I
      | RG32UI
      | RGB8I
      | RGB8UI
      | RGB16I
      | RGB16UI
      | RGB32I
      | RGB32UI
      | RGBA8I
      | RGBA8UI
      | RGBA16I
      | RGBA16UI
      | RGBA32I
      | RGBA32UI
  );

  let (components, scalar_type) = format.pixel_layout();

  let pixel_format = match (format, components, integral) {
    (Depth16, ..) | (Depth24, ..) | (Depth32F, ..) => gl::DEPTH_COMPONENT,
    (Depth24Stencil8, ..) => gl::DEPTH_STENCIL,
    (_, 1, false) => gl::RED,
    (_, 1, true) => gl::RED_INTEGER,
    (_, 2, false) => gl::RG,
    (_, 2, true) => gl::RG_INTEGER,
    (_, 3, false) => gl::RGB,
    (_, 3, true) => gl::RGB_INTEGER,
    (_, _, false) => gl::RGBA,
    (_, _, true) => gl::RGBA_INTEGER,
  };

  let pixel_type = match format {
    Depth24Stencil8 => gl::UNSIGNED_INT_24_8,
    _ => scalar_type_to_gl(scalar_type),
  };

  (internal, pixel_format, pixel_type)
}

pub fn renderbuffer_format_to_gl(format: RenderbufferFormat) -> GLenum {
  match format {
    RenderbufferFormat::RGB8 => gl::RGB8,
    RenderbufferFormat::RGBA8 => gl::RGBA8,
    RenderbufferFormat::Depth24 => gl::DEPTH_COMPONENT24,
    RenderbufferFormat::Depth24Stencil8 => gl::DEPTH24_STENCIL8,
  }
}

pub fn framebuffer_status_from_gl(status: GLenum) -> FramebufferStatus {
  match status {
    gl::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
    gl::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::IncompleteMissingAttachment,
    gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
    gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
    gl::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
    gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
    _ => FramebufferStatus::Unknown(status),
  }
}
