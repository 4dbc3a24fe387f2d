#![allow(dead_code)]

use penumbra::buffer::{ArrayBuffer, UsageHint};
use penumbra::descriptor::BufferDescriptor;
use penumbra::scalar::ScalarType;
use penumbra::shader::Program;
use penumbra::{Context, ContextOpt};
use penumbra_fake::{FakeBackend, FakeLimits};

pub const VS: &str = "
in vec3 position;
in vec3 normal;
in vec2 uv;
uniform mat4 projection;
out vec3 v_normal;
out vec2 v_uv;

void main() {
  v_normal = normal;
  v_uv = uv;
  gl_Position = projection * vec4(position, 1.);
}";

pub const FS: &str = "
in vec3 v_normal;
in vec2 v_uv;
uniform sampler2D albedo;
uniform float exposure;
out vec4 frag;

void main() {
  frag = texture(albedo, v_uv) * exposure * max(v_normal.z, 0.);
}";

pub fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

pub fn context() -> Context<FakeBackend> {
  context_with(ContextOpt::default(), FakeLimits::default())
}

pub fn context_with(opt: ContextOpt, limits: FakeLimits) -> Context<FakeBackend> {
  init_logger();
  Context::new(FakeBackend::with_limits(limits), opt).unwrap()
}

pub fn lines(source: &str) -> Vec<String> {
  source.lines().map(|line| format!("{}\n", line)).collect()
}

pub fn vertex_descriptor() -> BufferDescriptor {
  BufferDescriptor::builder()
    .attribute("position", ScalarType::Float, 3)
    .attribute("normal", ScalarType::Float, 3)
    .attribute("uv", ScalarType::Float, 2)
    .build()
    .unwrap()
}

pub fn vertex_buffer(ctx: &mut Context<FakeBackend>, count: usize) -> ArrayBuffer {
  ctx
    .array_buffer_allocate(count, &vertex_descriptor(), UsageHint::StaticDraw)
    .unwrap()
}

pub fn program(ctx: &mut Context<FakeBackend>) -> Program {
  program_from(ctx, VS, FS)
}

pub fn program_from(ctx: &mut Context<FakeBackend>, vs: &str, fs: &str) -> Program {
  let vs = ctx.shader_compile_vertex("vs", &lines(vs)).unwrap();
  let fs = ctx.shader_compile_fragment("fs", &lines(fs)).unwrap();

  ctx.program_link("test", &vs, None, &fs).unwrap()
}
