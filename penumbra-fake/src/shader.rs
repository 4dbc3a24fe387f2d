use crate::FakeBackend;
use log::{trace, warn};
use penumbra::backend::shader::Shader;
use penumbra::error::Error;
use penumbra::shader::{
  AttributeInfo, ProgramReflection, ShaderStage, ShaderType, UniformInfo, UniformValue,
};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug)]
pub(crate) struct FakeShader {
  pub(crate) stage: ShaderStage,
  pub(crate) lines: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct FakeProgram {
  pub(crate) reflection: ProgramReflection,
  pub(crate) values: HashMap<i32, UniformValue>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Storage {
  Uniform,
  Attribute,
}

// A `uniform` or vertex `in` declaration.
#[derive(Debug)]
struct Declaration {
  storage: Storage,
  ty: ShaderType,
  name: String,
  location: Option<u32>,
}

const SKIPPED_QUALIFIERS: &[&str] = &[
  "highp",
  "mediump",
  "lowp",
  "flat",
  "smooth",
  "noperspective",
];

fn strip_comment(line: &str) -> &str {
  line.find("//").map_or(line, |i| &line[..i]).trim()
}

// Strip a leading `layout(location = N)`, returning the location if any.
fn strip_layout(line: &str) -> (Option<u32>, &str) {
  let rest = match line.strip_prefix("layout") {
    Some(rest) => rest.trim_start(),
    None => return (None, line),
  };

  let (args, rest) = match (rest.strip_prefix('('), rest.find(')')) {
    (Some(_), Some(end)) => (&rest[1..end], rest[end + 1..].trim_start()),
    _ => return (None, line),
  };

  let location = args.split(',').find_map(|arg| {
    let mut kv = arg.splitn(2, '=');
    match (kv.next().map(str::trim), kv.next().map(str::trim)) {
      (Some("location"), Some(value)) => value.parse().ok(),
      _ => None,
    }
  });

  (location, rest)
}

fn parse_declaration(stage: ShaderStage, line: &str) -> Option<Result<Declaration, String>> {
  let (location, line) = strip_layout(strip_comment(line));
  let line = line.strip_suffix(';')?.trim_end();
  let mut tokens = line.split_whitespace();

  let storage = match tokens.next()? {
    "uniform" => Storage::Uniform,
    "in" | "attribute" if stage == ShaderStage::Vertex => Storage::Attribute,
    _ => return None,
  };

  let mut tokens = tokens.skip_while(|t| SKIPPED_QUALIFIERS.contains(t));
  let ty_name = tokens.next()?;
  let name = tokens.next()?;

  // uniform blocks and multiple declarations per line are not reflected
  if tokens.next().is_some() || name.contains(',') {
    return None;
  }

  let name = match name.find('[') {
    Some(i) => format!("{}[0]", &name[..i]),
    None => name.to_owned(),
  };

  match ShaderType::from_glsl_name(ty_name) {
    Some(ty) => Some(Ok(Declaration {
      storage,
      ty,
      name,
      location,
    })),
    None => Some(Err(format!("{} {}", ty_name, name))),
  }
}

fn identifiers(line: &str) -> impl Iterator<Item = &str> {
  line
    .split(|c: char| !(c.is_alphanumeric() || c == '_'))
    .filter(|s| !s.is_empty())
}

fn base_name(name: &str) -> &str {
  name.find('[').map_or(name, |i| &name[..i])
}

fn link(
  name: &str,
  shaders: &[&FakeShader],
  max_vertex_attribs: u32,
) -> Result<ProgramReflection, Error> {
  let mut declarations: Vec<Declaration> = Vec::new();
  let mut used = HashSet::new();

  for shader in shaders {
    for line in &shader.lines {
      match parse_declaration(shader.stage, line) {
        Some(Ok(decl)) => {
          let previous = declarations
            .iter()
            .find(|d| d.storage == decl.storage && d.name == decl.name);

          match previous {
            Some(previous) if previous.ty != decl.ty => {
              return Err(Error::compile(
                name,
                format!(
                  "error: {} declared as both {} and {}",
                  decl.name, previous.ty, decl.ty
                ),
              ));
            }

            Some(_) => (),
            None => declarations.push(decl),
          }
        }

        Some(Err(unsupported)) => {
          warn!("program {}: {} has an unsupported type; ignored", name, unsupported);
        }

        None => used.extend(identifiers(strip_comment(line)).map(str::to_owned)),
      }
    }
  }

  if !used.contains("main") {
    return Err(Error::compile(name, "error: no main function"));
  }

  let mut reflection = ProgramReflection::default();
  let mut taken: BTreeSet<u32> = declarations.iter().filter_map(|d| d.location).collect();
  let mut next_location = 0;

  for decl in declarations {
    if !used.contains(base_name(&decl.name)) {
      trace!("fake: {} is inactive in program {}", decl.name, name);
      continue;
    }

    match decl.storage {
      Storage::Uniform => {
        let location = reflection.uniforms.len() as i32;
        reflection.uniforms.push(UniformInfo {
          name: decl.name,
          location,
          ty: decl.ty,
        });
      }

      Storage::Attribute => {
        let location = match decl.location {
          Some(location) => location,
          None => {
            while taken.contains(&next_location) {
              next_location += 1;
            }

            taken.insert(next_location);
            next_location
          }
        };

        if location >= max_vertex_attribs {
          return Err(Error::compile(
            name,
            format!("error: too many attributes ({} at {})", decl.name, location),
          ));
        }

        reflection.attributes.push(AttributeInfo {
          name: decl.name,
          location,
          ty: decl.ty,
        });
      }
    }
  }

  Ok(reflection)
}

unsafe impl Shader for FakeBackend {
  unsafe fn new_shader(
    &mut self,
    stage: ShaderStage,
    name: &str,
    lines: &[String],
  ) -> Result<u32, Error> {
    self.state.counters.compilations += 1;

    for (i, line) in lines.iter().enumerate() {
      if let Some(message) = line.trim_start().strip_prefix("#error") {
        return Err(Error::compile(
          name,
          format!("0:{}: error: {}", i + 1, message.trim()),
        ));
      }
    }

    let mut store = self.store.borrow_mut();
    let id = store.gen_name();
    store.shaders.insert(
      id,
      FakeShader {
        stage,
        lines: lines.to_vec(),
      },
    );

    trace!("fake: compiled {} shader {} ({})", stage, name, id);
    Ok(id)
  }

  unsafe fn delete_shader(&mut self, shader: u32) -> Result<(), Error> {
    self
      .store
      .borrow_mut()
      .shaders
      .remove(&shader)
      .map(|_| ())
      .ok_or_else(|| Self::unknown("shader", shader))
  }

  unsafe fn new_program(
    &mut self,
    name: &str,
    shaders: &[u32],
  ) -> Result<(u32, ProgramReflection), Error> {
    self.state.counters.links += 1;

    let max_vertex_attribs = self.limits.max_vertex_attribs().max(0) as u32;
    let mut store = self.store.borrow_mut();

    let reflection = {
      let attached = shaders
        .iter()
        .map(|id| store.shaders.get(id).ok_or_else(|| Self::unknown("shader", *id)))
        .collect::<Result<Vec<_>, _>>()?;

      link(name, &attached, max_vertex_attribs)?
    };

    let id = store.gen_name();
    store.programs.insert(
      id,
      FakeProgram {
        reflection: reflection.clone(),
        values: HashMap::new(),
      },
    );

    trace!(
      "fake: linked program {} ({}): {} uniforms, {} attributes",
      name,
      id,
      reflection.uniforms.len(),
      reflection.attributes.len()
    );

    Ok((id, reflection))
  }

  unsafe fn delete_program(&mut self, program: u32) -> Result<(), Error> {
    self
      .store
      .borrow_mut()
      .programs
      .remove(&program)
      .ok_or_else(|| Self::unknown("program", program))?;

    if self.state.program == program {
      self.state.program = 0;
    }

    Ok(())
  }

  unsafe fn use_program(&mut self, program: u32) -> Result<(), Error> {
    if program != 0 && !self.store.borrow().programs.contains_key(&program) {
      return Err(Self::unknown("program", program));
    }

    self.state.program = program;
    Ok(())
  }

  unsafe fn set_uniform(&mut self, location: i32, value: &UniformValue) -> Result<(), Error> {
    let program = self.state.program;
    if program == 0 {
      return Err(Error::driver("no program in use"));
    }

    let mut store = self.store.borrow_mut();
    let fake = store
      .programs
      .get_mut(&program)
      .ok_or_else(|| Self::unknown("program", program))?;

    if !fake.reflection.uniforms.iter().any(|u| u.location == location) {
      return Err(Error::driver(format!(
        "no uniform at location {} in program {}",
        location, program
      )));
    }

    fake.values.insert(location, *value);
    self.state.counters.uniform_submissions += 1;

    Ok(())
  }

  unsafe fn set_attribute_value(
    &mut self,
    location: u32,
    value: &UniformValue,
  ) -> Result<(), Error> {
    self.check_attribute_location(location)?;

    self.state.attribute_values.insert(location, *value);
    self.state.counters.attribute_submissions += 1;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn shader(stage: ShaderStage, src: &str) -> FakeShader {
    FakeShader {
      stage,
      lines: src.lines().map(|l| format!("{}\n", l)).collect(),
    }
  }

  #[test]
  fn layout_location() {
    assert_eq!(
      strip_layout("layout(location = 3) in vec3 co;"),
      (Some(3), "in vec3 co;")
    );
    assert_eq!(strip_layout("in vec3 co;"), (None, "in vec3 co;"));
  }

  #[test]
  fn reflect_active_declarations_only() {
    let vs = shader(
      ShaderStage::Vertex,
      "in vec3 position;\n\
       in vec2 uv; // not used below\n\
       layout(location = 0) in vec3 normal;\n\
       uniform mat4 projection;\n\
       out vec3 v_normal;\n\
       void main() {\n\
         v_normal = normal;\n\
         gl_Position = projection * vec4(position, 1.);\n\
       }",
    );
    let fs = shader(
      ShaderStage::Fragment,
      "uniform vec4 lights[4];\n\
       uniform float unused;\n\
       out vec4 frag;\n\
       void main() { frag = lights[0]; }",
    );

    let reflection = link("test", &[&vs, &fs], 16).unwrap();
    let uniforms: Vec<_> = reflection.uniforms.iter().map(|u| u.name.as_str()).collect();
    let attributes: Vec<_> = reflection
      .attributes
      .iter()
      .map(|a| (a.name.as_str(), a.location))
      .collect();

    assert_eq!(uniforms, ["projection", "lights[0]"]);
    assert_eq!(attributes, [("position", 1), ("normal", 0)]);
  }

  #[test]
  fn conflicting_uniform_types() {
    let vs = shader(ShaderStage::Vertex, "uniform float t;\nvoid main() { t; }");
    let fs = shader(ShaderStage::Fragment, "uniform int t;\nvoid main() { t; }");

    assert!(matches!(
      link("test", &[&vs, &fs], 16),
      Err(Error::ProgramCompile { .. })
    ));
  }

  #[test]
  fn missing_main() {
    let vs = shader(ShaderStage::Vertex, "in vec3 co;");

    assert_eq!(
      link("test", &[&vs], 16),
      Err(Error::compile("test", "error: no main function"))
    );
  }
}
