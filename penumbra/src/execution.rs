//! Checked execution.
//!
//! A [`CheckedExecution`] wraps a [`Program`] and guarantees that every active uniform and
//! attribute of the program has been given a value before anything is drawn with it. Each draw
//! is a _pass_:
//!
//! 1. [`CheckedExecution::prepare`] activates the program and starts a pass.
//! 2. Uniforms and attributes are assigned with [`CheckedExecution::put_uniform`],
//!    [`CheckedExecution::bind_attribute`] and [`CheckedExecution::put_attribute`]. A value
//!    assigned during a previous pass can be reused without being submitted again with
//!    [`CheckedExecution::use_existing`].
//! 3. [`CheckedExecution::run`] checks that nothing is missing and runs the draw, or
//!    [`CheckedExecution::cancel`] abandons the pass.
//!
//! Names can be declared up front with their expected type. A declared name that the driver
//! optimised out of the program is accepted and ignored instead of being reported as unknown.
//!
//! Attributes are assigned on the bound array object for the duration of the pass only. When the
//! pass ends, every location it touched gets back the configuration of that array object, so an
//! allocated array object is left exactly as it was built.

use crate::array_object::{ArrayObject, AttributeKind, AttributeLayout};
use crate::backend::array_object::ArrayObject as ArrayObjectBackend;
use crate::backend::Backend;
use crate::buffer::ArrayBuffer;
use crate::context::Context;
use crate::error::Error;
use crate::handle::Resource;
use crate::shader::{ComponentClass, Program, ShaderType, UniformValue};
use log::{trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};

#[derive(Clone, Debug, Eq, PartialEq)]
enum ExecutionState {
  Unprepared,
  Preparing {
    uniforms: BTreeSet<String>,
    attributes: BTreeSet<String>,
  },
}

// A location of an array object changed during the current pass.
#[derive(Clone, Debug)]
struct Override {
  location: u32,
  array_object: ArrayObject,
}

// Last array an attribute was sourced from.
#[derive(Clone, Debug)]
struct ArrayBinding {
  location: u32,
  buffer: ArrayBuffer,
  layout: AttributeLayout,
}

/// Checked draws with a program.
#[derive(Debug)]
pub struct CheckedExecution {
  program: Program,
  state: ExecutionState,
  ever_assigned: BTreeSet<String>,
  declared_uniforms: BTreeMap<String, ShaderType>,
  declared_attributes: BTreeMap<String, ShaderType>,
  array_bindings: BTreeMap<String, ArrayBinding>,
  overrides: Vec<Override>,
}

impl CheckedExecution {
  /// Start checking draws with `program`.
  pub fn new(program: &Program) -> Self {
    CheckedExecution {
      program: program.clone(),
      state: ExecutionState::Unprepared,
      ever_assigned: BTreeSet::new(),
      declared_uniforms: BTreeMap::new(),
      declared_attributes: BTreeMap::new(),
      array_bindings: BTreeMap::new(),
      overrides: Vec::new(),
    }
  }

  /// Declare a uniform the program is expected to have.
  ///
  /// If the program does not have it, values put to it are checked against `ty` and dropped.
  pub fn declare_uniform(&mut self, name: impl Into<String>, ty: ShaderType) {
    self.declared_uniforms.insert(name.into(), ty);
  }

  /// Declare an attribute the program is expected to have.
  pub fn declare_attribute(&mut self, name: impl Into<String>, ty: ShaderType) {
    self.declared_attributes.insert(name.into(), ty);
  }

  /// Program being checked.
  pub fn program(&self) -> &Program {
    &self.program
  }

  /// Whether a pass is being prepared.
  pub fn is_preparing(&self) -> bool {
    matches!(self.state, ExecutionState::Preparing { .. })
  }

  /// Whether `name` was assigned during the current or a previous pass.
  pub fn was_ever_assigned(&self, name: &str) -> bool {
    self.ever_assigned.contains(name)
  }

  /// Start a pass, activating the program.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if a pass is already being prepared.
  pub fn prepare<B>(&mut self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    if self.is_preparing() {
      return Err(Error::constraint(format!(
        "execution of program {} is already being prepared",
        self.program.name()
      )));
    }

    ctx.program_activate(&self.program)?;
    trace!("prepare execution of program {}", self.program.name());

    self.state = ExecutionState::Preparing {
      uniforms: BTreeSet::new(),
      attributes: BTreeSet::new(),
    };

    Ok(())
  }

  /// Assign a value to a uniform.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::UnknownUniform`] if the program has no such uniform and it was not
  /// declared, and with [`Error::UniformTypeMismatch`] if the value has the wrong type.
  pub fn put_uniform<B>(
    &mut self,
    ctx: &mut Context<B>,
    name: &str,
    value: impl Into<UniformValue>,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    self.check_preparing()?;
    let value = value.into();

    let uniform = match self.program.uniform(name) {
      Some(uniform) => uniform.clone(),
      None => return self.optimised_out(name, &self.declared_uniforms, &value, true),
    };

    ctx.uniform_submit(&uniform, &value)?;
    self.assigned(name, true);

    Ok(())
  }

  /// Source an attribute from an attribute of an array buffer.
  ///
  /// The array is enabled on the bound array object until the pass ends; the array object then
  /// gets its own configuration of the location back.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::UnknownAttribute`] if the program has no such attribute and it was not
  /// declared, with [`Error::AttributeNotFound`] if the buffer has no attribute named
  /// `buffer_attribute` and with [`Error::AttributeTypeMismatch`] if the buffer data cannot feed
  /// the program attribute.
  pub fn bind_attribute<B>(
    &mut self,
    ctx: &mut Context<B>,
    name: &str,
    buffer: &ArrayBuffer,
    buffer_attribute: &str,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    self.check_preparing()?;
    ctx.check_current()?;
    buffer.handle().check_not_deleted()?;

    let descriptor = buffer.descriptor();
    let data = descriptor.attribute_checked(buffer_attribute)?;

    let attribute = match self.program.attribute(name) {
      Some(attribute) => attribute,
      None => {
        return match self.declared_attributes.get(name) {
          Some(&ty) if ty.accepts_buffer_data(data.scalar_type(), data.components()) => {
            trace!("attribute {} is not active; binding ignored", name);
            Ok(())
          }

          Some(&ty) => Err(Error::attribute_type_mismatch(name, ty, data)),

          None => Err(self.unknown_attribute(name)),
        };
      }
    };

    if !attribute
      .ty()
      .accepts_buffer_data(data.scalar_type(), data.components())
    {
      return Err(Error::attribute_type_mismatch(name, attribute.ty(), data));
    }

    let kind = match attribute.ty().vector() {
      Some((ComponentClass::Float, _)) => AttributeKind::FloatingPoint { normalized: false },
      _ => AttributeKind::Integral,
    };

    let layout = AttributeLayout {
      kind,
      components: data.components(),
      scalar_type: data.scalar_type(),
      stride: descriptor.stride(),
      offset: data.offset(),
      divisor: 0,
    };

    let binding = ArrayBinding {
      location: attribute.location(),
      buffer: buffer.clone(),
      layout,
    };

    self.enable_array(ctx, &binding)?;
    trace!(
      "bind attribute {} @ {} to {} of buffer {}",
      name,
      binding.location,
      buffer_attribute,
      buffer.handle().id()
    );

    self.array_bindings.insert(name.to_owned(), binding);
    self.assigned(name, false);

    Ok(())
  }

  /// Give an attribute a constant value.
  pub fn put_attribute<B>(
    &mut self,
    ctx: &mut Context<B>,
    name: &str,
    value: impl Into<UniformValue>,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    self.check_preparing()?;
    let value = value.into();

    let attribute = match self.program.attribute(name) {
      Some(attribute) => attribute.clone(),
      None => return self.optimised_out(name, &self.declared_attributes, &value, false),
    };

    self.disable_array(ctx, attribute.location())?;
    ctx.attribute_submit(&attribute, &value)?;

    self.array_bindings.remove(name);
    self.assigned(name, false);

    Ok(())
  }

  /// Mark a uniform or attribute as assigned for this pass, reusing the value it was given in a
  /// previous pass.
  ///
  /// Uniform values and constant attribute values are kept by the driver and are not submitted
  /// again. An attribute last sourced from an array buffer gets its array enabled again.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::ConstraintViolation`] if `name` has never been assigned, and with
  /// [`Error::ResourceDeleted`] if the array buffer it was sourced from has been deleted since.
  pub fn use_existing<B>(&mut self, ctx: &mut Context<B>, name: &str) -> Result<(), Error>
  where
    B: Backend,
  {
    self.check_preparing()?;

    if !self.ever_assigned.contains(name) {
      return Err(Error::constraint(format!(
        "{} has never been assigned a value",
        name
      )));
    }

    let is_uniform = self.program.uniform(name).is_some();

    if !is_uniform {
      if let Some(binding) = self.array_bindings.get(name).cloned() {
        binding.buffer.handle().check_not_deleted()?;
        self.enable_array(ctx, &binding)?;
      } else if let Some(attribute) = self.program.attribute(name) {
        let location = attribute.location();
        self.disable_array(ctx, location)?;
      }
    }

    self.assigned(name, is_uniform);
    trace!("use existing value of {}", name);

    Ok(())
  }

  /// Check that every uniform and attribute has been assigned during this pass.
  ///
  /// # Errors
  ///
  /// Fails with [`Error::IncompleteBinding`] listing every name missing.
  pub fn validate(&self) -> Result<(), Error> {
    let (uniforms, attributes) = match self.state {
      ExecutionState::Preparing {
        ref uniforms,
        ref attributes,
      } => (uniforms, attributes),

      ExecutionState::Unprepared => return Err(self.not_preparing()),
    };

    let missing_uniforms: Vec<String> = self
      .program
      .uniforms()
      .keys()
      .filter(|name| !uniforms.contains(*name))
      .cloned()
      .collect();

    let missing_attributes: Vec<String> = self
      .program
      .attributes()
      .keys()
      .filter(|name| !attributes.contains(*name))
      .cloned()
      .collect();

    if missing_uniforms.is_empty() && missing_attributes.is_empty() {
      Ok(())
    } else {
      Err(Error::IncompleteBinding {
        uniforms: missing_uniforms,
        attributes: missing_attributes,
      })
    }
  }

  /// Validate the pass and run `draw`.
  ///
  /// If validation fails, the pass is still being prepared and can be completed or cancelled.
  /// Otherwise the pass ends: whatever `draw` does, including panicking, the array object
  /// locations changed during the pass are restored and the program is deactivated afterwards.
  pub fn run<B, F, R>(&mut self, ctx: &mut Context<B>, draw: F) -> Result<R, Error>
  where
    B: Backend,
    F: FnOnce(&mut Context<B>) -> Result<R, Error>,
  {
    self.check_preparing()?;
    self.validate()?;

    self.state = ExecutionState::Unprepared;
    trace!("run program {}", self.program.name());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| draw(&mut *ctx)));
    let cleanup = self
      .restore_overrides(ctx)
      .and_then(|_| ctx.program_deactivate());

    match outcome {
      Ok(Ok(r)) => cleanup.map(|_| r),

      Ok(Err(e)) => {
        if let Err(cleanup) = cleanup {
          warn!("cleaning up after a failed draw failed too: {}", cleanup);
        }

        Err(e)
      }

      Err(payload) => panic::resume_unwind(payload),
    }
  }

  /// Abandon the pass.
  ///
  /// Values assigned during the pass still count as assigned for
  /// [`CheckedExecution::use_existing`]. The program stays active.
  pub fn cancel<B>(&mut self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    self.check_preparing()?;
    self.state = ExecutionState::Unprepared;
    trace!("cancel execution of program {}", self.program.name());

    self.restore_overrides(ctx)
  }

  fn enable_array<B>(&mut self, ctx: &mut Context<B>, binding: &ArrayBinding) -> Result<(), Error>
  where
    B: Backend,
  {
    ctx.check_current()?;

    unsafe {
      ctx
        .backend
        .enable_attribute_array(binding.location, binding.buffer.handle().id(), &binding.layout)?
    };

    self.overridden(ctx, binding.location);
    Ok(())
  }

  // Disable the array at `location` so that the constant attribute value is read instead.
  fn disable_array<B>(&mut self, ctx: &mut Context<B>, location: u32) -> Result<(), Error>
  where
    B: Backend,
  {
    let bound = &ctx.state.array_object;
    let enabled = bound.attribute(location).is_some()
      || self
        .overrides
        .iter()
        .any(|o| o.location == location && o.array_object == *bound);

    if enabled {
      ctx.check_current()?;
      unsafe { ctx.backend.disable_attribute_array(location)? };
      self.overridden(ctx, location);
    }

    Ok(())
  }

  fn overridden<B>(&mut self, ctx: &Context<B>, location: u32) {
    let bound = &ctx.state.array_object;
    let known = self
      .overrides
      .iter()
      .any(|o| o.location == location && o.array_object == *bound);

    if !known {
      self.overrides.push(Override {
        location,
        array_object: bound.clone(),
      });
    }
  }

  // Give every location changed during the pass the configuration of its array object back.
  fn restore_overrides<B>(&mut self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let mut first_error = None;
    let bound = ctx.state.array_object.clone();

    for o in std::mem::take(&mut self.overrides) {
      if o.array_object.handle().is_deleted() {
        continue;
      }

      let r = ctx.check_current().and_then(|_| unsafe {
        if o.array_object == bound {
          restore_location(&mut ctx.backend, &o.array_object, o.location)
        } else {
          ctx.backend.bind_array_object(o.array_object.handle().id())?;
          let restored = restore_location(&mut ctx.backend, &o.array_object, o.location);
          ctx.backend.bind_array_object(bound.handle().id())?;
          restored
        }
      });

      if let Err(e) = r {
        first_error.get_or_insert(e);
      }
    }

    first_error.map_or(Ok(()), Err)
  }

  fn assigned(&mut self, name: &str, uniform: bool) {
    if let ExecutionState::Preparing {
      ref mut uniforms,
      ref mut attributes,
    } = self.state
    {
      if uniform {
        uniforms.insert(name.to_owned());
      } else {
        attributes.insert(name.to_owned());
      }
    }

    self.ever_assigned.insert(name.to_owned());
  }

  fn optimised_out(
    &self,
    name: &str,
    declared: &BTreeMap<String, ShaderType>,
    value: &UniformValue,
    uniform: bool,
  ) -> Result<(), Error> {
    match declared.get(name) {
      Some(&expected) if expected.is_compatible(value.ty()) => {
        trace!("{} is not active; value ignored", name);
        Ok(())
      }

      Some(&expected) => Err(Error::UniformTypeMismatch {
        name: name.to_owned(),
        expected,
        actual: value.ty(),
      }),

      None if uniform => Err(Error::UnknownUniform {
        name: name.to_owned(),
        valid: self.program.uniforms().keys().cloned().collect(),
      }),

      None => Err(self.unknown_attribute(name)),
    }
  }

  fn unknown_attribute(&self, name: &str) -> Error {
    Error::UnknownAttribute {
      name: name.to_owned(),
      valid: self.program.attributes().keys().cloned().collect(),
    }
  }

  fn check_preparing(&self) -> Result<(), Error> {
    if self.is_preparing() {
      Ok(())
    } else {
      Err(self.not_preparing())
    }
  }

  fn not_preparing(&self) -> Error {
    Error::constraint(format!(
      "execution of program {} is not being prepared",
      self.program.name()
    ))
  }
}

unsafe fn restore_location<B>(
  backend: &mut B,
  array_object: &ArrayObject,
  location: u32,
) -> Result<(), Error>
where
  B: ArrayObjectBackend,
{
  match array_object.attribute(location) {
    Some(attribute) if !attribute.buffer().handle().is_deleted() => backend.enable_attribute_array(
      location,
      attribute.buffer().handle().id(),
      attribute.layout(),
    ),

    _ => backend.disable_attribute_array(location),
  }
}
