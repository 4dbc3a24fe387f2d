//! A pool of fake contexts.

use crate::{FakeBackend, FakeLimits};
use log::debug;
use penumbra::context::{Context, ContextOpt};
use penumbra::error::Error;

/// Hands out contexts, current on the calling thread, and takes them back for reuse.
///
/// Every context of a pool shares its objects with the others. Contexts are reused as they were
/// given back: bindings and objects survive.
#[derive(Debug)]
pub struct ContextPool {
  opt: ContextOpt,
  limits: FakeLimits,
  free: Vec<Context<FakeBackend>>,
  // first context ever created, kept to share with; never handed out
  root: Option<Context<FakeBackend>>,
  created: usize,
}

impl ContextPool {
  /// Create an empty pool. Contexts are created lazily.
  pub fn new(opt: ContextOpt, limits: FakeLimits) -> Self {
    ContextPool {
      opt,
      limits,
      free: Vec::new(),
      root: None,
      created: 0,
    }
  }

  /// Get a context and make it current.
  pub fn get(&mut self) -> Result<Context<FakeBackend>, Error> {
    if let Some(mut ctx) = self.free.pop() {
      ctx.make_current()?;
      return Ok(ctx);
    }

    let ctx = match self.root {
      Some(ref root) => {
        let backend = FakeBackend::new_shared(root.backend());
        Context::new_shared(root, backend, self.opt)?
      }

      None => {
        let mut root = Context::new(FakeBackend::with_limits(self.limits), self.opt)?;
        root.release_current()?;

        let backend = FakeBackend::new_shared(root.backend());
        let ctx = Context::new_shared(&root, backend, self.opt)?;
        self.root = Some(root);

        ctx
      }
    };

    self.created += 1;
    debug!("pool: created context {} ({} so far)", ctx.id(), self.created);

    Ok(ctx)
  }

  /// Give a context back, releasing it if current.
  pub fn put(&mut self, mut ctx: Context<FakeBackend>) -> Result<(), Error> {
    if ctx.is_current() {
      ctx.release_current()?;
    }

    self.free.push(ctx);
    Ok(())
  }

  /// Number of contexts waiting for reuse.
  pub fn available(&self) -> usize {
    self.free.len()
  }

  /// Number of contexts created so far.
  pub fn created(&self) -> usize {
    self.created
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn contexts_are_reused() {
    let mut pool = ContextPool::new(ContextOpt::default(), FakeLimits::default());

    let a = pool.get().unwrap();
    assert!(a.is_current());
    let id = a.id();

    pool.put(a).unwrap();
    assert_eq!(pool.available(), 1);

    let b = pool.get().unwrap();
    assert_eq!(b.id(), id);
    assert!(b.is_current());
    assert_eq!(pool.created(), 1);
  }

  #[test]
  fn contexts_share_objects() {
    let mut pool = ContextPool::new(ContextOpt::default(), FakeLimits::default());

    let mut a = pool.get().unwrap();
    a.release_current().unwrap();
    let b = pool.get().unwrap();

    assert!(a.is_shared_with(&b));
    assert_eq!(pool.created(), 2);

    drop(b);
    a.make_current().unwrap();
  }
}
