//! Context backend interface.

use crate::error::Error;

/// Making a context current and releasing it.
pub unsafe trait ContextBackend {
  /// Make the context current on the calling thread.
  unsafe fn make_current(&mut self) -> Result<(), Error>;

  /// Release the context from the calling thread.
  unsafe fn release_current(&mut self) -> Result<(), Error>;
}
