//! Query backend interface.
//!
//! This interface defines the low-level API to query information about the implementation.

use crate::capabilities::Limit;
use crate::error::Error;

/// Query backend.
pub unsafe trait Query {
  /// Vendor of the driver.
  fn backend_author(&self) -> Result<String, Error>;

  /// The backend name.
  fn backend_name(&self) -> Result<String, Error>;

  /// The backend version.
  fn backend_version(&self) -> Result<String, Error>;

  /// The shading language version supported by the backend.
  fn backend_shading_lang_version(&self) -> Result<String, Error>;

  /// Raw value of a limit, as reported by the driver.
  unsafe fn query_limit(&mut self, limit: Limit) -> Result<i32, Error>;
}
