//! Error types for `warchive-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required create field was absent or empty. The message is the
  /// caller-visible wording for that specific field.
  #[error("{0}")]
  MissingField(&'static str),

  #[error("Invalid record ID")]
  InvalidId(String),

  #[error("Record {0} not found")]
  NotFound(i64),

  #[error("No values selected to update")]
  NothingToUpdate,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
