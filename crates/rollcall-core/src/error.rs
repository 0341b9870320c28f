//! Error types for `rollcall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown weekday: {0:?}")]
  UnknownWeekday(String),

  #[error("malformed subject reference: {0:?}")]
  MalformedSubjectRef(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
