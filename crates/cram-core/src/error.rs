//! Error types for `cram-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("task catalog is empty")]
  EmptyCatalog,

  #[error("duplicate task id in catalog: {0:?}")]
  DuplicateTask(String),

  #[error("writing schedule must have 7 entries (Monday..Sunday), got {0}")]
  InvalidSchedule(usize),

  #[error("unknown timezone or offset: {0:?}")]
  InvalidTimezone(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
