//! Error type for `cram-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("count out of range: {0}")]
  Count(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
