//! Error type for `cram-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cram_core::Error),

  #[error("invalid reminder time {0:?} (expected HH:MM)")]
  InvalidTime(String),

  #[error("reminder delivery failed: {0}")]
  Delivery(String),

  #[error("webhook request failed: {0}")]
  Webhook(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
