//! Error types for the jaunt-import codec.
//!
//! These cover only batch-level failures (bad header, unreadable input).
//! Row-level problems are accumulated as strings in
//! [`crate::ImportOutcome::errors`] and never abort the batch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("input must contain a header row and at least one data row")]
  TooShort,

  #[error("missing required headers: {}", .0.join(", "))]
  MissingHeaders(Vec<String>),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("rendered output is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
