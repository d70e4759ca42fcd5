//! Error types for `jaunt-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("title must not be empty")]
  EmptyTitle,

  #[error("end date {end} precedes start date {start}")]
  EndBeforeStart { start: NaiveDate, end: NaiveDate },

  #[error("price must be a non-negative number, got {0}")]
  NegativePrice(f64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
