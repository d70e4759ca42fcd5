//! SQLite backend for the jaunt trip store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each trip is one row: denormalised
//! index columns for fast listing beside the full JSON record body.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
