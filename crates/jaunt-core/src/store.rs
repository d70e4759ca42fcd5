//! The `TripStore` trait — the storage collaborator boundary.
//!
//! Implemented by storage backends (e.g. `jaunt-store-sqlite`). The core
//! treats every method as asynchronous and fallible; backend failures
//! propagate to the caller and are never swallowed by the mutation engine.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes.

use std::future::Future;

use crate::trip::{Trip, TripSummary};

/// Abstraction over a trip record store: one record per trip, keyed by trip
/// id, plus an index of summaries for fast listing.
pub trait TripStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a trip by id. Returns `None` if not found.
  fn get(
    &self,
    id: String,
  ) -> impl Future<Output = Result<Option<Trip>, Self::Error>> + Send + '_;

  /// Persist a trip, stamping `updated_at`, and return the stored value.
  /// Overwrites any existing record with the same id.
  fn save(
    &self,
    trip: Trip,
  ) -> impl Future<Output = Result<Trip, Self::Error>> + Send + '_;

  /// All stored trips, most recently updated first.
  fn list(&self) -> impl Future<Output = Result<Vec<Trip>, Self::Error>> + Send + '_;

  /// Index records only — no full trip bodies are decoded.
  fn list_summaries(
    &self,
  ) -> impl Future<Output = Result<Vec<TripSummary>, Self::Error>> + Send + '_;

  /// Delete a trip record. Deleting an absent id is not an error.
  fn delete(
    &self,
    id: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Health probe: whether the backend is reachable and usable.
  fn is_available(&self) -> impl Future<Output = bool> + Send + '_;
}
