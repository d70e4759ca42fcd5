//! Core types and algorithms for the jaunt trip planner.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The canonical value is a [`trip::Trip`]: a trip owns city stays, city
//! stays own priced items. The [`mutate`] module is the only legitimate way
//! to transform a trip (copy-on-write), and [`budget`] derives financial
//! totals from whatever the current trip value is.

pub mod budget;
pub mod enrich;
pub mod error;
pub mod ids;
pub mod mutate;
pub mod store;
pub mod trip;

pub use error::{Error, Result};
