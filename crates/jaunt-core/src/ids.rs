//! Identifier generation.
//!
//! Entity ids are opaque strings. New ids are UUIDv7 — a time-ordered
//! component plus a random component — so collisions are astronomically
//! unlikely and ids sort roughly by creation time. Legacy records carry ids
//! in older formats; nothing in the crate parses an id back apart.

use uuid::Uuid;

/// Generate a fresh opaque identifier.
pub fn generate() -> String { Uuid::now_v7().hyphenated().to_string() }

/// A pseudo-random suffix in `0..10000`, used when synthesizing flight
/// numbers from a provider name. Drawn from UUIDv4 randomness so no extra
/// RNG dependency is needed.
pub fn numeric_suffix() -> u16 { (Uuid::new_v4().as_u128() % 10_000) as u16 }
