//! Tabular import/export codec for jaunt.
//!
//! Converts between comma-separated text and [`jaunt_core`] domain values.
//! Pure synchronous; no HTTP or database dependencies.
//!
//! Import is a two-stage pipeline: [`parse`] validates the header and lifts
//! the text into flat rows, then [`resolve`] maps those rows onto a trip —
//! merging into existing cities or creating new ones — with per-row error
//! accumulation. A malformed row never aborts the batch.
//!
//! # Quick start
//!
//! ```no_run
//! # fn demo(trip: &jaunt_core::trip::Trip) -> Result<(), jaunt_import::Error> {
//! let text = "city,type,title,provider,datefrom,dateto,price,paid\n\
//!             Paris,hotel,Hotel du Nord,Booking.com,2026-05-01,2026-05-04,450,yes\n";
//! let table = jaunt_import::parse(text)?;
//! let outcome = jaunt_import::resolve(trip, &table.rows);
//! println!("{} items, {} errors", outcome.items_imported, outcome.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod export;
mod parse;
mod resolve;

pub use error::{Error, Result};
pub use parse::{ImportRow, ParsedTable, parse};
pub use resolve::{ImportOutcome, resolve};
