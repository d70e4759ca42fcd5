//! Header-validated tabular parser.
//!
//! The first line is a header whose lowercased tokens must include all of
//! `city, type, title, provider, datefrom, dateto, price, paid` — in any
//! order, extra columns tolerated. Column positions are captured once from
//! the header and every data line is read positionally. Lines whose column
//! count differs from the header are dropped with a warning before row-level
//! validation even begins.

use csv::{ReaderBuilder, Trim};

use crate::error::{Error, Result};

/// The column names every import header must carry.
const REQUIRED_HEADERS: [&str; 8] = [
  "city", "type", "title", "provider", "datefrom", "dateto", "price", "paid",
];

/// One flat data row, fields still unvalidated text. `line` is the
/// 1-based line number in the source (the header is line 1), used to tag
/// row-level errors during [`crate::resolve`].
#[derive(Debug, Clone)]
pub struct ImportRow {
  pub line:      usize,
  pub city:      String,
  pub kind:      String,
  pub title:     String,
  pub provider:  String,
  pub date_from: String,
  pub date_to:   String,
  pub price:     String,
  pub paid:      String,
}

/// The parsed batch: rows ready for resolution, plus warnings for lines
/// dropped before validation.
#[derive(Debug, Clone)]
pub struct ParsedTable {
  pub rows:    Vec<ImportRow>,
  pub skipped: Vec<String>,
}

/// Offsets of the required columns within the header, in
/// [`REQUIRED_HEADERS`] order.
struct ColumnMap {
  width:   usize,
  offsets: [usize; 8],
}

fn map_header(header: &csv::StringRecord) -> Result<ColumnMap> {
  let names: Vec<String> = header
    .iter()
    .map(|h| h.trim().to_ascii_lowercase())
    .collect();

  let mut offsets = [0usize; 8];
  let mut missing = Vec::new();
  for (slot, required) in REQUIRED_HEADERS.iter().enumerate() {
    match names.iter().position(|n| n == required) {
      Some(idx) => offsets[slot] = idx,
      None => missing.push((*required).to_string()),
    }
  }
  if !missing.is_empty() {
    return Err(Error::MissingHeaders(missing));
  }
  Ok(ColumnMap {
    width: names.len(),
    offsets,
  })
}

/// Parse comma-separated `input` into flat rows.
///
/// Fails only on batch-level problems: empty input, no data rows, or a
/// header missing required columns.
pub fn parse(input: &str) -> Result<ParsedTable> {
  if input.trim().is_empty() {
    return Err(Error::TooShort);
  }

  let mut reader = ReaderBuilder::new()
    .flexible(true)
    .trim(Trim::All)
    .from_reader(input.as_bytes());

  let columns = map_header(reader.headers()?)?;

  let mut rows = Vec::new();
  let mut skipped = Vec::new();

  for (i, record) in reader.records().enumerate() {
    let line = i + 2; // header is line 1
    let record = match record {
      Ok(r) => r,
      Err(err) => {
        skipped.push(format!("Row {line}: unreadable line, skipping ({err})"));
        continue;
      }
    };

    if record.len() != columns.width {
      skipped.push(format!(
        "Row {line}: column count mismatch ({} columns, expected {}), skipping",
        record.len(),
        columns.width
      ));
      continue;
    }

    let field = |slot: usize| record.get(columns.offsets[slot]).unwrap_or("").to_string();
    rows.push(ImportRow {
      line,
      city:      field(0),
      kind:      field(1),
      title:     field(2),
      provider:  field(3),
      date_from: field(4),
      date_to:   field(5),
      price:     field(6),
      paid:      field(7),
    });
  }

  if rows.is_empty() && skipped.is_empty() {
    return Err(Error::TooShort);
  }

  Ok(ParsedTable { rows, skipped })
}
