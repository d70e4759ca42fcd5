//! Export serializers: flattened CSV, persisted-shape JSON, and a plain-text
//! itinerary with the budget block.
//!
//! These consume the core read-only; exporting never mutates a trip.

use jaunt_core::{
  budget::{BudgetSummary, calculate_budget},
  trip::{Trip, TripItem},
};

use crate::error::Result;

/// Column order of the flattened CSV, one row per item.
const CSV_HEADER: [&str; 10] = [
  "Type",
  "Title",
  "Provider",
  "Dates",
  "Price",
  "Status",
  "Paid Amount",
  "Payer",
  "Booking Reference",
  "Note",
];

fn format_amount(amount: f64) -> String {
  if amount.fract() == 0.0 {
    format!("{amount:.0}")
  } else {
    format!("{amount:.2}")
  }
}

fn format_dates(item: &TripItem) -> String {
  match item.date_to {
    Some(to) if to != item.date_from => format!("{} - {}", item.date_from, to),
    _ => item.date_from.to_string(),
  }
}

fn payment_status(item: &TripItem) -> &'static str {
  if item.paid {
    "Paid"
  } else if item.paid_amount > 0.0 {
    "Partially paid"
  } else {
    "Unpaid"
  }
}

/// Render the trip as a flattened CSV listing, one row per item.
pub fn to_csv(trip: &Trip) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(CSV_HEADER)?;

  for city in &trip.cities {
    for item in &city.items {
      writer.write_record([
        item.kind.label(),
        item.title.as_str(),
        item.provider.as_deref().unwrap_or(""),
        format_dates(item).as_str(),
        format_amount(item.price).as_str(),
        payment_status(item),
        format_amount(item.paid_amount).as_str(),
        item.payer.as_str(),
        item.booking_reference.as_deref().unwrap_or(""),
        item.note.as_deref().unwrap_or(""),
      ])?;
    }
  }

  let bytes = writer.into_inner().map_err(|e| e.into_error())?;
  Ok(String::from_utf8(bytes)?)
}

/// Render the trip in its persisted JSON record shape, pretty-printed.
pub fn to_json(trip: &Trip) -> Result<String> {
  Ok(serde_json::to_string_pretty(trip)?)
}

fn push_budget(out: &mut String, budget: &BudgetSummary, currency: &str) {
  out.push_str("Budget\n");
  out.push_str(&format!(
    "  Planned {} {currency}, paid {} {currency}, unpaid {} {currency}\n",
    format_amount(budget.total_planned),
    format_amount(budget.total_paid),
    format_amount(budget.total_unpaid),
  ));
  for bucket in budget.by_city.values() {
    out.push_str(&format!(
      "  {}: planned {}, paid {}, unpaid {}\n",
      bucket.name,
      format_amount(bucket.planned),
      format_amount(bucket.paid),
      format_amount(bucket.unpaid),
    ));
  }
  for bucket in budget.by_payer.values() {
    out.push_str(&format!(
      "  Payer {}: planned {}, paid {}, unpaid {}\n",
      bucket.name,
      format_amount(bucket.planned),
      format_amount(bucket.paid),
      format_amount(bucket.unpaid),
    ));
  }
}

/// Render a plain-text itinerary followed by the recomputed budget.
pub fn to_text(trip: &Trip) -> String {
  let mut out = String::new();
  out.push_str(&format!(
    "{} ({} - {}, {})\n\n",
    trip.title, trip.start_date, trip.end_date, trip.currency
  ));

  for city in &trip.cities {
    out.push_str(&format!(
      "{} ({} - {})\n",
      city.name, city.start_date, city.end_date
    ));
    for item in &city.items {
      out.push_str(&format!(
        "  - [{}] {} | {} | {} {} | {}\n",
        item.kind.label(),
        item.title,
        format_dates(item),
        format_amount(item.price),
        trip.currency,
        payment_status(item),
      ));
    }
    out.push('\n');
  }

  if !trip.notes.is_empty() {
    out.push_str("Notes\n");
    for note in &trip.notes {
      let mark = if note.completed { "x" } else { " " };
      out.push_str(&format!("  [{mark}] {}\n", note.title));
    }
    out.push('\n');
  }

  push_budget(&mut out, &calculate_budget(trip), &trip.currency);
  out
}
