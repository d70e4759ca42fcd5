//! Plain-text rendering helpers for CLI output.

use jaunt_core::{
  budget::BudgetSummary,
  trip::{Trip, TripSummary},
};

fn amount(v: f64) -> String {
  if v.fract() == 0.0 {
    format!("{v:.0}")
  } else {
    format!("{v:.2}")
  }
}

/// Print the recomputed budget for the current trip value.
pub fn print_budget(budget: &BudgetSummary, currency: &str) {
  println!(
    "Budget: planned {} {currency} | paid {} {currency} | unpaid {} {currency}",
    amount(budget.total_planned),
    amount(budget.total_paid),
    amount(budget.total_unpaid),
  );
  for bucket in budget.by_city.values() {
    println!(
      "  {:<20} planned {:>10}  paid {:>10}  unpaid {:>10}",
      bucket.name,
      amount(bucket.planned),
      amount(bucket.paid),
      amount(bucket.unpaid),
    );
  }
  if !budget.by_payer.is_empty() {
    println!("By payer:");
    for bucket in budget.by_payer.values() {
      println!(
        "  {:<20} planned {:>10}  paid {:>10}  unpaid {:>10}",
        bucket.name,
        amount(bucket.planned),
        amount(bucket.paid),
        amount(bucket.unpaid),
      );
    }
  }
}

/// One line per stored trip, newest first.
pub fn print_summaries(summaries: &[TripSummary]) {
  if summaries.is_empty() {
    println!("No trips yet.");
    return;
  }
  for s in summaries {
    println!(
      "{}  {}  ({} - {})  updated {}",
      s.id,
      s.title,
      s.start_date,
      s.end_date,
      s.updated_at.format("%Y-%m-%d %H:%M"),
    );
  }
}

/// City and item ids for a trip, so follow-up commands can reference them.
pub fn print_structure(trip: &Trip) {
  println!("{}  {}", trip.id, trip.title);
  for city in &trip.cities {
    println!("  city {}  {} ({} - {})", city.id, city.name, city.start_date, city.end_date);
    for item in &city.items {
      println!(
        "    item {}  [{}] {}  {} {}",
        item.id,
        item.kind.label(),
        item.title,
        amount(item.price),
        trip.currency,
      );
    }
  }
  for note in &trip.notes {
    let mark = if note.completed { "x" } else { " " };
    println!("  note {}  [{mark}] {}", note.id, note.title);
  }
}
