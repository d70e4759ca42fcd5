//! Maps flat import rows onto the nested trip model.
//!
//! Rows are processed independently: a bad row contributes a `Row N:` error
//! and is skipped, and the batch carries on — there is no all-or-nothing
//! transaction. Valid rows resolve their city by case-insensitive name
//! against existing cities and cities created earlier in the same batch;
//! unresolved names create a new city spanning the item's dates. Existing
//! city spans only ever widen to cover imported items.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use jaunt_core::{
  enrich,
  trip::{CityStay, ItemKind, NewItem, Trip, TripItem},
};

use crate::parse::ImportRow;

/// Result of resolving one batch. `items_imported` counts successfully
/// created items even when the batch as a whole failed, so partial success
/// is visible to the caller.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
  pub trip: Trip,
  pub items_imported: usize,
  pub errors: Vec<String>,
}

impl ImportOutcome {
  /// The batch succeeded only if no row produced an error.
  pub fn success(&self) -> bool { self.errors.is_empty() }
}

fn truthy(s: &str) -> bool {
  matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

fn parse_date(s: &str) -> Option<NaiveDate> { s.trim().parse().ok() }

/// Validated fields of one row, ready to apply.
struct ResolvedRow {
  city:      String,
  kind:      ItemKind,
  title:     String,
  provider:  Option<String>,
  date_from: NaiveDate,
  date_to:   Option<NaiveDate>,
  price:     f64,
  paid:      bool,
}

/// Validate one row in isolation; a descriptive `Row N:` message on failure.
fn validate_row(row: &ImportRow) -> std::result::Result<ResolvedRow, String> {
  let n = row.line;

  if row.city.trim().is_empty() {
    return Err(format!("Row {n}: City name is required"));
  }
  if row.kind.trim().is_empty() {
    return Err(format!("Row {n}: Item type is required"));
  }
  if row.title.trim().is_empty() {
    return Err(format!("Row {n}: Title is required"));
  }

  let Some(kind) = ItemKind::parse(&row.kind) else {
    return Err(format!(
      "Row {n}: Invalid item type \"{}\". Must be: flight, hotel, or activity",
      row.kind
    ));
  };

  let price = row.price.trim().parse::<f64>().ok();
  let Some(price) = price.filter(|p| p.is_finite() && *p >= 0.0) else {
    return Err(format!(
      "Row {n}: Invalid price \"{}\". Must be a positive number",
      row.price
    ));
  };

  let Some(date_from) = parse_date(&row.date_from) else {
    return Err(format!(
      "Row {n}: Invalid dateFrom \"{}\". Use YYYY-MM-DD format",
      row.date_from
    ));
  };

  let date_to = if row.date_to.trim().is_empty() {
    None
  } else {
    let Some(to) = parse_date(&row.date_to) else {
      return Err(format!(
        "Row {n}: Invalid dateTo \"{}\". Use YYYY-MM-DD format",
        row.date_to
      ));
    };
    if to < date_from {
      return Err(format!("Row {n}: dateTo must be after dateFrom"));
    }
    Some(to)
  };

  let provider = {
    let p = row.provider.trim();
    (!p.is_empty()).then(|| p.to_string())
  };

  Ok(ResolvedRow {
    city: row.city.trim().to_string(),
    kind,
    title: row.title.trim().to_string(),
    provider,
    date_from,
    date_to,
    price,
    paid: truthy(&row.paid),
  })
}

/// Resolve a batch of rows against `trip`, returning the updated trip value
/// and the per-row error list. Cities are re-sorted by start date once, after
/// the whole batch.
pub fn resolve(trip: &Trip, rows: &[ImportRow]) -> ImportOutcome {
  let mut next = trip.clone();
  let mut errors = Vec::new();
  let mut items_imported = 0;

  // Lowercased name → index into next.cities. Indices stay valid because the
  // batch only ever appends; the re-sort happens after the loop.
  let mut city_index: HashMap<String, usize> = next
    .cities
    .iter()
    .enumerate()
    .map(|(i, c)| (c.name.to_lowercase(), i))
    .collect();

  for row in rows {
    let resolved = match validate_row(row) {
      Ok(r) => r,
      Err(message) => {
        errors.push(message);
        continue;
      }
    };

    let key = resolved.city.to_lowercase();
    let city_pos = match city_index.get(&key).copied() {
      Some(pos) => {
        next.cities[pos].widen_span(resolved.date_from, resolved.date_to);
        pos
      }
      None => {
        let mut city = CityStay::new(
          resolved.city.clone(),
          resolved.date_from,
          resolved.date_to.unwrap_or(resolved.date_from),
        );
        city.weather = Some(enrich::placeholder_weather());
        next.cities.push(city);
        let pos = next.cities.len() - 1;
        city_index.insert(key, pos);
        pos
      }
    };

    let mut input = NewItem::new(
      resolved.kind,
      resolved.title,
      resolved.date_from,
      resolved.price,
    );
    input.provider = resolved.provider;
    input.date_to = resolved.date_to;
    input.paid = resolved.paid;

    next.cities[city_pos].items.push(TripItem::build(input));
    items_imported += 1;
  }

  next.sort_cities();
  next.updated_at = Utc::now();

  ImportOutcome {
    trip: next,
    items_imported,
    errors,
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use jaunt_core::mutate;

  use super::*;
  use crate::parse::parse;

  const HEADER: &str = "city,type,title,provider,datefrom,dateto,price,paid";

  fn d(s: &str) -> NaiveDate { s.parse().expect("test date") }

  fn base_trip() -> Trip {
    mutate::create_trip("Import target", d("2026-05-01"), d("2026-05-30"), "EUR")
      .expect("valid trip")
  }

  fn run(trip: &Trip, body: &str) -> ImportOutcome {
    let text = format!("{HEADER}\n{body}");
    let table = parse(&text).expect("parse");
    resolve(trip, &table.rows)
  }

  #[test]
  fn creates_cities_and_items_from_scratch() {
    let outcome = run(
      &base_trip(),
      "Paris,hotel,Hotel du Nord,Booking.com,2026-05-01,2026-05-04,450,yes\n\
       Paris,activity,Louvre,,2026-05-02,,40,no\n\
       Rome,flight,CDG-FCO,AirFrance,2026-05-04,2026-05-04,120,1\n",
    );

    assert!(outcome.success());
    assert_eq!(outcome.items_imported, 3);
    assert_eq!(outcome.trip.cities.len(), 2);

    let paris = &outcome.trip.cities[0];
    assert_eq!(paris.name, "Paris");
    assert_eq!(paris.items.len(), 2);
    assert!(paris.weather.is_some());

    let hotel = &paris.items[0];
    assert!(hotel.paid);
    assert_eq!(hotel.paid_amount, 450.0);
    assert_eq!(hotel.display_name.as_deref(), Some("Hotel du Nord"));

    let flight = &outcome.trip.cities[1].items[0];
    assert!(flight.flight_number.as_deref().unwrap().starts_with("AirFrance-"));
  }

  #[test]
  fn city_match_is_case_insensitive_within_batch() {
    let outcome = run(
      &base_trip(),
      "Paris,activity,Louvre,,2026-05-02,,40,no\n\
       PARIS,activity,Orsay,,2026-05-03,,16,no\n",
    );
    assert_eq!(outcome.trip.cities.len(), 1);
    assert_eq!(outcome.trip.cities[0].items.len(), 2);
  }

  #[test]
  fn existing_city_span_widens_never_narrows() {
    let trip = base_trip();
    let trip = mutate::add_city(&trip, "Paris", d("2026-05-03"), d("2026-05-05"));

    let outcome = run(
      &trip,
      "Paris,activity,Early tour,,2026-05-01,,30,no\n\
       Paris,hotel,Late hotel,,2026-05-04,2026-05-09,500,no\n\
       Paris,activity,Inside span,,2026-05-04,,10,no\n",
    );

    let paris = &outcome.trip.cities[0];
    assert_eq!(paris.start_date, d("2026-05-01"));
    assert_eq!(paris.end_date, d("2026-05-09"));
  }

  #[test]
  fn bad_row_is_skipped_without_aborting_the_batch() {
    // Five rows; the third carries an invalid type. Data row 3 is file
    // line 4 once the header is counted.
    let outcome = run(
      &base_trip(),
      "Paris,hotel,Hotel A,,2026-05-01,2026-05-03,300,yes\n\
       Paris,activity,Louvre,,2026-05-02,,40,no\n\
       Rome,museum,Vatican,,2026-05-05,,20,no\n\
       Rome,activity,Colosseum,,2026-05-05,,18,no\n\
       Rome,hotel,Hotel B,,2026-05-05,2026-05-07,260,no\n",
    );

    assert!(!outcome.success());
    assert_eq!(outcome.items_imported, 4);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("Row 4:"));
    assert!(outcome.errors[0].contains("museum"));
  }

  #[test]
  fn each_validation_failure_gets_a_row_tagged_error() {
    let outcome = run(
      &base_trip(),
      ",activity,No city,,2026-05-01,,10,no\n\
       Paris,,No type,,2026-05-01,,10,no\n\
       Paris,activity,,,2026-05-01,,10,no\n\
       Paris,activity,Bad price,,2026-05-01,,abc,no\n\
       Paris,activity,Negative,,2026-05-01,,-5,no\n\
       Paris,activity,Bad from,,05/01/2026,,10,no\n\
       Paris,activity,Bad to,,2026-05-01,never,10,no\n\
       Paris,activity,Backwards,,2026-05-05,2026-05-01,10,no\n",
    );

    assert_eq!(outcome.items_imported, 0);
    assert_eq!(outcome.errors.len(), 8);
    for (i, error) in outcome.errors.iter().enumerate() {
      assert!(error.starts_with(&format!("Row {}:", i + 2)), "{error}");
    }
  }

  #[test]
  fn paid_literals_follow_truthy_forms() {
    let outcome = run(
      &base_trip(),
      "Paris,activity,A,,2026-05-01,,10,TRUE\n\
       Paris,activity,B,,2026-05-01,,10,Yes\n\
       Paris,activity,C,,2026-05-01,,10,1\n\
       Paris,activity,D,,2026-05-01,,10,paid\n\
       Paris,activity,E,,2026-05-01,,10,\n",
    );
    let items = &outcome.trip.cities[0].items;
    assert!(items[0].paid && items[1].paid && items[2].paid);
    assert!(!items[3].paid && !items[4].paid);
    // Paid rows settle the full price through the shared constructor.
    assert_eq!(items[0].paid_amount, 10.0);
    assert_eq!(items[3].paid_amount, 0.0);
  }

  #[test]
  fn cities_resort_once_after_the_batch() {
    let outcome = run(
      &base_trip(),
      "Rome,activity,Late,,2026-05-10,,10,no\n\
       Paris,activity,Early,,2026-05-01,,10,no\n",
    );
    let names: Vec<&str> = outcome.trip.cities.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Paris", "Rome"]);
  }
}
