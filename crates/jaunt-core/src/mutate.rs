//! The mutation engine — the only legitimate way to transform a [`Trip`].
//!
//! Every operation takes the current trip by reference and returns a new
//! value (copy-on-write; the input is never mutated in place). Callers hold a
//! single current reference and replace it wholesale, which keeps aliasing
//! out and leaves the door open for undo/redo. Operations that change
//! anything refresh `updated_at`; operations that resolve to a missing id
//! are idempotent no-ops and return the trip value unchanged.
//!
//! Partial updates are typed patch structs, validated field-by-field — there
//! is no blind merge. The engine never computes budgets; callers re-run
//! [`crate::budget::calculate_budget`] after each mutation.

use chrono::{NaiveDate, Utc};

use crate::{
  Error, Result, ids,
  trip::{CityStay, ItemKind, NewItem, Trip, TripItem, TripNote},
};

// ─── Patches ─────────────────────────────────────────────────────────────────

/// Partial update for a trip's own fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
  pub title:      Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub currency:   Option<String>,
}

/// Partial update for a city stay.
#[derive(Debug, Clone, Default)]
pub struct CityPatch {
  pub name:       Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  /// Replace the attached enrichment payload (opaque to this crate).
  pub weather: Option<serde_json::Value>,
}

/// Partial update for an item. Touching `price`, `paid_amount`, or `paid`
/// re-derives the payment invariant; setting `paid` without an explicit
/// amount routes `paid_amount` to the full price (becoming paid) or zero
/// (becoming unpaid).
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
  pub kind:        Option<ItemKind>,
  pub title:       Option<String>,
  pub provider:    Option<String>,
  pub date_from:   Option<NaiveDate>,
  pub date_to:     Option<NaiveDate>,
  pub price:       Option<f64>,
  pub paid:        Option<bool>,
  pub paid_amount: Option<f64>,
  pub payer:       Option<String>,
  pub booking_reference: Option<String>,
  pub booking_source:    Option<String>,
  pub note:              Option<String>,
}

/// Partial update for a note.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub completed:   Option<bool>,
}

// ─── Trip operations ─────────────────────────────────────────────────────────

/// Create a new trip with empty cities and notes and fresh timestamps.
///
/// Rejects an empty title and an end date before the start date.
pub fn create_trip(
  title: &str,
  start: NaiveDate,
  end: NaiveDate,
  currency: &str,
) -> Result<Trip> {
  if title.trim().is_empty() {
    return Err(Error::EmptyTitle);
  }
  if end < start {
    return Err(Error::EndBeforeStart { start, end });
  }

  let now = Utc::now();
  Ok(Trip {
    id: ids::generate(),
    title: title.trim().to_string(),
    start_date: start,
    end_date: end,
    currency: currency.to_string(),
    cities: Vec::new(),
    notes: Vec::new(),
    created_at: now,
    updated_at: now,
  })
}

/// Apply a [`TripPatch`]. The patched trip must still satisfy the creation
/// constraints (non-empty title, end ≥ start).
pub fn update_trip(trip: &Trip, patch: &TripPatch) -> Result<Trip> {
  let mut next = trip.clone();
  if let Some(title) = &patch.title {
    next.title = title.trim().to_string();
  }
  if let Some(start) = patch.start_date {
    next.start_date = start;
  }
  if let Some(end) = patch.end_date {
    next.end_date = end;
  }
  if let Some(currency) = &patch.currency {
    next.currency = currency.clone();
  }

  if next.title.is_empty() {
    return Err(Error::EmptyTitle);
  }
  if next.end_date < next.start_date {
    return Err(Error::EndBeforeStart {
      start: next.start_date,
      end:   next.end_date,
    });
  }

  next.updated_at = Utc::now();
  Ok(next)
}

// ─── City operations ─────────────────────────────────────────────────────────

/// Append a new city stay with empty items, then re-sort the city list
/// ascending by start date (stable on equal dates).
pub fn add_city(trip: &Trip, name: &str, start: NaiveDate, end: NaiveDate) -> Trip {
  let mut next = trip.clone();
  next.cities.push(CityStay::new(name, start, end));
  next.sort_cities();
  next.updated_at = Utc::now();
  next
}

/// Apply a [`CityPatch`]; no-op when the id does not resolve. A changed
/// start date re-sorts the city list.
pub fn update_city(trip: &Trip, city_id: &str, patch: &CityPatch) -> Trip {
  let mut next = trip.clone();
  let Some(city) = next.cities.iter_mut().find(|c| c.id == city_id) else {
    return trip.clone();
  };

  if let Some(name) = &patch.name {
    city.name = name.clone();
  }
  if let Some(start) = patch.start_date {
    city.start_date = start;
  }
  if let Some(end) = patch.end_date {
    city.end_date = end;
  }
  if let Some(weather) = &patch.weather {
    city.weather = Some(weather.clone());
  }

  if patch.start_date.is_some() {
    next.sort_cities();
  }
  next.updated_at = Utc::now();
  next
}

/// Remove a city and every item it owns. Idempotent: an unknown id returns
/// the trip unchanged.
pub fn delete_city(trip: &Trip, city_id: &str) -> Trip {
  if trip.city(city_id).is_none() {
    return trip.clone();
  }
  let mut next = trip.clone();
  next.cities.retain(|c| c.id != city_id);
  next.updated_at = Utc::now();
  next
}

// ─── Item operations ─────────────────────────────────────────────────────────

/// Build an item from `input` and append it to the city's item list (in
/// insertion order, no re-sort). No-op when the city id does not resolve.
///
/// Rejects an empty title and a negative price before touching the trip.
pub fn add_item(trip: &Trip, city_id: &str, input: NewItem) -> Result<Trip> {
  if input.title.trim().is_empty() {
    return Err(Error::EmptyTitle);
  }
  if input.price < 0.0 {
    return Err(Error::NegativePrice(input.price));
  }

  let mut next = trip.clone();
  let Some(city) = next.cities.iter_mut().find(|c| c.id == city_id) else {
    return Ok(trip.clone());
  };
  city.items.push(TripItem::build(input));
  next.updated_at = Utc::now();
  Ok(next)
}

/// Apply an [`ItemPatch`]; no-op when the city or item id does not resolve.
///
/// Rejects a negative price in the patch. `paid_amount` above the (possibly
/// patched) price clamps to the price — the one sanctioned clamp.
pub fn update_item(
  trip: &Trip,
  city_id: &str,
  item_id: &str,
  patch: &ItemPatch,
) -> Result<Trip> {
  if let Some(price) = patch.price
    && price < 0.0
  {
    return Err(Error::NegativePrice(price));
  }
  if let Some(title) = &patch.title
    && title.trim().is_empty()
  {
    return Err(Error::EmptyTitle);
  }
  Ok(apply_item_patch(trip, city_id, item_id, patch))
}

/// Remove an item by id. Idempotent no-op when absent.
pub fn delete_item(trip: &Trip, city_id: &str, item_id: &str) -> Trip {
  if trip.item(city_id, item_id).is_none() {
    return trip.clone();
  }
  let mut next = trip.clone();
  if let Some(city) = next.cities.iter_mut().find(|c| c.id == city_id) {
    city.items.retain(|i| i.id != item_id);
  }
  next.updated_at = Utc::now();
  next
}

/// Flip an item's paid flag, keeping `paid_amount` consistent (full price
/// when becoming paid, zero when becoming unpaid). A convenience composition
/// over the item patch path, not a separate code path.
pub fn toggle_item_paid(trip: &Trip, city_id: &str, item_id: &str) -> Trip {
  let Some(item) = trip.item(city_id, item_id) else {
    return trip.clone();
  };
  let patch = ItemPatch {
    paid: Some(!item.paid),
    ..ItemPatch::default()
  };
  apply_item_patch(trip, city_id, item_id, &patch)
}

/// The shared patch-application path. Infallible: validation happens in
/// [`update_item`], and unresolved ids are no-ops.
fn apply_item_patch(trip: &Trip, city_id: &str, item_id: &str, patch: &ItemPatch) -> Trip {
  if trip.item(city_id, item_id).is_none() {
    return trip.clone();
  }

  let mut next = trip.clone();
  if let Some(city) = next.cities.iter_mut().find(|c| c.id == city_id)
    && let Some(item) = city.items.iter_mut().find(|i| i.id == item_id)
  {
    if let Some(kind) = patch.kind {
      item.kind = kind;
    }
    if let Some(title) = &patch.title {
      item.title = title.clone();
    }
    if let Some(provider) = &patch.provider {
      item.provider = Some(provider.clone());
    }
    if let Some(from) = patch.date_from {
      item.date_from = from;
    }
    if let Some(to) = patch.date_to {
      item.date_to = Some(to);
    }
    if let Some(payer) = &patch.payer {
      item.payer = payer.clone();
    }
    if let Some(r) = &patch.booking_reference {
      item.booking_reference = Some(r.clone());
    }
    if let Some(s) = &patch.booking_source {
      item.booking_source = Some(s.clone());
    }
    if let Some(n) = &patch.note {
      item.note = Some(n.clone());
    }

    let payment_touched =
      patch.price.is_some() || patch.paid_amount.is_some() || patch.paid.is_some();
    if let Some(price) = patch.price {
      item.price = price;
    }
    if let Some(amount) = patch.paid_amount {
      item.paid_amount = amount;
    }
    if let Some(paid) = patch.paid
      && patch.paid_amount.is_none()
    {
      item.paid_amount = if paid { item.price } else { 0.0 };
    }
    if payment_touched {
      item.reconcile_payment();
    }
  }
  next.updated_at = Utc::now();
  next
}

// ─── Note operations ─────────────────────────────────────────────────────────

/// Append a note in insertion order. Rejects an empty title.
pub fn add_note(trip: &Trip, title: &str, description: Option<String>) -> Result<Trip> {
  if title.trim().is_empty() {
    return Err(Error::EmptyTitle);
  }
  let mut next = trip.clone();
  next.notes.push(TripNote {
    id: ids::generate(),
    title: title.trim().to_string(),
    description,
    completed: false,
    created_at: Utc::now(),
  });
  next.updated_at = Utc::now();
  Ok(next)
}

/// Apply a [`NotePatch`]; no-op when the id does not resolve.
pub fn update_note(trip: &Trip, note_id: &str, patch: &NotePatch) -> Trip {
  let mut next = trip.clone();
  let Some(note) = next.notes.iter_mut().find(|n| n.id == note_id) else {
    return trip.clone();
  };
  if let Some(title) = &patch.title {
    note.title = title.clone();
  }
  if let Some(description) = &patch.description {
    note.description = Some(description.clone());
  }
  if let Some(completed) = patch.completed {
    note.completed = completed;
  }
  next.updated_at = Utc::now();
  next
}

/// Remove a note by id. Idempotent no-op when absent.
pub fn delete_note(trip: &Trip, note_id: &str) -> Trip {
  if !trip.notes.iter().any(|n| n.id == note_id) {
    return trip.clone();
  }
  let mut next = trip.clone();
  next.notes.retain(|n| n.id != note_id);
  next.updated_at = Utc::now();
  next
}

/// Flip a note's completed flag. No-op when the id does not resolve.
pub fn toggle_note_completed(trip: &Trip, note_id: &str) -> Trip {
  let Some(note) = trip.notes.iter().find(|n| n.id == note_id) else {
    return trip.clone();
  };
  update_note(trip, note_id, &NotePatch {
    completed: Some(!note.completed),
    ..NotePatch::default()
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::trip::ItemKind;

  fn d(s: &str) -> NaiveDate { s.parse().expect("test date") }

  fn base_trip() -> Trip {
    create_trip("Euro loop", d("2026-05-01"), d("2026-05-20"), "EUR").expect("valid trip")
  }

  fn trip_with_item(price: f64) -> (Trip, String, String) {
    let trip = base_trip();
    let trip = add_city(&trip, "Paris", d("2026-05-01"), d("2026-05-05"));
    let city_id = trip.cities[0].id.clone();
    let trip = add_item(
      &trip,
      &city_id,
      NewItem::new(ItemKind::Activity, "Louvre", d("2026-05-02"), price),
    )
    .expect("add item");
    let item_id = trip.cities[0].items[0].id.clone();
    (trip, city_id, item_id)
  }

  #[test]
  fn create_trip_rejects_bad_input() {
    assert!(matches!(
      create_trip("  ", d("2026-05-01"), d("2026-05-02"), "EUR"),
      Err(Error::EmptyTitle)
    ));
    assert!(matches!(
      create_trip("Trip", d("2026-05-02"), d("2026-05-01"), "EUR"),
      Err(Error::EndBeforeStart { .. })
    ));
  }

  #[test]
  fn mutations_never_touch_the_input_value() {
    let trip = base_trip();
    let next = add_city(&trip, "Paris", d("2026-05-01"), d("2026-05-05"));
    assert_eq!(trip.cities.len(), 0);
    assert_eq!(next.cities.len(), 1);
  }

  #[test]
  fn cities_sort_by_start_date_with_stable_ties() {
    let trip = base_trip();
    let trip = add_city(&trip, "Rome", d("2026-05-10"), d("2026-05-12"));
    let trip = add_city(&trip, "Paris", d("2026-05-01"), d("2026-05-05"));
    let trip = add_city(&trip, "Nice", d("2026-05-10"), d("2026-05-11"));

    let names: Vec<&str> = trip.cities.iter().map(|c| c.name.as_str()).collect();
    // Rome and Nice share a start date; Rome was inserted first.
    assert_eq!(names, ["Paris", "Rome", "Nice"]);
  }

  #[test]
  fn delete_city_is_idempotent() {
    let trip = base_trip();
    let trip = add_city(&trip, "Paris", d("2026-05-01"), d("2026-05-05"));
    let before = trip.cities.len();

    let next = delete_city(&trip, "no-such-id");
    assert_eq!(next.cities.len(), before);
    assert_eq!(next.updated_at, trip.updated_at);

    let city_id = trip.cities[0].id.clone();
    let next = delete_city(&trip, &city_id);
    assert!(next.cities.is_empty());
    let again = delete_city(&next, &city_id);
    assert!(again.cities.is_empty());
  }

  #[test]
  fn update_item_rederives_paid_on_price_change() {
    let (trip, city_id, item_id) = trip_with_item(100.0);
    let trip = update_item(&trip, &city_id, &item_id, &ItemPatch {
      paid_amount: Some(100.0),
      ..ItemPatch::default()
    })
    .expect("patch");
    assert!(trip.cities[0].items[0].paid);

    // Raising the price makes the same amount a partial payment.
    let trip = update_item(&trip, &city_id, &item_id, &ItemPatch {
      price: Some(250.0),
      ..ItemPatch::default()
    })
    .expect("patch");
    let item = &trip.cities[0].items[0];
    assert!(!item.paid);
    assert_eq!(item.paid_amount, 100.0);
  }

  #[test]
  fn clamp_law_paid_amount_never_exceeds_price() {
    let (trip, city_id, item_id) = trip_with_item(100.0);
    let trip = update_item(&trip, &city_id, &item_id, &ItemPatch {
      paid_amount: Some(5000.0),
      ..ItemPatch::default()
    })
    .expect("patch");
    let item = &trip.cities[0].items[0];
    assert_eq!(item.paid_amount, 100.0);
    assert!(item.paid);
  }

  #[test]
  fn negative_paid_amount_clamps_to_zero() {
    let (trip, city_id, item_id) = trip_with_item(100.0);
    let trip = update_item(&trip, &city_id, &item_id, &ItemPatch {
      paid_amount: Some(-25.0),
      ..ItemPatch::default()
    })
    .expect("patch");
    let item = &trip.cities[0].items[0];
    assert_eq!(item.paid_amount, 0.0);
    assert!(!item.paid);
  }

  #[test]
  fn toggle_paid_routes_amount_both_ways() {
    let (trip, city_id, item_id) = trip_with_item(120.0);

    let trip = toggle_item_paid(&trip, &city_id, &item_id);
    let item = &trip.cities[0].items[0];
    assert!(item.paid);
    assert_eq!(item.paid_amount, 120.0);

    let trip = toggle_item_paid(&trip, &city_id, &item_id);
    let item = &trip.cities[0].items[0];
    assert!(!item.paid);
    assert_eq!(item.paid_amount, 0.0);
  }

  #[test]
  fn update_item_unknown_ids_are_noops() {
    let (trip, city_id, _) = trip_with_item(50.0);
    let patch = ItemPatch {
      price: Some(75.0),
      ..ItemPatch::default()
    };
    let next = update_item(&trip, &city_id, "ghost", &patch).expect("noop");
    assert_eq!(next.cities[0].items[0].price, 50.0);
    let next = update_item(&trip, "ghost", "ghost", &patch).expect("noop");
    assert_eq!(next.cities[0].items[0].price, 50.0);
  }

  #[test]
  fn update_item_rejects_negative_price() {
    let (trip, city_id, item_id) = trip_with_item(50.0);
    let result = update_item(&trip, &city_id, &item_id, &ItemPatch {
      price: Some(-1.0),
      ..ItemPatch::default()
    });
    assert!(matches!(result, Err(Error::NegativePrice(_))));
  }

  #[test]
  fn add_item_to_unknown_city_is_noop() {
    let trip = base_trip();
    let next = add_item(
      &trip,
      "ghost",
      NewItem::new(ItemKind::Activity, "Tour", d("2026-05-02"), 10.0),
    )
    .expect("noop");
    assert!(next.cities.is_empty());
  }

  #[test]
  fn mutations_refresh_the_update_timestamp() {
    let trip = base_trip();
    let next = add_city(&trip, "Paris", d("2026-05-01"), d("2026-05-05"));
    assert!(next.updated_at >= trip.updated_at);
  }

  #[test]
  fn note_lifecycle() {
    let trip = base_trip();
    let trip = add_note(&trip, "Renew passport", None).expect("add note");
    assert_eq!(trip.notes.len(), 1);
    assert!(!trip.notes[0].completed);

    let note_id = trip.notes[0].id.clone();
    let trip = toggle_note_completed(&trip, &note_id);
    assert!(trip.notes[0].completed);

    let trip = update_note(&trip, &note_id, &NotePatch {
      description: Some("Expires in March".to_string()),
      ..NotePatch::default()
    });
    assert_eq!(trip.notes[0].description.as_deref(), Some("Expires in March"));

    let trip = delete_note(&trip, &note_id);
    assert!(trip.notes.is_empty());
    let trip = delete_note(&trip, &note_id);
    assert!(trip.notes.is_empty());

    assert!(matches!(add_note(&trip, "  ", None), Err(Error::EmptyTitle)));
  }
}
