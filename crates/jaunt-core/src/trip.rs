//! The entity model: trips, city stays, items, and notes.
//!
//! A [`Trip`] exclusively owns its cities, each [`CityStay`] exclusively owns
//! its items, and nothing outside a trip holds a reference into it. The serde
//! field names follow the persisted camelCase record shape, so records
//! written by older revisions of the tool decode unchanged; fields those
//! revisions lacked are backfilled on load (see [`ItemRecord`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

// ─── Item kind ───────────────────────────────────────────────────────────────

/// The closed set of bookable item types.
///
/// A closed variant rather than an open string: type-specific behavior is
/// dispatched by exhaustive matching, so adding a kind is a compile-time
/// checked exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  Flight,
  Hotel,
  Activity,
}

impl ItemKind {
  /// The lowercase tag used in persisted records and import rows.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Flight => "flight",
      Self::Hotel => "hotel",
      Self::Activity => "activity",
    }
  }

  /// Capitalised form for human-facing output.
  pub fn label(self) -> &'static str {
    match self {
      Self::Flight => "Flight",
      Self::Hotel => "Hotel",
      Self::Activity => "Activity",
    }
  }

  /// Case-insensitive parse; `None` for anything outside the closed set.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "flight" => Some(Self::Flight),
      "hotel" => Some(Self::Hotel),
      "activity" => Some(Self::Activity),
      _ => None,
    }
  }
}

// ─── Trip item ───────────────────────────────────────────────────────────────

/// The payer identity recorded when none is given.
pub const DEFAULT_PAYER: &str = "Me";

/// A priced entry owned by exactly one [`CityStay`].
///
/// Payment consistency invariant:
/// `paid == (paid_amount >= price && price > 0)` and
/// `0 <= paid_amount <= price`. Every code path that touches `price`,
/// `paid_amount`, or `paid` re-establishes it via
/// [`TripItem::reconcile_payment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ItemRecord", rename_all = "camelCase")]
pub struct TripItem {
  pub id:    String,
  #[serde(rename = "type")]
  pub kind:  ItemKind,
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub provider: Option<String>,
  pub date_from: NaiveDate,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date_to: Option<NaiveDate>,
  pub price: f64,
  pub paid: bool,
  /// Amount already paid, in `[0, price]`. Partial payments live here; the
  /// `paid` flag is derived from it.
  pub paid_amount: f64,
  pub payer: String,
  /// Synthesized for flights from the provider name.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub flight_number: Option<String>,
  /// Display name for hotels, mirroring the title at creation.
  #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub booking_reference: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub booking_source: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

impl TripItem {
  /// Construct an item from caller input, assigning a fresh id and deriving
  /// the payment fields and kind-specific extras. Both entry paths — manual
  /// creation and tabular import — go through here, so they stay consistent.
  pub fn build(input: NewItem) -> Self {
    let paid_amount = match input.paid_amount {
      Some(amount) => amount,
      None if input.paid => input.price,
      None => 0.0,
    };

    let flight_number = match (input.kind, &input.provider) {
      (ItemKind::Flight, Some(provider)) if !provider.trim().is_empty() => {
        Some(format!("{provider}-{}", ids::numeric_suffix()))
      }
      _ => None,
    };

    let display_name = match input.kind {
      ItemKind::Hotel => Some(input.title.clone()),
      _ => None,
    };

    let payer = input
      .payer
      .filter(|p| !p.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_PAYER.to_string());

    let mut item = Self {
      id: ids::generate(),
      kind: input.kind,
      title: input.title,
      provider: input.provider,
      date_from: input.date_from,
      date_to: input.date_to,
      price: input.price,
      paid: false,
      paid_amount,
      payer,
      flight_number,
      display_name,
      booking_reference: input.booking_reference,
      booking_source: input.booking_source,
      note: input.note,
    };
    item.reconcile_payment();
    item
  }

  /// Re-establish the payment invariant: clamp `paid_amount` into
  /// `[0, price]` and derive `paid` from the clamped amount.
  pub fn reconcile_payment(&mut self) {
    if self.paid_amount < 0.0 {
      self.paid_amount = 0.0;
    }
    if self.paid_amount > self.price {
      self.paid_amount = self.price;
    }
    self.paid = self.paid_amount >= self.price && self.price > 0.0;
  }
}

/// Caller input for item creation. The id and the derived fields
/// (`paid`/`paid_amount` consistency, flight number, hotel display name) are
/// filled in by [`TripItem::build`].
#[derive(Debug, Clone)]
pub struct NewItem {
  pub kind:      ItemKind,
  pub title:     String,
  pub provider:  Option<String>,
  pub date_from: NaiveDate,
  pub date_to:   Option<NaiveDate>,
  pub price:     f64,
  pub paid:      bool,
  /// Explicit partial amount; when absent, the `paid` flag decides between
  /// full price and zero.
  pub paid_amount: Option<f64>,
  pub payer: Option<String>,
  pub booking_reference: Option<String>,
  pub booking_source: Option<String>,
  pub note: Option<String>,
}

impl NewItem {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    kind: ItemKind,
    title: impl Into<String>,
    date_from: NaiveDate,
    price: f64,
  ) -> Self {
    Self {
      kind,
      title: title.into(),
      provider: None,
      date_from,
      date_to: None,
      price,
      paid: false,
      paid_amount: None,
      payer: None,
      booking_reference: None,
      booking_source: None,
      note: None,
    }
  }
}

// ─── Legacy-record shim ──────────────────────────────────────────────────────

/// Raw persisted shape of an item. Older records lack `paidAmount` and
/// `payer`; decoding goes through this shim so the one-time backfill rule
/// (`paidAmount = price` if paid else `0`, payer defaults to "Me") applies on
/// every load path.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
  id:    String,
  #[serde(rename = "type")]
  kind:  ItemKind,
  title: String,
  #[serde(default)]
  provider: Option<String>,
  date_from: NaiveDate,
  #[serde(default)]
  date_to: Option<NaiveDate>,
  price: f64,
  #[serde(default)]
  paid: bool,
  #[serde(default)]
  paid_amount: Option<f64>,
  #[serde(default)]
  payer: Option<String>,
  #[serde(default)]
  flight_number: Option<String>,
  #[serde(rename = "name", default)]
  display_name: Option<String>,
  #[serde(default)]
  booking_reference: Option<String>,
  #[serde(default)]
  booking_source: Option<String>,
  #[serde(default)]
  note: Option<String>,
}

impl From<ItemRecord> for TripItem {
  fn from(r: ItemRecord) -> Self {
    let paid_amount = match r.paid_amount {
      Some(amount) => amount,
      None if r.paid => r.price,
      None => 0.0,
    };
    let payer = r
      .payer
      .filter(|p| !p.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_PAYER.to_string());

    Self {
      id: r.id,
      kind: r.kind,
      title: r.title,
      provider: r.provider,
      date_from: r.date_from,
      date_to: r.date_to,
      price: r.price,
      paid: r.paid,
      paid_amount,
      payer,
      flight_number: r.flight_number,
      display_name: r.display_name,
      booking_reference: r.booking_reference,
      booking_source: r.booking_source,
      note: r.note,
    }
  }
}

// ─── City stay ───────────────────────────────────────────────────────────────

/// A stay in one city, owned by exactly one [`Trip`]. Items are kept in
/// insertion order; the owning trip keeps cities sorted by start date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStay {
  pub id:   String,
  pub name: String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  #[serde(default)]
  pub items: Vec<TripItem>,
  /// Opaque enrichment payload (weather / plan data) attached by external
  /// collaborators. Never interpreted by aggregation or mutation logic.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub weather: Option<serde_json::Value>,
}

impl CityStay {
  pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
    Self {
      id: ids::generate(),
      name: name.into(),
      start_date: start,
      end_date: end,
      items: Vec::new(),
      weather: None,
    }
  }

  /// Widen the stay's date span to cover `[from, to]` — never narrow it.
  /// An open-ended item (`to == None`) can still push the end date out.
  pub fn widen_span(&mut self, from: NaiveDate, to: Option<NaiveDate>) {
    if from < self.start_date {
      self.start_date = from;
    }
    match to {
      Some(to) if to > self.end_date => self.end_date = to,
      None if from > self.end_date => self.end_date = from,
      _ => {}
    }
  }
}

// ─── Trip note ───────────────────────────────────────────────────────────────

/// A free-form checklist entry on a trip. No date or price semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripNote {
  pub id:    String,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub completed: bool,
  pub created_at: DateTime<Utc>,
}

// ─── Trip ────────────────────────────────────────────────────────────────────

/// The top-level aggregate. Constructed only through
/// [`crate::mutate::create_trip`]; transformed only through the other
/// [`crate::mutate`] operations, each of which returns a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
  pub id:    String,
  pub title: String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  /// ISO-4217-style code, e.g. "USD". Stored verbatim, not validated
  /// against the currency registry.
  pub currency: String,
  /// Kept sorted ascending by city start date (stable on ties).
  #[serde(default)]
  pub cities: Vec<CityStay>,
  /// Older records predate notes entirely; missing lists decode as empty.
  #[serde(default)]
  pub notes: Vec<TripNote>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Trip {
  /// Re-sort cities ascending by start date. Stable: equal start dates keep
  /// their insertion order.
  pub fn sort_cities(&mut self) {
    self.cities.sort_by_key(|c| c.start_date);
  }

  pub fn city(&self, city_id: &str) -> Option<&CityStay> {
    self.cities.iter().find(|c| c.id == city_id)
  }

  pub fn item(&self, city_id: &str, item_id: &str) -> Option<&TripItem> {
    self.city(city_id)?.items.iter().find(|i| i.id == item_id)
  }
}

// ─── Trip summary ────────────────────────────────────────────────────────────

/// The index-record shape: enough for fast trip listings without decoding
/// full trip bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
  pub id:    String,
  pub title: String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub updated_at: DateTime<Utc>,
}

impl From<&Trip> for TripSummary {
  fn from(trip: &Trip) -> Self {
    Self {
      id: trip.id.clone(),
      title: trip.title.clone(),
      start_date: trip.start_date,
      end_date: trip.end_date,
      updated_at: trip.updated_at,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn d(s: &str) -> NaiveDate { s.parse().expect("test date") }

  #[test]
  fn build_derives_paid_from_amount() {
    let mut input = NewItem::new(ItemKind::Activity, "Louvre", d("2026-05-02"), 40.0);
    input.paid_amount = Some(40.0);
    let item = TripItem::build(input);
    assert!(item.paid);
    assert_eq!(item.paid_amount, 40.0);
    assert_eq!(item.payer, "Me");
  }

  #[test]
  fn build_paid_flag_routes_full_price() {
    let mut input = NewItem::new(ItemKind::Activity, "Museum", d("2026-05-02"), 25.0);
    input.paid = true;
    let item = TripItem::build(input);
    assert_eq!(item.paid_amount, 25.0);
    assert!(item.paid);
  }

  #[test]
  fn build_clamps_overpayment_to_price() {
    let mut input = NewItem::new(ItemKind::Hotel, "Hotel du Nord", d("2026-05-01"), 300.0);
    input.paid_amount = Some(500.0);
    let item = TripItem::build(input);
    assert_eq!(item.paid_amount, 300.0);
    assert!(item.paid);
  }

  #[test]
  fn zero_price_is_never_paid() {
    let mut input = NewItem::new(ItemKind::Activity, "Free walking tour", d("2026-05-03"), 0.0);
    input.paid = true;
    let item = TripItem::build(input);
    assert!(!item.paid);
    assert_eq!(item.paid_amount, 0.0);
  }

  #[test]
  fn flight_gets_synthesized_number_hotel_gets_display_name() {
    let mut flight = NewItem::new(ItemKind::Flight, "TLV-CDG", d("2026-05-01"), 450.0);
    flight.provider = Some("ElAl".to_string());
    let flight = TripItem::build(flight);
    let number = flight.flight_number.expect("flight number");
    assert!(number.starts_with("ElAl-"));

    let hotel = TripItem::build(NewItem::new(
      ItemKind::Hotel,
      "Hotel du Nord",
      d("2026-05-01"),
      300.0,
    ));
    assert_eq!(hotel.display_name.as_deref(), Some("Hotel du Nord"));

    let activity = TripItem::build(NewItem::new(
      ItemKind::Activity,
      "Louvre",
      d("2026-05-02"),
      40.0,
    ));
    assert!(activity.flight_number.is_none());
    assert!(activity.display_name.is_none());
  }

  #[test]
  fn widen_span_never_narrows() {
    let mut city = CityStay::new("Paris", d("2026-05-02"), d("2026-05-05"));

    city.widen_span(d("2026-05-01"), None);
    assert_eq!(city.start_date, d("2026-05-01"));

    city.widen_span(d("2026-05-03"), Some(d("2026-05-08")));
    assert_eq!(city.end_date, d("2026-05-08"));

    // A fully contained span changes nothing.
    city.widen_span(d("2026-05-03"), Some(d("2026-05-04")));
    assert_eq!(city.start_date, d("2026-05-01"));
    assert_eq!(city.end_date, d("2026-05-08"));

    // An open-ended item past the end pushes the end out.
    city.widen_span(d("2026-05-10"), None);
    assert_eq!(city.end_date, d("2026-05-10"));
  }

  #[test]
  fn legacy_item_record_backfills_paid_amount_and_payer() {
    let raw = serde_json::json!({
      "id": "lx3k2j9abc",
      "type": "hotel",
      "title": "Old Hotel",
      "dateFrom": "2023-07-01",
      "dateTo": "2023-07-04",
      "price": 600.0,
      "paid": true
    });
    let item: TripItem = serde_json::from_value(raw).expect("decode legacy item");
    assert_eq!(item.paid_amount, 600.0);
    assert_eq!(item.payer, "Me");

    let raw_unpaid = serde_json::json!({
      "id": "lx3k2j9abd",
      "type": "activity",
      "title": "Old Tour",
      "dateFrom": "2023-07-02",
      "price": 50.0,
      "paid": false
    });
    let item: TripItem = serde_json::from_value(raw_unpaid).expect("decode legacy item");
    assert_eq!(item.paid_amount, 0.0);
  }

  #[test]
  fn legacy_trip_without_notes_decodes_empty() {
    let raw = serde_json::json!({
      "id": "t1",
      "title": "Old Trip",
      "startDate": "2023-07-01",
      "endDate": "2023-07-10",
      "currency": "EUR",
      "cities": [],
      "createdAt": "2023-06-01T09:00:00Z",
      "updatedAt": "2023-06-02T09:00:00Z"
    });
    let trip: Trip = serde_json::from_value(raw).expect("decode legacy trip");
    assert!(trip.notes.is_empty());
  }

  #[test]
  fn item_round_trips_through_persisted_shape() {
    let mut input = NewItem::new(ItemKind::Flight, "TLV-CDG", d("2026-05-01"), 450.0);
    input.provider = Some("ElAl".to_string());
    input.date_to = Some(d("2026-05-01"));
    input.paid_amount = Some(100.0);
    input.payer = Some("Dana".to_string());
    let item = TripItem::build(input);

    let json = serde_json::to_value(&item).expect("encode");
    assert_eq!(json["type"], "flight");
    assert_eq!(json["paidAmount"], 100.0);
    assert_eq!(json["payer"], "Dana");

    let back: TripItem = serde_json::from_value(json).expect("decode");
    assert_eq!(back.paid_amount, item.paid_amount);
    assert_eq!(back.kind, ItemKind::Flight);
    assert_eq!(back.flight_number, item.flight_number);
  }
}
