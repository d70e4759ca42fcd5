//! Budget aggregation — the computed read model for a trip's finances.
//!
//! [`calculate_budget`] is a pure function over a [`Trip`] value: never
//! stored, always recomputed on read, so it cannot drift from its source.
//! Paid totals accumulate each item's `paid_amount` — not the boolean `paid`
//! flag — which is what makes partial payments additive and exact.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::trip::{DEFAULT_PAYER, Trip};

/// Per-bucket totals. `unpaid` is always `planned - paid`, recomputed rather
/// than stored independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotals {
  pub name:    String,
  pub planned: f64,
  pub paid:    f64,
  pub unpaid:  f64,
}

/// Derived financial summary for one trip. Holds no identity of its own and
/// is entirely reconstructable from the trip at any time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
  pub total_planned: f64,
  pub total_paid:    f64,
  pub total_unpaid:  f64,
  /// Keyed by city id.
  pub by_city: BTreeMap<String, BucketTotals>,
  /// Keyed by payer name.
  pub by_payer: BTreeMap<String, BucketTotals>,
}

/// Aggregate a trip into a [`BudgetSummary`]. Always succeeds; an empty trip
/// yields all-zero totals and empty maps. For a fixed trip value, repeated
/// calls return numerically identical results (accumulation runs in stored
/// order).
pub fn calculate_budget(trip: &Trip) -> BudgetSummary {
  let mut by_city: BTreeMap<String, BucketTotals> = BTreeMap::new();
  let mut by_payer: BTreeMap<String, BucketTotals> = BTreeMap::new();
  let mut total_planned = 0.0;
  let mut total_paid = 0.0;

  for city in &trip.cities {
    let mut city_planned = 0.0;
    let mut city_paid = 0.0;

    for item in &city.items {
      city_planned += item.price;
      city_paid += item.paid_amount;

      let payer = if item.payer.trim().is_empty() {
        DEFAULT_PAYER
      } else {
        item.payer.as_str()
      };
      let bucket = by_payer
        .entry(payer.to_string())
        .or_insert_with(|| BucketTotals {
          name:    payer.to_string(),
          planned: 0.0,
          paid:    0.0,
          unpaid:  0.0,
        });
      bucket.planned += item.price;
      bucket.paid += item.paid_amount;
      bucket.unpaid = bucket.planned - bucket.paid;
    }

    total_planned += city_planned;
    total_paid += city_paid;

    by_city.insert(city.id.clone(), BucketTotals {
      name:    city.name.clone(),
      planned: city_planned,
      paid:    city_paid,
      unpaid:  city_planned - city_paid,
    });
  }

  BudgetSummary {
    total_planned,
    total_paid,
    total_unpaid: total_planned - total_paid,
    by_city,
    by_payer,
  }
}
