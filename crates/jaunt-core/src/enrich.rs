//! Enrichment payload types for the external weather / trip-plan / tip
//! collaborators.
//!
//! These are the display payloads the fetchers return. The entity model
//! stores whatever it is handed as opaque JSON on a [`crate::trip::CityStay`];
//! nothing in aggregation or mutation depends on these shapes, and a failed
//! fetch degrades to the `fallback()` payload rather than an error.

use serde::{Deserialize, Serialize};

const UNAVAILABLE_FORECAST: &str = "Unable to load weather forecast at this time";
const UNAVAILABLE_PLAN: &str = "Unable to load trip planning suggestions at this time";

/// Display payload from the weather collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
  pub icon: String,
  pub temperature: f64,
  pub condition: String,
  pub forecast: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
}

impl WeatherReport {
  /// The fixed payload used when the collaborator is unreachable or returns
  /// garbage.
  pub fn fallback() -> Self {
    Self {
      icon: String::new(),
      temperature: -1.0,
      condition: "Unknown".to_string(),
      forecast: UNAVAILABLE_FORECAST.to_string(),
      summary: Some(UNAVAILABLE_FORECAST.to_string()),
    }
  }
}

/// Display payload from the AI trip-plan collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
  pub icon: String,
  pub title: String,
  pub description: String,
  pub activities: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
}

impl TripPlan {
  pub fn fallback() -> Self {
    Self {
      icon: "🗺️".to_string(),
      title: "Trip Planning".to_string(),
      description: UNAVAILABLE_PLAN.to_string(),
      activities: UNAVAILABLE_PLAN.to_string(),
      summary: Some(UNAVAILABLE_PLAN.to_string()),
    }
  }
}

/// Display payload from the money-saving-tip collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneySavingTip {
  pub tip: String,
}

impl MoneySavingTip {
  pub fn fallback() -> Self {
    Self {
      tip: "Check credit-card fees before the trip".to_string(),
    }
  }
}

/// The placeholder payload attached to cities created by the tabular
/// importer, before any real enrichment fetch has run.
pub fn placeholder_weather() -> serde_json::Value {
  serde_json::json!({
    "icon": "",
    "temperature": -1,
    "condition": "Unknown",
    "forecast": "Not fetched yet"
  })
}
