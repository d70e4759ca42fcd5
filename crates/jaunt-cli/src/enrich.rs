//! Async HTTP client for the enrichment collaborators (weather, AI trip
//! plan, money-saving tip).
//!
//! Every fetch is read-only and keyed by (city or cities, trip title, start
//! date, end date). Failures of any kind — connection, non-success status,
//! decode — degrade to the fixed fallback payload from
//! [`jaunt_core::enrich`]; they are logged and never surfaced as errors, so
//! a dead enrichment service can never block or corrupt a trip record.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use jaunt_core::enrich::{MoneySavingTip, TripPlan, WeatherReport};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Async client for the enrichment HTTP service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct EnrichClient {
  client:   Client,
  base_url: String,
}

impl EnrichClient {
  pub fn new(base_url: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url.trim_end_matches('/'))
  }

  async fn fetch<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {path} → {}", resp.status()));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {path} payload"))
  }

  /// `GET /api/v1/weather` — falls back on any failure.
  pub async fn weather(
    &self,
    city: &str,
    trip_title: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> WeatherReport {
    let (start, end) = (start.to_string(), end.to_string());
    let query = [
      ("city", city),
      ("trip", trip_title),
      ("startDate", start.as_str()),
      ("endDate", end.as_str()),
    ];
    match self.fetch("/api/v1/weather", &query).await {
      Ok(report) => report,
      Err(err) => {
        tracing::warn!(%city, %err, "weather fetch failed, using fallback");
        WeatherReport::fallback()
      }
    }
  }

  /// `GET /api/v1/plan/trip-plan` — falls back on any failure.
  pub async fn trip_plan(
    &self,
    city: &str,
    trip_title: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> TripPlan {
    let (start, end) = (start.to_string(), end.to_string());
    let query = [
      ("city", city),
      ("trip", trip_title),
      ("startDate", start.as_str()),
      ("endDate", end.as_str()),
    ];
    match self.fetch("/api/v1/plan/trip-plan", &query).await {
      Ok(plan) => plan,
      Err(err) => {
        tracing::warn!(%city, %err, "trip-plan fetch failed, using fallback");
        TripPlan::fallback()
      }
    }
  }

  /// `GET /api/v1/plan/money-saving-tips` — falls back on any failure.
  /// `cities` is a comma-separated list of city names.
  pub async fn money_saving_tip(
    &self,
    cities: &str,
    trip_title: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> MoneySavingTip {
    let (start, end) = (start.to_string(), end.to_string());
    let query = [
      ("cities", cities),
      ("tripName", trip_title),
      ("startDate", start.as_str()),
      ("endDate", end.as_str()),
    ];
    match self.fetch("/api/v1/plan/money-saving-tips", &query).await {
      Ok(tip) => tip,
      Err(err) => {
        tracing::warn!(%err, "money-saving-tip fetch failed, using fallback");
        MoneySavingTip::fallback()
      }
    }
  }
}
