//! [`SqliteStore`] — the SQLite implementation of [`TripStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use jaunt_core::{
  store::TripStore,
  trip::{Trip, TripSummary},
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A jaunt trip store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TripStore impl ──────────────────────────────────────────────────────────

impl TripStore for SqliteStore {
  type Error = Error;

  async fn get(&self, id: String) -> Result<Option<Trip>> {
    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body_json FROM trips WHERE trip_id = ?1",
              rusqlite::params![id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    // Decoding runs through the core serde shims, so legacy records are
    // backfilled here on every read.
    body
      .map(|b| serde_json::from_str(&b))
      .transpose()
      .map_err(Error::Json)
  }

  async fn save(&self, trip: Trip) -> Result<Trip> {
    let mut stored = trip;
    stored.updated_at = Utc::now();

    let body = serde_json::to_string(&stored)?;
    let id = stored.id.clone();
    let title = stored.title.clone();
    let start = encode_date(stored.start_date);
    let end = encode_date(stored.end_date);
    let updated = encode_dt(stored.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO trips (trip_id, title, start_date, end_date, updated_at, body_json)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(trip_id) DO UPDATE SET
             title      = excluded.title,
             start_date = excluded.start_date,
             end_date   = excluded.end_date,
             updated_at = excluded.updated_at,
             body_json  = excluded.body_json",
          rusqlite::params![id, title, start, end, updated, body],
        )?;
        Ok(())
      })
      .await?;

    Ok(stored)
  }

  async fn list(&self) -> Result<Vec<Trip>> {
    let bodies: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT body_json FROM trips ORDER BY updated_at DESC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut bodies = Vec::new();
        for body in rows {
          bodies.push(body?);
        }
        Ok(bodies)
      })
      .await?;

    bodies
      .iter()
      .map(|b| serde_json::from_str(b).map_err(Error::Json))
      .collect()
  }

  async fn list_summaries(&self) -> Result<Vec<TripSummary>> {
    let raw: Vec<(String, String, String, String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT trip_id, title, start_date, end_date, updated_at
           FROM trips ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
          Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?;
        let mut raw = Vec::new();
        for row in rows {
          raw.push(row?);
        }
        Ok(raw)
      })
      .await?;

    raw
      .into_iter()
      .map(|(id, title, start, end, updated)| {
        Ok(TripSummary {
          id,
          title,
          start_date: decode_date(&start)?,
          end_date: decode_date(&end)?,
          updated_at: decode_dt(&updated)?,
        })
      })
      .collect()
  }

  async fn delete(&self, id: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM trips WHERE trip_id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn is_available(&self) -> bool {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await
      .is_ok()
  }
}

// ─── Column codecs ───────────────────────────────────────────────────────────

fn encode_date(d: NaiveDate) -> String { d.to_string() }

fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse()
    .map_err(|_| Error::DateParse(format!("bad calendar date: {s:?}")))
}

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}
