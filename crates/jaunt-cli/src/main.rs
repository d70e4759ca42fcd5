//! `jaunt` — trip planning and expense tracking from the terminal.
//!
//! # Usage
//!
//! ```text
//! jaunt trip new --title "Euro loop" --start 2026-05-01 --end 2026-05-20 --currency EUR
//! jaunt city add <trip-id> --name Paris --start 2026-05-01 --end 2026-05-05
//! jaunt item add <trip-id> <city-id> --kind hotel --title "Hotel du Nord" \
//!     --date-from 2026-05-01 --date-to 2026-05-04 --price 450 --paid
//! jaunt import <trip-id> bookings.csv
//! jaunt budget <trip-id>
//! jaunt export <trip-id> --format csv
//! ```
//!
//! Every mutating command loads the trip, applies one core mutation, saves,
//! and re-prints the recomputed budget.

mod enrich;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use jaunt_core::{
  budget::calculate_budget,
  mutate,
  store::TripStore,
  trip::{ItemKind, NewItem, Trip},
};
use jaunt_store_sqlite::SqliteStore;

use crate::enrich::EnrichClient;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "jaunt", about = "Trip planning and expense tracking")]
struct Args {
  /// Path to the SQLite database file.
  #[arg(long, env = "JAUNT_DB", default_value = "jaunt.db")]
  db: PathBuf,

  /// Base URL of the enrichment service (weather, trip plan, tips).
  #[arg(long, env = "JAUNT_ENRICH_URL", default_value = "http://localhost:3000")]
  enrich_url: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create, list, inspect, or delete trips.
  #[command(subcommand)]
  Trip(TripCmd),
  /// Add or remove city stays.
  #[command(subcommand)]
  City(CityCmd),
  /// Add, remove, or re-price items.
  #[command(subcommand)]
  Item(ItemCmd),
  /// Checklist notes on a trip.
  #[command(subcommand)]
  Note(NoteCmd),
  /// Bulk-import items from a comma-separated file.
  Import { trip_id: String, file: PathBuf },
  /// Print the recomputed budget for a trip.
  Budget { trip_id: String },
  /// Render a trip as text, JSON, or flattened CSV.
  Export {
    trip_id: String,
    #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
    format: ExportFormat,
  },
  /// Fetch weather for every city (attached to the trip) plus plan
  /// suggestions and a money-saving tip.
  Enrich { trip_id: String },
}

#[derive(Subcommand, Debug)]
enum TripCmd {
  New {
    #[arg(long)]
    title: String,
    #[arg(long)]
    start: NaiveDate,
    #[arg(long)]
    end: NaiveDate,
    #[arg(long, default_value = "USD")]
    currency: String,
  },
  List,
  Show { trip_id: String },
  Delete { trip_id: String },
}

#[derive(Subcommand, Debug)]
enum CityCmd {
  Add {
    trip_id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    start: NaiveDate,
    #[arg(long)]
    end: NaiveDate,
  },
  Rm { trip_id: String, city_id: String },
}

#[derive(Subcommand, Debug)]
enum ItemCmd {
  Add {
    trip_id: String,
    city_id: String,
    #[arg(long, value_parser = parse_kind)]
    kind: ItemKind,
    #[arg(long)]
    title: String,
    #[arg(long)]
    provider: Option<String>,
    #[arg(long)]
    date_from: NaiveDate,
    #[arg(long)]
    date_to: Option<NaiveDate>,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    paid: bool,
    /// Explicit partial amount; overrides --paid.
    #[arg(long)]
    paid_amount: Option<f64>,
    #[arg(long)]
    payer: Option<String>,
    #[arg(long)]
    booking_reference: Option<String>,
    #[arg(long)]
    booking_source: Option<String>,
    #[arg(long)]
    note: Option<String>,
  },
  Rm {
    trip_id: String,
    city_id: String,
    item_id: String,
  },
  /// Flip the paid flag; the paid amount follows (full price or zero).
  TogglePaid {
    trip_id: String,
    city_id: String,
    item_id: String,
  },
  /// Record a partial payment. Amounts above the price clamp to the price.
  SetPaidAmount {
    trip_id: String,
    city_id: String,
    item_id: String,
    amount: f64,
  },
}

#[derive(Subcommand, Debug)]
enum NoteCmd {
  Add {
    trip_id: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: Option<String>,
  },
  /// Toggle a note's completed flag.
  Done { trip_id: String, note_id: String },
  Rm { trip_id: String, note_id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
  Text,
  Json,
  Csv,
}

fn parse_kind(s: &str) -> Result<ItemKind, String> {
  ItemKind::parse(s)
    .ok_or_else(|| format!("invalid item type {s:?}; must be flight, hotel, or activity"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let store = SqliteStore::open(&args.db)
    .await
    .with_context(|| format!("opening database {}", args.db.display()))?;
  if !store.is_available().await {
    bail!("storage is not available at {}", args.db.display());
  }

  match args.command {
    Command::Trip(cmd) => run_trip(&store, cmd).await,
    Command::City(cmd) => run_city(&store, cmd).await,
    Command::Item(cmd) => run_item(&store, cmd).await,
    Command::Note(cmd) => run_note(&store, cmd).await,
    Command::Import { trip_id, file } => run_import(&store, &trip_id, &file).await,
    Command::Budget { trip_id } => {
      let trip = load_trip(&store, &trip_id).await?;
      render::print_budget(&calculate_budget(&trip), &trip.currency);
      Ok(())
    }
    Command::Export { trip_id, format } => {
      let trip = load_trip(&store, &trip_id).await?;
      let rendered = match format {
        ExportFormat::Text => jaunt_import::export::to_text(&trip),
        ExportFormat::Json => jaunt_import::export::to_json(&trip)?,
        ExportFormat::Csv => jaunt_import::export::to_csv(&trip)?,
      };
      print!("{rendered}");
      Ok(())
    }
    Command::Enrich { trip_id } => run_enrich(&store, &args.enrich_url, &trip_id).await,
  }
}

// ─── Command handlers ─────────────────────────────────────────────────────────

async fn load_trip(store: &SqliteStore, id: &str) -> Result<Trip> {
  store
    .get(id.to_string())
    .await
    .context("loading trip")?
    .with_context(|| format!("trip not found: {id}"))
}

/// Persist a mutated trip value and re-print its budget.
async fn save_and_report(store: &SqliteStore, trip: Trip) -> Result<()> {
  let saved = store.save(trip).await.context("saving trip")?;
  tracing::info!(trip_id = %saved.id, "trip saved");
  render::print_budget(&calculate_budget(&saved), &saved.currency);
  Ok(())
}

async fn run_trip(store: &SqliteStore, cmd: TripCmd) -> Result<()> {
  match cmd {
    TripCmd::New {
      title,
      start,
      end,
      currency,
    } => {
      let trip = mutate::create_trip(&title, start, end, &currency)?;
      let saved = store.save(trip).await.context("saving trip")?;
      println!("Created trip {}", saved.id);
      Ok(())
    }
    TripCmd::List => {
      let summaries = store.list_summaries().await.context("listing trips")?;
      render::print_summaries(&summaries);
      Ok(())
    }
    TripCmd::Show { trip_id } => {
      let trip = load_trip(store, &trip_id).await?;
      render::print_structure(&trip);
      render::print_budget(&calculate_budget(&trip), &trip.currency);
      Ok(())
    }
    TripCmd::Delete { trip_id } => {
      store.delete(trip_id).await.context("deleting trip")?;
      Ok(())
    }
  }
}

async fn run_city(store: &SqliteStore, cmd: CityCmd) -> Result<()> {
  match cmd {
    CityCmd::Add {
      trip_id,
      name,
      start,
      end,
    } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::add_city(&trip, &name, start, end)).await
    }
    CityCmd::Rm { trip_id, city_id } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::delete_city(&trip, &city_id)).await
    }
  }
}

async fn run_item(store: &SqliteStore, cmd: ItemCmd) -> Result<()> {
  match cmd {
    ItemCmd::Add {
      trip_id,
      city_id,
      kind,
      title,
      provider,
      date_from,
      date_to,
      price,
      paid,
      paid_amount,
      payer,
      booking_reference,
      booking_source,
      note,
    } => {
      let trip = load_trip(store, &trip_id).await?;
      let input = NewItem {
        kind,
        title,
        provider,
        date_from,
        date_to,
        price,
        paid,
        paid_amount,
        payer,
        booking_reference,
        booking_source,
        note,
      };
      save_and_report(store, mutate::add_item(&trip, &city_id, input)?).await
    }
    ItemCmd::Rm {
      trip_id,
      city_id,
      item_id,
    } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::delete_item(&trip, &city_id, &item_id)).await
    }
    ItemCmd::TogglePaid {
      trip_id,
      city_id,
      item_id,
    } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::toggle_item_paid(&trip, &city_id, &item_id)).await
    }
    ItemCmd::SetPaidAmount {
      trip_id,
      city_id,
      item_id,
      amount,
    } => {
      let trip = load_trip(store, &trip_id).await?;
      let patch = mutate::ItemPatch {
        paid_amount: Some(amount),
        ..mutate::ItemPatch::default()
      };
      save_and_report(store, mutate::update_item(&trip, &city_id, &item_id, &patch)?).await
    }
  }
}

async fn run_note(store: &SqliteStore, cmd: NoteCmd) -> Result<()> {
  match cmd {
    NoteCmd::Add {
      trip_id,
      title,
      description,
    } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::add_note(&trip, &title, description)?).await
    }
    NoteCmd::Done { trip_id, note_id } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::toggle_note_completed(&trip, &note_id)).await
    }
    NoteCmd::Rm { trip_id, note_id } => {
      let trip = load_trip(store, &trip_id).await?;
      save_and_report(store, mutate::delete_note(&trip, &note_id)).await
    }
  }
}

async fn run_import(store: &SqliteStore, trip_id: &str, file: &PathBuf) -> Result<()> {
  let text = std::fs::read_to_string(file)
    .with_context(|| format!("reading {}", file.display()))?;
  let table = jaunt_import::parse(&text).context("parsing import file")?;
  for warning in &table.skipped {
    eprintln!("warning: {warning}");
  }

  let trip = load_trip(store, trip_id).await?;
  let outcome = jaunt_import::resolve(&trip, &table.rows);
  for error in &outcome.errors {
    eprintln!("error: {error}");
  }

  // Partial imports still persist whatever succeeded.
  let saved = store.save(outcome.trip).await.context("saving trip")?;
  println!(
    "Imported {} items into {} ({} errors)",
    outcome.items_imported,
    saved.title,
    outcome.errors.len()
  );
  render::print_budget(&calculate_budget(&saved), &saved.currency);
  if !outcome.errors.is_empty() {
    bail!("import finished with {} row errors", outcome.errors.len());
  }
  Ok(())
}

async fn run_enrich(store: &SqliteStore, base_url: &str, trip_id: &str) -> Result<()> {
  let client = EnrichClient::new(base_url.to_string())?;
  let mut trip = load_trip(store, trip_id).await?;

  let cities: Vec<(String, String)> = trip
    .cities
    .iter()
    .map(|c| (c.id.clone(), c.name.clone()))
    .collect();

  for (city_id, city_name) in &cities {
    let report = client
      .weather(city_name, &trip.title, trip.start_date, trip.end_date)
      .await;
    let payload = serde_json::to_value(&report).context("encoding weather payload")?;
    trip = mutate::update_city(&trip, city_id, &mutate::CityPatch {
      weather: Some(payload),
      ..mutate::CityPatch::default()
    });
    println!("{city_name}: {} {}°, {}", report.condition, report.temperature, report.forecast);

    let plan = client
      .trip_plan(city_name, &trip.title, trip.start_date, trip.end_date)
      .await;
    println!("  {} {}: {}", plan.icon, plan.title, plan.activities);
  }

  let names: Vec<&str> = cities.iter().map(|(_, name)| name.as_str()).collect();
  let tip = client
    .money_saving_tip(&names.join(","), &trip.title, trip.start_date, trip.end_date)
    .await;
  println!("Tip: {}", tip.tip);

  store.save(trip).await.context("saving trip")?;
  Ok(())
}
