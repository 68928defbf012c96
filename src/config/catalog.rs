//! Catalog seeding from config.toml
//!
//! The catalog file lists the game names to offer and, optionally, the first month
//! record to open on a fresh database:
//!
//! ```toml
//! game_names = ["Valorant", "Genshin Impact"]
//!
//! [initial_month]
//! name = "Month 1"
//! start_date = "2024-01-01T00:00:00Z"
//! ```

use crate::{
    context::TrackerContext,
    core::{Actor, NewMonthRecord, game_name},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Catalog file read when no explicit path is given.
pub const DEFAULT_CATALOG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Game names to make sure exist
    #[serde(default)]
    pub game_names: Vec<String>,
    /// Month record to open when the ledger is empty
    #[serde(default)]
    pub initial_month: Option<InitialMonthConfig>,
}

/// The first accounting period of a fresh database
#[derive(Debug, Deserialize, Clone)]
pub struct InitialMonthConfig {
    /// Display label
    pub name: String,
    /// RFC 3339 start date; defaults to the seeding time
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

/// What [`seed_catalog`] changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Number of game names inserted
    pub game_names_added: usize,
    /// Id of the month record opened, if any
    pub month_record_created: Option<i64>,
}

/// Loads the catalog from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the catalog from the default location ([`DEFAULT_CATALOG_PATH`])
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_catalog() -> Result<CatalogConfig> {
    load_catalog(DEFAULT_CATALOG_PATH)
}

/// Inserts missing game names and opens the initial month on an empty ledger.
///
/// Running it again changes nothing.
///
/// # Errors
/// Returns an error if a game name is invalid or a database operation fails.
pub async fn seed_catalog(ctx: &TrackerContext, catalog: &CatalogConfig) -> Result<SeedOutcome> {
    let actor = Actor::system();
    let mut outcome = SeedOutcome::default();

    for name in &catalog.game_names {
        if game_name::get_game_name_by_name(&ctx.database, name)
            .await?
            .is_some()
        {
            debug!(name = %name, "Game name already present");
            continue;
        }
        game_name::create_game_name(&ctx.database, &actor, name).await?;
        outcome.game_names_added += 1;
    }

    if let Some(initial) = &catalog.initial_month {
        if ctx.month_records.list_all().await?.is_empty() {
            let start_date = initial.start_date.unwrap_or_else(Utc::now);
            let record = ctx
                .month_records
                .create(NewMonthRecord::new(initial.name.clone(), start_date))
                .await?;
            outcome.month_record_created = Some(record.id);
        }
    }

    info!(
        game_names_added = outcome.game_names_added,
        month_record_created = ?outcome.month_record_created,
        "Catalog seeded"
    );
    Ok(outcome)
}
