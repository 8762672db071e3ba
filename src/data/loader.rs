//! The data engine: fetch, decode, clean.
//!
//! `Loader::load` never fails. Any problem along the way (network, timeout,
//! malformed file, schema mismatch, bad date) is logged and reported through
//! `LoadOutcome::diagnostic` next to an empty table. Callers must read an empty
//! table as "pipeline unavailable", not as "zero arrivals".

use std::time::Duration;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::data::decode::{RawArrival, decode_bytes};
use crate::data::sample::generate_sample;
use crate::data::source::{DataClient, DataSource};
use crate::domain::{ArrivalRecord, CleanTable, CountryNameMap};
use crate::error::AppError;

/// Result of a load attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub source: String,
    pub table: CleanTable,
    /// Set when the load failed; `table` is then empty.
    pub diagnostic: Option<String>,
}

impl LoadOutcome {
    pub fn is_available(&self) -> bool {
        self.diagnostic.is_none() && !self.table.is_empty()
    }
}

pub struct Loader {
    timeout: Duration,
    min_year: i32,
    names: CountryNameMap,
}

impl Loader {
    pub fn new(timeout: Duration, min_year: i32, names: CountryNameMap) -> Self {
        Self {
            timeout,
            min_year,
            names,
        }
    }

    pub fn load(&self, source: &DataSource) -> LoadOutcome {
        match self.try_load(source) {
            Ok(table) => {
                log::info!("loaded {} rows from {source} (year >= {})", table.len(), self.min_year);
                LoadOutcome {
                    source: source.id(),
                    table,
                    diagnostic: None,
                }
            }
            Err(err) => {
                log::error!("data error ({source}): {err}");
                LoadOutcome {
                    source: source.id(),
                    table: CleanTable::default(),
                    diagnostic: Some(err.message().to_string()),
                }
            }
        }
    }

    fn try_load(&self, source: &DataSource) -> Result<CleanTable, AppError> {
        let raw = match source {
            DataSource::Remote(url) => {
                let client = DataClient::new(self.timeout)?;
                decode_bytes(client.fetch_bytes(url)?)?
            }
            DataSource::File(path) => {
                let body = std::fs::read(path).map_err(|e| {
                    AppError::new(2, format!("Failed to read '{}': {e}", path.display()))
                })?;
                decode_bytes(body.into())?
            }
            DataSource::Sample { seed } => generate_sample(*seed)?,
        };

        let rows_read = raw.len();
        let table = clean(raw, self.min_year, &self.names);
        log::debug!("{rows_read} rows decoded, {} kept", table.len());

        if table.is_empty() {
            return Err(AppError::new(
                3,
                format!("No rows at or after {} in {rows_read} decoded rows.", self.min_year),
            ));
        }
        Ok(table)
    }
}

/// Derive `year`, drop rows before `min_year`, resolve display names.
pub fn clean(raw: Vec<RawArrival>, min_year: i32, names: &CountryNameMap) -> CleanTable {
    let records = raw
        .into_iter()
        .filter(|r| r.date.year() >= min_year)
        .map(|r| ArrivalRecord {
            year: r.date.year(),
            country_name: names.lookup(&r.country).to_string(),
            date: r.date,
            country: r.country,
            arrivals: r.arrivals,
            extra: r.extra,
        })
        .collect();
    CleanTable::new(records)
}
