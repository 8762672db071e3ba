//! Read/write forecast bundle JSON files.
//!
//! A bundle is the "portable" representation of one run:
//! - run metadata (source, horizon, trend mode, gap policy)
//! - each forecast (history, forecast, fitted parameters, warnings)
//! - or the reason it was unavailable
//!
//! `tourcast plot --input` reads it back without refetching or refitting.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::PipelineOutput;
use crate::domain::{ForecastResult, GapFill, PipelineConfig, TrendMode};
use crate::error::AppError;
use crate::forecast::ForecastError;

/// One forecast, or why it is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BundleEntry {
    Ok { result: ForecastResult },
    Unavailable { reason: String },
}

impl BundleEntry {
    fn from_result(r: &Result<ForecastResult, ForecastError>) -> Self {
        match r {
            Ok(result) => BundleEntry::Ok { result: result.clone() },
            Err(err) => BundleEntry::Unavailable {
                reason: err.to_string(),
            },
        }
    }

    pub fn result(&self) -> Option<&ForecastResult> {
        match self {
            BundleEntry::Ok { result } => Some(result),
            BundleEntry::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub tool: String,
    pub source: String,
    pub horizon_end: NaiveDate,
    pub trend: TrendMode,
    pub gap_fill: GapFill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    pub total: BundleEntry,
    pub segment: BundleEntry,
}

impl ForecastBundle {
    pub fn from_output(output: &PipelineOutput, config: &PipelineConfig) -> Self {
        Self {
            tool: "tourcast".to_string(),
            source: output.source.clone(),
            horizon_end: config.forecast.horizon_end,
            trend: config.forecast.trend,
            gap_fill: config.forecast.gap_fill,
            diagnostic: output.diagnostic.clone(),
            total: BundleEntry::from_result(&output.total),
            segment: BundleEntry::from_result(&output.segment),
        }
    }
}

/// Write a bundle JSON file.
pub fn write_bundle_json(path: &Path, bundle: &ForecastBundle) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create bundle JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, bundle)
        .map_err(|e| AppError::new(2, format!("Failed to write bundle JSON: {e}")))?;

    log::info!("wrote {}", path.display());
    Ok(())
}

/// Read a bundle JSON file.
pub fn read_bundle_json(path: &Path) -> Result<ForecastBundle, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open bundle JSON '{}': {e}", path.display())))?;
    let bundle: ForecastBundle =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid bundle JSON: {e}")))?;
    Ok(bundle)
}
