//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> derive segment estimate -> forecast total and segment (in parallel)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::{LoadOutcome, Loader, TableCache, DataSource};
use crate::domain::{
    ARRIVALS, CleanTable, CountryNameMap, ForecastResult, PipelineConfig, SEGMENT_ESTIMATE,
    SegmentRatioMap,
};
use crate::error::AppError;
use crate::forecast::{ForecastError, forecast};
use crate::segment::with_segment_estimate;

/// All computed outputs of a single run.
///
/// The two forecasts are independent: one failing never hides the other.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub source: String,
    /// Cleaned table including the derived `segment_estimate` column.
    pub table: CleanTable,
    /// Why the table is empty, when it is.
    pub diagnostic: Option<String>,
    pub total: Result<ForecastResult, ForecastError>,
    pub segment: Result<ForecastResult, ForecastError>,
}

/// Build the segment table for `config` (validates the default weight).
pub fn segment_ratios(config: &PipelineConfig) -> Result<SegmentRatioMap, AppError> {
    SegmentRatioMap::with_default(config.segment_default)
}

/// Load through `cache` (when given) and run the full pipeline.
pub fn run_pipeline(config: &PipelineConfig, cache: Option<&mut TableCache>) -> Result<PipelineOutput, AppError> {
    let ratios = segment_ratios(config)?;
    let outcome = load_table(config, cache);
    Ok(run_pipeline_with_outcome(config, &ratios, outcome))
}

/// Fetch (or reuse) the cleaned table for `config.source`.
pub fn load_table(config: &PipelineConfig, cache: Option<&mut TableCache>) -> LoadOutcome {
    let source = DataSource::parse(&config.source);
    let loader = Loader::new(config.timeout, config.min_year, CountryNameMap::default());
    match cache {
        Some(cache) => cache.get_or_load(&source.id(), || loader.load(&source)),
        None => loader.load(&source),
    }
}

/// Execute the pipeline with a pre-loaded table.
///
/// This is useful for the TUI where we want to re-forecast without re-fetching.
pub fn run_pipeline_with_outcome(
    config: &PipelineConfig,
    ratios: &SegmentRatioMap,
    outcome: LoadOutcome,
) -> PipelineOutput {
    let LoadOutcome {
        source,
        table,
        diagnostic,
    } = outcome;

    if table.is_empty() {
        return PipelineOutput {
            source,
            table,
            diagnostic,
            total: Err(ForecastError::NoData),
            segment: Err(ForecastError::NoData),
        };
    }

    let table = with_segment_estimate(&table, ratios);
    let (total, segment) = rayon::join(
        || forecast(&table, ARRIVALS, &config.forecast),
        || forecast(&table, SEGMENT_ESTIMATE, &config.forecast),
    );

    for (name, result) in [(ARRIVALS, &total), (SEGMENT_ESTIMATE, &segment)] {
        match result {
            Ok(r) => {
                for w in &r.warnings {
                    log::warn!("{name}: {w}");
                }
            }
            Err(err) => log::error!("{name}: forecast unavailable: {err}"),
        }
    }

    PipelineOutput {
        source,
        table,
        diagnostic,
        total,
        segment,
    }
}
