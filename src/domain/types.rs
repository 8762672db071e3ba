//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the data engine, the forecast engine and the views
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column name of the raw arrival counts.
pub const ARRIVALS: &str = "arrivals";

/// Optional passthrough columns with the gender split of `arrivals`.
pub const ARRIVALS_MALE: &str = "arrivals_male";
pub const ARRIVALS_FEMALE: &str = "arrivals_female";

/// Column name of the derived segment estimate (see `segment`).
pub const SEGMENT_ESTIMATE: &str = "segment_estimate";

/// Official upstream dataset (monthly arrivals by state of entry).
pub const DEFAULT_SOURCE: &str = "https://storage.data.gov.my/demography/arrivals_soe.parquet";

/// Earlier data does not reflect stable pre-disruption seasonality.
pub const DEFAULT_MIN_YEAR: i32 = 2019;

/// One cleaned `(date, country)` observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub date: NaiveDate,
    pub year: i32,
    /// Raw code (usually ISO-3) or free-text name as found upstream.
    pub country: String,
    /// Display name resolved through `CountryNameMap`.
    pub country_name: String,
    pub arrivals: f64,
    /// Passthrough numeric columns (and derived ones), keyed by column name.
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl ArrivalRecord {
    /// Resolve a numeric column by name.
    pub fn value(&self, column: &str) -> Option<f64> {
        if column == ARRIVALS {
            Some(self.arrivals)
        } else {
            self.extra.get(column).copied()
        }
    }
}

/// The cleaned table produced by the data engine.
///
/// Transformations never mutate a table in place; they return a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanTable {
    pub records: Vec<ArrivalRecord>,
}

impl CleanTable {
    pub fn new(records: Vec<ArrivalRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when at least one record carries `column`.
    pub fn has_column(&self, column: &str) -> bool {
        if column == ARRIVALS {
            return !self.records.is_empty();
        }
        self.records.iter().any(|r| r.extra.contains_key(column))
    }

    /// Latest calendar year present in the table.
    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }

    /// A new table restricted to rows with `year >= min_year`.
    pub fn since_year(&self, min_year: i32) -> CleanTable {
        CleanTable::new(
            self.records
                .iter()
                .filter(|r| r.year >= min_year)
                .cloned()
                .collect(),
        )
    }

    /// A new table with `column` set on every record from `f`.
    pub fn with_column(&self, column: &str, f: impl Fn(&ArrivalRecord) -> f64) -> CleanTable {
        let records = self
            .records
            .iter()
            .map(|r| {
                let mut out = r.clone();
                out.extra.insert(column.to_string(), f(r));
                out
            })
            .collect();
        CleanTable::new(records)
    }
}

/// A contiguous monthly series: one value per calendar month starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    /// First month (day-of-month is always 1).
    pub start: NaiveDate,
    pub values: Vec<f64>,
    /// Interior months that had no rows and were filled by the gap policy.
    pub filled: usize,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Month of the `idx`-th value.
    pub fn month(&self, idx: usize) -> NaiveDate {
        crate::domain::add_months(self.start, idx as i32)
    }

    /// Last observed month.
    pub fn last_month(&self) -> Option<NaiveDate> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.month(self.values.len() - 1))
        }
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().enumerate().map(|(i, &v)| (self.month(i), v))
    }
}

/// Which side of the history/forecast split a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesLabel {
    #[serde(rename = "Actual")]
    Actual,
    #[serde(rename = "AI Forecast")]
    Forecast,
}

impl SeriesLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesLabel::Actual => "Actual",
            SeriesLabel::Forecast => "AI Forecast",
        }
    }
}

/// One labelled monthly value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    #[serde(rename = "type")]
    pub label: SeriesLabel,
}

/// Smoothing coefficients the model was actually run with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Trend damping factor (1.0 when undamped).
    pub phi: f64,
    pub sse: f64,
    pub rmse: f64,
}

/// Non-fatal conditions surfaced alongside a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastWarning {
    /// Fewer than two full seasonal cycles; the seasonal fit is unreliable.
    ShortHistory { months: usize, recommended: usize },
    /// Interior months with no rows were filled by the gap policy.
    GapsFilled { months: usize, policy: GapFill },
}

impl std::fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastWarning::ShortHistory { months, recommended } => write!(
                f,
                "only {months} months of history (< {recommended}); seasonal fit is unreliable"
            ),
            ForecastWarning::GapsFilled { months, policy } => {
                write!(f, "{months} missing month(s) filled ({})", policy.display_name())
            }
        }
    }
}

/// Output of one forecast run: disjoint history and forecast tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub value_column: String,
    pub history: Vec<ForecastPoint>,
    pub forecast: Vec<ForecastPoint>,
    /// `None` when the horizon was already reached and no model was fitted.
    pub fit: Option<FittedParams>,
    #[serde(default)]
    pub warnings: Vec<ForecastWarning>,
}

impl ForecastResult {
    /// History followed by forecast, ordered by month.
    pub fn combined(&self) -> Vec<ForecastPoint> {
        let mut out = Vec::with_capacity(self.history.len() + self.forecast.len());
        out.extend(self.history.iter().copied());
        out.extend(self.forecast.iter().copied());
        out.sort_by_key(|p| p.date);
        out
    }

    /// Sum of values with `label` falling in calendar `year`.
    pub fn year_total(&self, year: i32, label: SeriesLabel) -> f64 {
        let src = match label {
            SeriesLabel::Actual => &self.history,
            SeriesLabel::Forecast => &self.forecast,
        };
        src.iter()
            .filter(|p| p.date.year() == year)
            .map(|p| p.value)
            .sum()
    }
}

/// How the trend is extrapolated over the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    /// The projected trend flattens asymptotically (`0 < φ < 1`).
    Damped,
    /// The trend continues linearly (`φ = 1`).
    Undamped,
}

/// How missing interior months are filled before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GapFill {
    /// Repeat the previous observed month (avoids artificial seasonal dips).
    ForwardFill,
    /// Treat the month as zero arrivals.
    Zero,
}

impl GapFill {
    pub fn display_name(self) -> &'static str {
        match self {
            GapFill::ForwardFill => "forward-fill",
            GapFill::Zero => "zero-fill",
        }
    }
}

/// CLI-facing choice for smoothing coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMode {
    /// Fix α and β; search γ (and φ when damped).
    Fixed,
    /// Search α, β, γ (and φ when damped).
    Auto,
}

/// Resolved smoothing policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SmoothingPolicy {
    Fixed { alpha: f64, beta: f64 },
    Auto,
}

impl Default for SmoothingPolicy {
    fn default() -> Self {
        SmoothingPolicy::Fixed {
            alpha: 0.3,
            beta: 0.1,
        }
    }
}

/// Knobs of the forecast engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Target month, inclusive (day-of-month ignored).
    pub horizon_end: NaiveDate,
    pub trend: TrendMode,
    pub smoothing: SmoothingPolicy,
    pub gap_fill: GapFill,
    pub seasonal_period: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_end: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap_or_default(),
            trend: TrendMode::Damped,
            smoothing: SmoothingPolicy::default(),
            gap_fill: GapFill::ForwardFill,
            seasonal_period: 12,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags and environment (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source identifier: URL, local path, or `sample[:seed]`.
    pub source: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub min_year: i32,
    /// Fallback weight for countries missing from the segment table.
    pub segment_default: f64,
    pub forecast: ForecastConfig,
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            min_year: DEFAULT_MIN_YEAR,
            segment_default: crate::domain::DEFAULT_SEGMENT_WEIGHT,
            forecast: ForecastConfig::default(),
            top_n: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: (i32, u32), country: &str, arrivals: f64) -> ArrivalRecord {
        ArrivalRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, 1).unwrap(),
            year: date.0,
            country: country.to_string(),
            country_name: country.to_string(),
            arrivals,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn with_column_returns_new_table() {
        let table = CleanTable::new(vec![record((2020, 1), "SGP", 10.0)]);
        let derived = table.with_column("double", |r| r.arrivals * 2.0);

        assert!(!table.has_column("double"));
        assert_eq!(derived.records[0].value("double"), Some(20.0));
        assert_eq!(derived.records[0].value(ARRIVALS), Some(10.0));
    }

    #[test]
    fn combined_is_month_ordered() {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let result = ForecastResult {
            value_column: ARRIVALS.to_string(),
            history: vec![
                ForecastPoint { date: d(1), value: 1.0, label: SeriesLabel::Actual },
                ForecastPoint { date: d(2), value: 2.0, label: SeriesLabel::Actual },
            ],
            forecast: vec![ForecastPoint { date: d(3), value: 3.0, label: SeriesLabel::Forecast }],
            fit: None,
            warnings: Vec::new(),
        };

        let dates: Vec<_> = result.combined().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(result.year_total(2024, SeriesLabel::Actual), 3.0);
        assert_eq!(result.year_total(2024, SeriesLabel::Forecast), 3.0);
    }

    #[test]
    fn label_serializes_with_display_names() {
        let json = serde_json::to_string(&SeriesLabel::Forecast).unwrap();
        assert_eq!(json, "\"AI Forecast\"");
    }
}
