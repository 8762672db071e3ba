//! Forecast-unavailable conditions.

use thiserror::Error;

/// Why a forecast could not be produced for one series.
///
/// Each series fails independently: an error here never affects another
/// series computed in the same run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The data engine returned an empty table.
    #[error("no data available")]
    NoData,

    /// The requested value column does not exist in the table.
    #[error("column `{0}` not found")]
    MissingColumn(String),

    /// No rows carried a value for the column.
    #[error("series is empty")]
    EmptySeries,

    #[error("insufficient data: need at least {needed} months, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The series carries no signal to fit (e.g. identically zero).
    #[error("degenerate series: {0}")]
    Degenerate(String),

    /// No parameter candidate produced a finite fit.
    #[error("model did not converge: {0}")]
    NonConvergence(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
