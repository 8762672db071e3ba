//! Forecast engine: monthly aggregation, Holt-Winters fitting and projection.
//!
//! The engine is stateless. Each call aggregates a value column of a cleaned
//! table into a contiguous monthly series, calibrates the smoothing model by a
//! deterministic grid search and projects it to the configured horizon.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod fitter;
pub mod grid;
pub mod holt_winters;

pub use aggregate::aggregate_monthly;
pub use engine::{forecast, forecast_series};
pub use error::ForecastError;
pub use fitter::{ModelFit, fit_model};
pub use grid::{linear_space, param_grid};
pub use holt_winters::{HwParams, HwState};
