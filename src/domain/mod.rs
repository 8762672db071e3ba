//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned arrival records and tables (`ArrivalRecord`, `CleanTable`)
//! - monthly series and labelled forecast output (`MonthlySeries`, `ForecastResult`)
//! - engine configuration enums (`TrendMode`, `GapFill`, `SmoothingMode`)
//! - static reference tables (`CountryNameMap`, `SegmentRatioMap`)

pub mod month;
pub mod reference;
pub mod types;

pub use month::*;
pub use reference::*;
pub use types::*;
