//! Segment estimation: the share of arrivals belonging to a demographic
//! sub-population, estimated per country from `SegmentRatioMap`.

use serde::{Deserialize, Serialize};

use crate::domain::{CleanTable, SEGMENT_ESTIMATE, SegmentRatioMap};

/// A new table with `segment_estimate = trunc(arrivals × weight(country_name))`.
pub fn with_segment_estimate(table: &CleanTable, ratios: &SegmentRatioMap) -> CleanTable {
    table.with_column(SEGMENT_ESTIMATE, |r| {
        (r.arrivals * ratios.weight(&r.country_name)).trunc()
    })
}

/// Segment total as a percentage of overall total.
///
/// The two totals come from independent forecasts, so the raw ratio can exceed
/// 100 %. It is then clamped and `clamped` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketShare {
    pub percent: f64,
    pub clamped: bool,
}

impl MarketShare {
    /// `None` when the total is not positive (share undefined).
    pub fn compute(segment_total: f64, total: f64) -> Option<MarketShare> {
        if !(total > 0.0) || !segment_total.is_finite() {
            return None;
        }
        let raw = (segment_total / total * 100.0).max(0.0);
        if raw > 100.0 {
            log::warn!("segment share {raw:.1}% exceeds 100%; clamped");
            Some(MarketShare { percent: 100.0, clamped: true })
        } else {
            Some(MarketShare { percent: raw, clamped: false })
        }
    }
}

impl std::fmt::Display for MarketShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.clamped {
            write!(f, "{:.1}% (clamped)", self.percent)
        } else {
            write!(f, "{:.1}%", self.percent)
        }
    }
}
