//! Segment sub-market: projected segment arrivals and market share.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{ForecastResult, SeriesLabel};
use crate::forecast::ForecastError;
use crate::segment::MarketShare;
use crate::views::{BarSeries, ChartData, Metric, Renderable, TableData, millions, thousands};

/// Yearly comparison starts here.
pub const CHART_START_YEAR: i32 = 2022;

pub struct SegmentView<'a> {
    total: &'a Result<ForecastResult, ForecastError>,
    segment: &'a Result<ForecastResult, ForecastError>,
    year: i32,
}

impl<'a> SegmentView<'a> {
    pub fn new(
        total: &'a Result<ForecastResult, ForecastError>,
        segment: &'a Result<ForecastResult, ForecastError>,
        year: i32,
    ) -> Self {
        Self { total, segment, year }
    }

    /// Segment arrivals for the horizon year (actual YTD + forecast).
    pub fn projected(&self) -> Option<f64> {
        let s = self.segment.as_ref().ok()?;
        Some(s.year_total(self.year, SeriesLabel::Actual) + s.year_total(self.year, SeriesLabel::Forecast))
    }

    /// `None` when either forecast is unavailable or the total is not positive.
    pub fn market_share(&self) -> Option<MarketShare> {
        let t = self.total.as_ref().ok()?;
        let total = t.year_total(self.year, SeriesLabel::Actual) + t.year_total(self.year, SeriesLabel::Forecast);
        MarketShare::compute(self.projected()?, total)
    }

    /// `(year, actual, forecast)` sums from `CHART_START_YEAR`.
    pub fn yearly(&self) -> Vec<(i32, f64, f64)> {
        let Ok(s) = self.segment else {
            return Vec::new();
        };
        let mut years: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
        for p in s.combined().iter().filter(|p| p.date.year() >= CHART_START_YEAR) {
            let e = years.entry(p.date.year()).or_insert((0.0, 0.0));
            match p.label {
                SeriesLabel::Actual => e.0 += p.value,
                SeriesLabel::Forecast => e.1 += p.value,
            }
        }
        years.into_iter().map(|(y, (a, f))| (y, a, f)).collect()
    }
}

impl Renderable for SegmentView<'_> {
    fn title(&self) -> String {
        "Muslim Friendly Tourism Forecast".to_string()
    }

    fn metrics(&self) -> Vec<Metric> {
        let projected = match (self.segment, self.projected()) {
            (Ok(_), Some(v)) => Metric::new(format!("Projected Segment Arrivals ({})", self.year), millions(v)),
            (Err(err), _) => Metric::new("Segment Forecast", "unavailable").with_note(err.to_string()),
            (Ok(_), None) => Metric::new("Segment Forecast", "unavailable"),
        };
        let share = match self.market_share() {
            Some(share) => Metric::new("Market Share", share.to_string()).with_note("of Total Tourists"),
            None => Metric::new("Market Share", "n/a"),
        };
        vec![projected, share]
    }

    fn chart(&self) -> ChartData {
        if let Err(err) = self.segment {
            return ChartData::Unavailable {
                reason: err.to_string(),
            };
        }
        let yearly = self.yearly();
        if yearly.is_empty() {
            return ChartData::Unavailable {
                reason: format!("no data since {CHART_START_YEAR}"),
            };
        }
        ChartData::Bars {
            title: "Segment Arrivals: History vs AI Prediction".to_string(),
            categories: yearly.iter().map(|(y, _, _)| y.to_string()).collect(),
            series: vec![
                BarSeries {
                    name: SeriesLabel::Actual.display_name().to_string(),
                    values: yearly.iter().map(|(_, a, _)| *a).collect(),
                },
                BarSeries {
                    name: SeriesLabel::Forecast.display_name().to_string(),
                    values: yearly.iter().map(|(_, _, f)| *f).collect(),
                },
            ],
        }
    }

    fn table(&self) -> Option<TableData> {
        let s = self.segment.as_ref().ok()?;
        if s.forecast.is_empty() {
            return None;
        }
        Some(TableData {
            title: "Monthly AI Prediction".to_string(),
            headers: vec!["Month".to_string(), "Segment Estimate".to_string()],
            rows: s
                .forecast
                .iter()
                .map(|p| vec![p.date.format("%Y-%m").to_string(), thousands(p.value)])
                .collect(),
        })
    }
}
