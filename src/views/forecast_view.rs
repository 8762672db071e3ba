//! Overall arrivals forecast for the horizon year.

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{ForecastResult, SeriesLabel};
use crate::forecast::ForecastError;
use crate::views::{ChartData, Metric, Renderable, TableData, line_series, millions, thousands};

/// Monthly chart starts here regardless of how much history was fitted.
const CHART_START: (i32, u32) = (2023, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    /// Arrivals per month.
    #[default]
    Monthly,
    /// Running total over the horizon year.
    Cumulative,
}

impl ChartMode {
    pub fn toggled(self) -> Self {
        match self {
            ChartMode::Monthly => ChartMode::Cumulative,
            ChartMode::Cumulative => ChartMode::Monthly,
        }
    }
}

pub struct ForecastView<'a> {
    total: &'a Result<ForecastResult, ForecastError>,
    year: i32,
    mode: ChartMode,
}

impl<'a> ForecastView<'a> {
    pub fn new(total: &'a Result<ForecastResult, ForecastError>, year: i32, mode: ChartMode) -> Self {
        Self { total, year, mode }
    }

    /// (confirmed YTD, predicted remainder, total) for the horizon year.
    pub fn year_totals(&self) -> Option<(f64, f64, f64)> {
        let r = self.total.as_ref().ok()?;
        let actual = r.year_total(self.year, SeriesLabel::Actual);
        let forecast = r.year_total(self.year, SeriesLabel::Forecast);
        Some((actual, forecast, actual + forecast))
    }
}

impl Renderable for ForecastView<'_> {
    fn title(&self) -> String {
        format!("Tourism Forecast ({})", self.year)
    }

    fn metrics(&self) -> Vec<Metric> {
        let r = match self.total {
            Ok(r) => r,
            Err(err) => return vec![Metric::new("Forecast", "unavailable").with_note(err.to_string())],
        };
        let actual = r.year_total(self.year, SeriesLabel::Actual);
        let forecast = r.year_total(self.year, SeriesLabel::Forecast);

        let mut out = vec![
            Metric::new("Confirmed Arrivals (YTD)", millions(actual)),
            Metric::new("Predicted Rest of Year", millions(forecast)),
            Metric::new(format!("TOTAL {} Projection", self.year), millions(actual + forecast))
                .with_note("Actual + Forecast"),
        ];
        for w in &r.warnings {
            out.push(Metric::new("Caveat", w.to_string()));
        }
        out
    }

    fn chart(&self) -> ChartData {
        let r = match self.total {
            Ok(r) => r,
            Err(err) => {
                return ChartData::Unavailable {
                    reason: err.to_string(),
                };
            }
        };
        let combined = r.combined();

        match self.mode {
            ChartMode::Monthly => {
                let start = NaiveDate::from_ymd_opt(CHART_START.0, CHART_START.1, 1).unwrap_or_default();
                let series = line_series(
                    combined
                        .iter()
                        .filter(|p| p.date >= start)
                        .map(|p| (p.date, p.value, p.label)),
                );
                if series.is_empty() {
                    return ChartData::Unavailable {
                        reason: format!("no data since {}-{:02}", CHART_START.0, CHART_START.1),
                    };
                }
                ChartData::Lines {
                    title: "Monthly Visitor Rate".to_string(),
                    y_label: "Visitors per Month".to_string(),
                    series,
                }
            }
            ChartMode::Cumulative => {
                let mut running = 0.0;
                let series = line_series(
                    combined
                        .iter()
                        .filter(|p| p.date.year() == self.year)
                        .map(|p| {
                            running += p.value;
                            (p.date, running, p.label)
                        })
                        .collect::<Vec<_>>(),
                );
                if series.is_empty() {
                    return ChartData::Unavailable {
                        reason: format!("no data for {}", self.year),
                    };
                }
                ChartData::Lines {
                    title: format!("Cumulative Arrivals {}", self.year),
                    y_label: "Total Visitors".to_string(),
                    series,
                }
            }
        }
    }

    fn table(&self) -> Option<TableData> {
        let r = self.total.as_ref().ok()?;
        let rows: Vec<Vec<String>> = r
            .combined()
            .iter()
            .filter(|p| p.date.year() == self.year)
            .map(|p| {
                vec![
                    p.date.format("%Y-%m").to_string(),
                    thousands(p.value),
                    p.label.display_name().to_string(),
                ]
            })
            .collect();
        if rows.is_empty() {
            return None;
        }
        Some(TableData {
            title: format!("Arrivals {}", self.year),
            headers: vec!["Month".to_string(), "Arrivals".to_string(), "Type".to_string()],
            rows,
        })
    }
}
