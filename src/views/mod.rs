//! Presentation views over pipeline output.
//!
//! Each view consumes only the core outputs it needs and exposes the same
//! capability set (`Renderable`). Front-ends (text report, TUI) render any
//! view without knowing which one it is.

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::pipeline::PipelineOutput;
use crate::domain::{PipelineConfig, SeriesLabel};

pub mod demographics;
pub mod forecast_view;
pub mod segment_view;

pub use demographics::DemographicsView;
pub use forecast_view::{ChartMode, ForecastView};
pub use segment_view::SegmentView;

/// One headline number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// Short caption shown next to the value.
    pub note: Option<String>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A monthly line labelled Actual or AI Forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: SeriesLabel,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Values of one bar series, aligned with `ChartData::Bars::categories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    Lines {
        title: String,
        y_label: String,
        series: Vec<LineSeries>,
    },
    Bars {
        title: String,
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    /// Inputs missing: show "no chart data" with the reason.
    Unavailable { reason: String },
}

impl ChartData {
    pub fn is_available(&self) -> bool {
        !matches!(self, ChartData::Unavailable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Capability set shared by every view.
pub trait Renderable {
    fn title(&self) -> String;
    fn metrics(&self) -> Vec<Metric>;
    fn chart(&self) -> ChartData;
    /// Optional detail table below the chart.
    fn table(&self) -> Option<TableData>;
}

/// All three views over one pipeline run, in display order.
pub fn all_views<'a>(
    output: &'a PipelineOutput,
    config: &PipelineConfig,
    mode: ChartMode,
) -> Vec<Box<dyn Renderable + 'a>> {
    let year = chrono::Datelike::year(&config.forecast.horizon_end);
    vec![
        Box::new(ForecastView::new(&output.total, year, mode)),
        Box::new(DemographicsView::new(&output.table, config.top_n)),
        Box::new(SegmentView::new(&output.total, &output.segment, year)),
    ]
}

/// Format a count in millions, e.g. `12.35 M`.
pub fn millions(v: f64) -> String {
    format!("{:.2} M", v / 1e6)
}

/// Format a count with thousands separators, e.g. `1,234,567`.
pub fn thousands(v: f64) -> String {
    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// Split labelled points into one line per label (Actual first).
pub fn line_series(points: impl IntoIterator<Item = (NaiveDate, f64, SeriesLabel)>) -> Vec<LineSeries> {
    let mut actual = Vec::new();
    let mut forecast = Vec::new();
    for (d, v, label) in points {
        match label {
            SeriesLabel::Actual => actual.push((d, v)),
            SeriesLabel::Forecast => forecast.push((d, v)),
        }
    }
    let mut out = Vec::new();
    if !actual.is_empty() {
        out.push(LineSeries {
            label: SeriesLabel::Actual,
            points: actual,
        });
    }
    if !forecast.is_empty() {
        out.push(LineSeries {
            label: SeriesLabel::Forecast,
            points: forecast,
        });
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1234567.4), "1,234,567");
        assert_eq!(thousands(-12345.0), "-12,345");
    }

    #[test]
    fn millions_has_two_decimals() {
        assert_eq!(millions(12_345_678.0), "12.35 M");
    }

    #[test]
    fn all_views_cover_three_pages() {
        let output = PipelineOutput {
            source: "test".to_string(),
            table: Default::default(),
            diagnostic: Some("offline".to_string()),
            total: Err(crate::forecast::ForecastError::NoData),
            segment: Err(crate::forecast::ForecastError::NoData),
        };
        let views = all_views(&output, &PipelineConfig::default(), ChartMode::Monthly);
        assert_eq!(views.len(), 3);
        for v in &views {
            assert!(!v.chart().is_available());
        }
    }
}
