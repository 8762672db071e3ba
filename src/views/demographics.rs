//! Nationality and gender breakdown of the latest year on record.

use std::collections::HashMap;

use crate::domain::{ARRIVALS_FEMALE, ARRIVALS_MALE, CleanTable};
use crate::views::{BarSeries, ChartData, Metric, Renderable, TableData, millions, thousands};

/// Only recent years are shown; older rows are still used for fitting.
pub const DISPLAY_MIN_YEAR: i32 = 2022;

pub struct DemographicsView<'a> {
    table: &'a CleanTable,
    top_n: usize,
}

/// Markets of the latest year ranked by arrivals.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketBreakdown {
    pub year: i32,
    pub total: f64,
    /// `(country_name, arrivals)`, largest first.
    pub top: Vec<(String, f64)>,
    /// `(male, female)` when the source carries a gender split.
    pub gender: Option<(f64, f64)>,
}

impl<'a> DemographicsView<'a> {
    pub fn new(table: &'a CleanTable, top_n: usize) -> Self {
        Self { table, top_n }
    }

    pub fn breakdown(&self) -> Option<MarketBreakdown> {
        let recent = self.table.since_year(DISPLAY_MIN_YEAR);
        let year = recent.latest_year()?;
        let rows: Vec<_> = recent.records.iter().filter(|r| r.year == year).collect();

        let mut by_country: HashMap<&str, f64> = HashMap::new();
        for r in &rows {
            *by_country.entry(r.country_name.as_str()).or_insert(0.0) += r.arrivals;
        }
        let total: f64 = by_country.values().sum();

        let mut ranked: Vec<(String, f64)> = by_country.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(self.top_n);

        let gender = if recent.has_column(ARRIVALS_MALE) && recent.has_column(ARRIVALS_FEMALE) {
            let male: f64 = rows.iter().filter_map(|r| r.value(ARRIVALS_MALE)).sum();
            let female: f64 = rows.iter().filter_map(|r| r.value(ARRIVALS_FEMALE)).sum();
            Some((male, female))
        } else {
            None
        };

        Some(MarketBreakdown {
            year,
            total,
            top: ranked,
            gender,
        })
    }
}

fn percent(part: f64, whole: f64) -> String {
    if whole > 0.0 {
        format!("{:.1}%", part / whole * 100.0)
    } else {
        "n/a".to_string()
    }
}

impl Renderable for DemographicsView<'_> {
    fn title(&self) -> String {
        "Nationality & Gender Breakdown".to_string()
    }

    fn metrics(&self) -> Vec<Metric> {
        let Some(b) = self.breakdown() else {
            return vec![Metric::new("Data", "unavailable")];
        };
        let mut out = vec![
            Metric::new("Latest Year", b.year.to_string()),
            Metric::new(format!("Arrivals ({})", b.year), millions(b.total)),
        ];
        if let Some((male, female)) = b.gender {
            let both = male + female;
            out.push(Metric::new("Male", percent(male, both)));
            out.push(Metric::new("Female", percent(female, both)));
        }
        out
    }

    fn chart(&self) -> ChartData {
        let Some(b) = self.breakdown() else {
            return ChartData::Unavailable {
                reason: format!("no rows since {DISPLAY_MIN_YEAR}"),
            };
        };
        ChartData::Bars {
            title: format!("Top {} Source Markets ({})", b.top.len(), b.year),
            categories: b.top.iter().map(|(name, _)| name.clone()).collect(),
            series: vec![BarSeries {
                name: "arrivals".to_string(),
                values: b.top.iter().map(|(_, v)| *v).collect(),
            }],
        }
    }

    fn table(&self) -> Option<TableData> {
        let b = self.breakdown()?;
        let rows = b
            .top
            .iter()
            .enumerate()
            .map(|(i, (name, v))| {
                vec![
                    (i + 1).to_string(),
                    name.clone(),
                    thousands(*v),
                    percent(*v, b.total),
                ]
            })
            .collect();
        Some(TableData {
            title: format!("Source Markets {}", b.year),
            headers: ["#", "Country", "Arrivals", "Share"].iter().map(|s| s.to_string()).collect(),
            rows,
        })
    }
}
