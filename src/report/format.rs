//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the forecasting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::PipelineOutput;
use crate::domain::{ForecastResult, PipelineConfig};
use crate::forecast::ForecastError;
use crate::views::{ChartData, Renderable, TableData};

/// Plot dimensions for text rendering.
#[derive(Debug, Clone, Copy)]
pub struct PlotSize {
    pub width: usize,
    pub height: usize,
}

impl Default for PlotSize {
    fn default() -> Self {
        Self {
            width: 100,
            height: 20,
        }
    }
}

/// Format the run summary (source, table stats, fit diagnostics).
pub fn format_run_summary(output: &PipelineOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== tourcast - Tourism Arrivals Forecast ===\n");
    out.push_str(&format!("Source: {}\n", output.source));
    out.push_str(&format!(
        "Horizon: {} | trend={:?} | gap-fill={}\n",
        config.forecast.horizon_end.format("%Y-%m"),
        config.forecast.trend,
        config.forecast.gap_fill.display_name(),
    ));

    if let Some(diag) = &output.diagnostic {
        out.push_str(&format!("Data unavailable: {diag}\n"));
    } else {
        let first = output.table.records.iter().map(|r| r.date).min();
        let last = output.table.records.iter().map(|r| r.date).max();
        if let (Some(first), Some(last)) = (first, last) {
            out.push_str(&format!(
                "Rows: n={} | dates=[{}, {}] | year >= {}\n",
                output.table.len(),
                first,
                last,
                config.min_year,
            ));
        }
    }

    out.push_str("\nModel diagnostics:\n");
    out.push_str(&format_fit_line("total", &output.total));
    out.push_str(&format_fit_line("segment", &output.segment));
    out.push('\n');

    out
}

fn format_fit_line(name: &str, result: &Result<ForecastResult, ForecastError>) -> String {
    match result {
        Ok(r) => {
            let mut line = match &r.fit {
                Some(f) => format!(
                    "  {name:<8} alpha={:.2} beta={:.2} gamma={:.2} phi={:.2} RMSE={:.1} | history={} forecast={}\n",
                    f.alpha,
                    f.beta,
                    f.gamma,
                    f.phi,
                    f.rmse,
                    r.history.len(),
                    r.forecast.len(),
                ),
                None => format!(
                    "  {name:<8} (horizon reached, no fit) | history={}\n",
                    r.history.len()
                ),
            };
            for w in &r.warnings {
                line.push_str(&format!("           warning: {w}\n"));
            }
            line
        }
        Err(err) => format!("  {name:<8} forecast unavailable: {err}\n"),
    }
}

/// Format one view: title, metrics, chart, table.
pub fn format_view(view: &dyn Renderable, size: PlotSize) -> String {
    let mut out = String::new();
    let title = view.title();
    out.push_str(&format!("--- {title} ---\n"));

    let metrics = view.metrics();
    let label_w = metrics.iter().map(|m| m.label.chars().count()).max().unwrap_or(0);
    for m in &metrics {
        let line = match &m.note {
            Some(note) => format!("{:<label_w$}  {}  ({note})", m.label, m.value),
            None => format!("{:<label_w$}  {}", m.label, m.value),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push('\n');

    match view.chart() {
        ChartData::Lines { title, y_label, series } => {
            out.push_str(&format!("{title} ({y_label})\n"));
            out.push_str(&crate::plot::render_ascii_plot(&series, size.width, size.height));
        }
        ChartData::Bars {
            title,
            categories,
            series,
        } => {
            out.push_str(&format!("{title}\n"));
            out.push_str(&crate::plot::render_ascii_bars(&categories, &series, size.width / 2));
        }
        ChartData::Unavailable { reason } => {
            out.push_str(&format!("(no chart data: {reason})\n"));
        }
    }

    if let Some(table) = view.table() {
        out.push('\n');
        out.push_str(&format_table(&table));
    }

    out
}

/// Format a detail table with right-aligned numeric columns.
pub fn format_table(table: &TableData) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{}:\n", table.title));

    let header: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:<w$}"))
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join(" "));
    out.push('\n');

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, &w)| {
                if looks_numeric(c) {
                    format!("{c:>w$}")
                } else {
                    format!("{:<w$}", truncate(c, w))
                }
            })
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }

    out
}

fn looks_numeric(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    body.chars().any(|c| c.is_ascii_digit())
        && body.chars().all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '%'))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
