//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - actual months: `o`, joined by `-`
//! - forecast months: `*`, joined by `.`

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastResult, SeriesLabel};
use crate::views::{BarSeries, LineSeries, line_series};

/// Render Actual / AI Forecast lines on one grid.
pub fn render_ascii_plot(series: &[LineSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((d_min, d_max)) = date_range(series) else {
        return "Plot: no chart data\n".to_string();
    };
    let (x_min, x_max) = (month_ordinal(d_min), month_ordinal(d_max).max(month_ordinal(d_min) + 1.0));

    // Determine y-range from every plotted point.
    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw lines first (so markers can overlay).
    for s in series {
        let (line, _) = glyphs(s.label);
        let pts: Vec<(usize, usize)> = s
            .points
            .iter()
            .map(|&(d, v)| {
                (
                    map_x(month_ordinal(d), x_min, x_max, width),
                    map_y(v, y_min, y_max, height),
                )
            })
            .collect();
        for w in pts.windows(2) {
            draw_line(&mut grid, w[0].0, w[0].1, w[1].0, w[1].1, line);
        }
    }
    for s in series {
        let (_, marker) = glyphs(s.label);
        for &(d, v) in &s.points {
            let x = map_x(month_ordinal(d), x_min, x_max, width);
            let y = map_y(v, y_min, y_max, height);
            grid[y][x] = marker;
        }
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}..{} | y=[{y_min:.2}, {y_max:.2}]\n",
        d_min.format("%Y-%m"),
        d_max.format("%Y-%m"),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!(
        "o {}  * {}\n",
        SeriesLabel::Actual.display_name(),
        SeriesLabel::Forecast.display_name()
    ));

    out
}

/// Render a saved forecast (history + forecast) as a plot.
pub fn render_forecast_plot(result: &ForecastResult, width: usize, height: usize) -> String {
    let series = line_series(result.combined().into_iter().map(|p| (p.date, p.value, p.label)));
    render_ascii_plot(&series, width, height)
}

/// Horizontal bars, one row per category and series.
pub fn render_ascii_bars(categories: &[String], series: &[BarSeries], width: usize) -> String {
    let max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let label_w = categories.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let name_w = if series.len() > 1 {
        series.iter().map(|s| s.name.chars().count()).max().unwrap_or(0)
    } else {
        0
    };
    let bar_w = width.max(10);

    let mut out = String::new();
    for (i, cat) in categories.iter().enumerate() {
        for (k, s) in series.iter().enumerate() {
            let v = s.values.get(i).copied().unwrap_or(0.0);
            let len = if max > 0.0 {
                ((v / max) * bar_w as f64).round().max(0.0) as usize
            } else {
                0
            };
            let ch = if k == 0 { '#' } else { '=' };
            let label = if k == 0 { cat.as_str() } else { "" };
            let line = if name_w > 0 {
                format!(
                    "{label:<label_w$} {:<name_w$} {} {}",
                    s.name,
                    ch.to_string().repeat(len),
                    crate::views::thousands(v)
                )
            } else {
                format!("{label:<label_w$} {} {}", ch.to_string().repeat(len), crate::views::thousands(v))
            };
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

fn glyphs(label: SeriesLabel) -> (char, char) {
    match label {
        SeriesLabel::Actual => ('-', 'o'),
        SeriesLabel::Forecast => ('.', '*'),
    }
}

fn month_ordinal(d: NaiveDate) -> f64 {
    (d.year() * 12 + d.month0() as i32) as f64
}

fn date_range(series: &[LineSeries]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn y_range(series: &[LineSeries]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for s in series {
        for &(_, y) in &s.points {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = vec![
            LineSeries {
                label: SeriesLabel::Actual,
                points: vec![(ym(2024, 1), 0.0), (ym(2024, 2), 10.0)],
            },
            LineSeries {
                label: SeriesLabel::Forecast,
                points: vec![(ym(2024, 3), 10.0)],
            },
        ];

        let txt = render_ascii_plot(&series, 10, 5);
        let expected = concat!(
            "Plot: 2024-01..2024-03 | y=[-0.50, 10.50]\n",
            "     o   *\n",
            "    -     \n",
            "  --      \n",
            " -        \n",
            "o         \n",
            "o Actual  * AI Forecast\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_plots_placeholder() {
        assert_eq!(render_ascii_plot(&[], 20, 5), "Plot: no chart data\n");
    }

    #[test]
    fn bars_scale_to_widest_value() {
        let cats = vec!["Singapore".to_string(), "China".to_string()];
        let series = vec![BarSeries {
            name: "arrivals".to_string(),
            values: vec![2000.0, 1000.0],
        }];
        let txt = render_ascii_bars(&cats, &series, 10);
        assert_eq!(txt, "Singapore ########## 2,000\nChina     ##### 1,000\n");
    }
}
