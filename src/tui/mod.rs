//! Ratatui-based terminal dashboard.
//!
//! Three tabs (forecast, demographics, segment) render the same `Renderable`
//! views the text report prints. The table is fetched through a `TableCache`,
//! so refreshing inside the TTL does not hit the network again.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::app::pipeline::{self, PipelineOutput};
use crate::data::{DataSource, TableCache};
use crate::domain::{PipelineConfig, SegmentRatioMap, SeriesLabel, TrendMode};
use crate::error::AppError;
use crate::views::{BarSeries, ChartData, ChartMode, LineSeries, Renderable, all_views};

mod plotters_chart;

use plotters_chart::ForecastPlottersChart;

const TAB_TITLES: [&str; 3] = ["1 Forecast", "2 Demographics", "3 Segment"];

/// Start the TUI.
pub fn run(config: PipelineConfig) -> Result<(), AppError> {
    let ratios = pipeline::segment_ratios(&config)?;
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, ratios);
    app.refresh();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: PipelineConfig,
    ratios: SegmentRatioMap,
    cache: TableCache,
    tab: usize,
    mode: ChartMode,
    status: String,
    output: Option<PipelineOutput>,
}

impl App {
    fn new(config: PipelineConfig, ratios: SegmentRatioMap) -> Self {
        let cache = TableCache::new(config.cache_ttl);
        Self {
            config,
            ratios,
            cache,
            tab: 0,
            mode: ChartMode::Monthly,
            status: "Loading...".to_string(),
            output: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right => self.tab = (self.tab + 1) % TAB_TITLES.len(),
            KeyCode::BackTab | KeyCode::Left => self.tab = (self.tab + TAB_TITLES.len() - 1) % TAB_TITLES.len(),
            KeyCode::Char(c @ '1'..='3') => self.tab = (c as usize) - ('1' as usize),
            KeyCode::Char('c') => {
                self.mode = self.mode.toggled();
                self.status = format!("chart: {:?}", self.mode);
            }
            KeyCode::Char('t') => {
                self.config.forecast.trend = match self.config.forecast.trend {
                    TrendMode::Damped => TrendMode::Undamped,
                    TrendMode::Undamped => TrendMode::Damped,
                };
                self.refresh();
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('f') => {
                self.cache.invalidate(&DataSource::parse(&self.config.source).id());
                self.refresh();
            }
            _ => {}
        }
        false
    }

    /// Re-run the pipeline, reusing the cached table inside the TTL.
    fn refresh(&mut self) {
        let outcome = pipeline::load_table(&self.config, Some(&mut self.cache));
        let output = pipeline::run_pipeline_with_outcome(&self.config, &self.ratios, outcome);
        self.status = match &output.diagnostic {
            Some(diag) => format!("Could not load data: {diag}"),
            None => format!("{} rows | trend: {:?}", output.table.len(), self.config.forecast.trend),
        };
        self.output = Some(output);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_tabs(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!(
            "tourcast | {} | horizon {}",
            self.output.as_ref().map(|o| o.source.as_str()).unwrap_or("-"),
            self.config.forecast.horizon_end.format("%Y-%m"),
        );
        let tabs = Tabs::new(TAB_TITLES.iter().map(|t| Line::from(*t)).collect::<Vec<_>>())
            .select(self.tab)
            .block(Block::default().title(title).borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(output) = &self.output else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let views = all_views(output, &self.config, self.mode);
        let Some(view) = views.get(self.tab) else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(area);
        draw_metrics(frame, chunks[0], view.as_ref());

        let lower = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);
        draw_chart(frame, lower[0], view.chart());
        draw_table(frame, lower[1], view.as_ref());
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ tab  1-3 jump  c cumulative  t damping  r refresh  f refetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_metrics(frame: &mut ratatui::Frame<'_>, area: Rect, view: &dyn Renderable) {
    let lines: Vec<Line> = view
        .metrics()
        .into_iter()
        .map(|m| {
            let mut spans = vec![
                Span::styled(format!("{}: ", m.label), Style::default().fg(Color::Gray)),
                Span::styled(m.value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            ];
            if let Some(note) = m.note {
                spans.push(Span::styled(format!("  ({note})"), Style::default().fg(Color::DarkGray)));
            }
            Line::from(spans)
        })
        .collect();
    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().title(view.title()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, chart: ChartData) {
    match chart {
        ChartData::Lines { title, y_label, series } => {
            let block = Block::default().title(title).borders(Borders::ALL);
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(Clear, inner);

            let (actual, forecast, x_bounds, y_bounds) = chart_series(&series);
            let widget = ForecastPlottersChart {
                actual: &actual,
                forecast: &forecast,
                x_bounds,
                y_bounds,
                y_label: &y_label,
                fmt_x: fmt_axis_month,
                fmt_y: fmt_axis_count,
            };
            frame.render_widget(widget, inner);
        }
        ChartData::Bars {
            title,
            categories,
            series,
        } => {
            let bars = bar_chart(&title, &categories, &series);
            frame.render_widget(bars, area);
        }
        ChartData::Unavailable { reason } => {
            let msg = Paragraph::new(format!("No chart data: {reason}"))
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Chart").borders(Borders::ALL));
            frame.render_widget(msg, area);
        }
    }
}

fn draw_table(frame: &mut ratatui::Frame<'_>, area: Rect, view: &dyn Renderable) {
    let (title, body) = match view.table() {
        Some(t) => (t.title.clone(), crate::report::format_table(&t)),
        None => ("Detail".to_string(), "-".to_string()),
    };
    let p = Paragraph::new(body).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn bar_chart<'a>(title: &'a str, categories: &'a [String], series: &'a [BarSeries]) -> BarChart<'a> {
    let colors = [Color::Cyan, Color::Rgb(255, 165, 0)];
    let mut chart = BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .bar_gap(0)
        .group_gap(1);

    if series.len() == 1 {
        // Ranked categories read better as horizontal bars.
        let bars: Vec<Bar> = categories
            .iter()
            .zip(&series[0].values)
            .map(|(c, &v)| {
                Bar::default()
                    .value(v.max(0.0).round() as u64)
                    .label(Line::from(c.as_str()))
                    .text_value(crate::views::thousands(v))
                    .style(Style::default().fg(colors[0]))
            })
            .collect();
        chart = chart
            .direction(Direction::Horizontal)
            .bar_width(1)
            .data(BarGroup::default().bars(&bars));
    } else {
        chart = chart.bar_width(5);
        for (i, c) in categories.iter().enumerate() {
            let bars: Vec<Bar> = series
                .iter()
                .enumerate()
                .map(|(k, s)| {
                    let v = s.values.get(i).copied().unwrap_or(0.0);
                    Bar::default()
                        .value(v.max(0.0).round() as u64)
                        .text_value(fmt_axis_count(v))
                        .style(Style::default().fg(colors[k % colors.len()]))
                })
                .collect();
            chart = chart.data(BarGroup::default().label(Line::from(c.as_str())).bars(&bars));
        }
    }
    chart
}

fn month_ordinal(d: NaiveDate) -> f64 {
    (d.year() * 12 + d.month0() as i32) as f64
}

/// Split line series into plotter coordinates plus padded bounds.
fn chart_series(series: &[LineSeries]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let to_xy = |s: &LineSeries| s.points.iter().map(|&(d, v)| (month_ordinal(d), v)).collect::<Vec<_>>();
    let mut actual = Vec::new();
    let mut forecast = Vec::new();
    for s in series {
        match s.label {
            SeriesLabel::Actual => actual = to_xy(s),
            SeriesLabel::Forecast => forecast = to_xy(s),
        }
    }

    let all = actual.iter().chain(forecast.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in all {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !x_min.is_finite() || x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = y_max.max(1.0);
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    (actual, forecast, [x_min, x_max], [y_min - pad, y_max + pad])
}

fn fmt_axis_month(v: f64) -> String {
    let ord = v.round() as i32;
    format!("{}-{:02}", ord.div_euclid(12), ord.rem_euclid(12) + 1)
}

fn fmt_axis_count(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_month_roundtrips_ordinal() {
        let d = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(fmt_axis_month(month_ordinal(d)), "2026-12");
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(fmt_axis_month(month_ordinal(d)), "2024-01");
    }

    #[test]
    fn axis_count_is_compact() {
        assert_eq!(fmt_axis_count(2_500_000.0), "2.5M");
        assert_eq!(fmt_axis_count(12_300.0), "12k");
        assert_eq!(fmt_axis_count(42.0), "42");
    }

    #[test]
    fn chart_series_bounds_cover_both_lines() {
        let d = |m| NaiveDate::from_ymd_opt(2026, m, 1).unwrap();
        let series = vec![
            LineSeries {
                label: SeriesLabel::Actual,
                points: vec![(d(1), 10.0), (d(2), 20.0)],
            },
            LineSeries {
                label: SeriesLabel::Forecast,
                points: vec![(d(3), 30.0)],
            },
        ];
        let (actual, forecast, xb, yb) = chart_series(&series);
        assert_eq!(actual.len(), 2);
        assert_eq!(forecast.len(), 1);
        assert_eq!(xb, [month_ordinal(d(1)), month_ordinal(d(3))]);
        assert!(yb[0] < 10.0 && yb[1] > 30.0);
    }

    #[test]
    fn keys_switch_tabs_and_modes() {
        let config = PipelineConfig {
            source: "sample".to_string(),
            ..PipelineConfig::default()
        };
        let mut app = App::new(config, SegmentRatioMap::default());
        assert!(!app.handle_key(KeyCode::Char('3')));
        assert_eq!(app.tab, 2);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.tab, 0);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.tab, 2);
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.mode, ChartMode::Cumulative);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
