//! Command-line parsing for the tourism arrivals forecaster.
//!
//! Argument parsing and command dispatch live apart from the data and
//! forecasting code; `app` turns these structs into a `PipelineConfig`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_MIN_YEAR, GapFill, SmoothingMode, TrendMode};
use crate::views::ChartMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tourcast", version, about = "Tourism arrivals forecaster (Holt-Winters)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load, forecast, and print all three views.
    Report(ReportArgs),
    /// Run the pipeline and write the series CSV and/or the JSON bundle.
    Export(ExportArgs),
    /// Plot a previously exported JSON bundle.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    Tui(RunArgs),
}

/// Options shared by every command that runs the pipeline.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Data source: URL, local .parquet/.csv path, or `sample[:seed]`.
    /// Falls back to `TOURCAST_SOURCE`, then the public dataset.
    #[arg(long)]
    pub source: Option<String>,

    /// Last month to forecast (YYYY-MM).
    #[arg(long, default_value = "2026-12")]
    pub horizon: String,

    /// Drop rows before this year.
    #[arg(long, default_value_t = DEFAULT_MIN_YEAR)]
    pub min_year: i32,

    /// Trend extrapolation.
    #[arg(long, value_enum, default_value_t = TrendMode::Damped)]
    pub trend: TrendMode,

    /// Fixed α/β, or search them too.
    #[arg(long, value_enum, default_value_t = SmoothingMode::Fixed)]
    pub smoothing: SmoothingMode,

    /// Level smoothing for `--smoothing fixed`.
    #[arg(long, default_value_t = 0.3)]
    pub alpha: f64,

    /// Trend smoothing for `--smoothing fixed`.
    #[arg(long, default_value_t = 0.1)]
    pub beta: f64,

    /// How missing interior months are filled.
    #[arg(long, value_enum, default_value_t = GapFill::ForwardFill)]
    pub gap_fill: GapFill,

    /// Segment weight for countries not in the reference table.
    #[arg(long, default_value_t = crate::domain::DEFAULT_SEGMENT_WEIGHT)]
    pub segment_default: f64,

    /// HTTP timeout. Falls back to `TOURCAST_TIMEOUT_SECS`, then 30.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How long a loaded table is reused (TUI refresh).
    #[arg(long, default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Number of source markets in the demographics view.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

/// Options for the text report.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Forecast chart mode.
    #[arg(long, value_enum, default_value_t = ChartMode::Monthly)]
    pub mode: ChartMode,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for exporting a run.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Combined Actual / AI Forecast series as CSV.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Full forecast bundle as JSON (readable by `tourcast plot`).
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

/// Options for plotting a saved bundle.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Bundle JSON produced by `tourcast export --json`.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
