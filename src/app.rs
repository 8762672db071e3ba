//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments into a `PipelineConfig`
//! - runs the load + forecast pipeline
//! - prints views, writes exports, or starts the TUI

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, ExportArgs, PlotArgs, ReportArgs, RunArgs};
use crate::domain::{DEFAULT_SOURCE, ForecastConfig, PipelineConfig, SmoothingMode, SmoothingPolicy, parse_month};
use crate::error::AppError;
use crate::report::PlotSize;
use crate::views::all_views;

pub mod pipeline;

const ENV_SOURCE: &str = "TOURCAST_SOURCE";
const ENV_TIMEOUT: &str = "TOURCAST_TIMEOUT_SECS";

/// Entry point for the `tourcast` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    // `tourcast` and `tourcast --horizon 2026-06` behave like `tourcast report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let default_filter = match cli.command {
        Command::Tui(_) => "warn",
        _ => "info",
    };
    init_logging(default_filter);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(pipeline_config_from_args(&args, &EnvDefaults::from_env())?),
    }
}

fn init_logging(default_filter: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let _ = pretty_env_logger::formatted_builder().parse_filters(&filter).try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.run, &EnvDefaults::from_env())?;
    let output = pipeline::run_pipeline(&config, None)?;

    println!("{}", crate::report::format_run_summary(&output, &config));
    let size = PlotSize {
        width: args.width,
        height: args.height,
    };
    for view in all_views(&output, &config, args.mode) {
        println!("{}", crate::report::format_view(view.as_ref(), size));
    }

    no_data_check(&output)
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.json.is_none() {
        return Err(AppError::new(2, "Nothing to export: pass --csv and/or --json"));
    }
    let config = pipeline_config_from_args(&args.run, &EnvDefaults::from_env())?;
    let output = pipeline::run_pipeline(&config, None)?;

    if let Some(path) = &args.csv {
        crate::io::write_series_csv(path, &output)?;
    }
    if let Some(path) = &args.json {
        let bundle = crate::io::ForecastBundle::from_output(&output, &config);
        crate::io::write_bundle_json(path, &bundle)?;
    }

    no_data_check(&output)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let bundle = crate::io::read_bundle_json(&args.input)?;

    println!(
        "Source: {} | horizon {} | trend={:?}",
        bundle.source,
        bundle.horizon_end.format("%Y-%m"),
        bundle.trend
    );
    for (name, entry) in [("Total arrivals", &bundle.total), ("Segment estimate", &bundle.segment)] {
        println!("\n{name}");
        match entry.result() {
            Some(result) => println!("{}", crate::plot::render_forecast_plot(result, args.width, args.height)),
            None => println!("(no chart data: {})", unavailable_reason(entry)),
        }
    }
    Ok(())
}

fn unavailable_reason(entry: &crate::io::BundleEntry) -> &str {
    match entry {
        crate::io::BundleEntry::Unavailable { reason } => reason,
        crate::io::BundleEntry::Ok { .. } => "",
    }
}

/// Everything is printed/written first; an empty table still fails the run.
fn no_data_check(output: &pipeline::PipelineOutput) -> Result<(), AppError> {
    if output.table.is_empty() {
        let reason = output.diagnostic.as_deref().unwrap_or("source contained no rows");
        return Err(AppError::new(3, format!("No data: {reason}")));
    }
    Ok(())
}

/// Environment fallbacks for flags the user did not pass.
#[derive(Debug, Clone, Default)]
pub struct EnvDefaults {
    pub source: Option<String>,
    pub timeout_secs: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Self {
            source: std::env::var(ENV_SOURCE).ok(),
            timeout_secs: std::env::var(ENV_TIMEOUT).ok(),
        }
    }
}

pub fn pipeline_config_from_args(args: &RunArgs, env: &EnvDefaults) -> Result<PipelineConfig, AppError> {
    let horizon_end = parse_month(&args.horizon)
        .ok_or_else(|| AppError::new(2, format!("Invalid --horizon '{}': expected YYYY-MM", args.horizon)))?;

    let smoothing = match args.smoothing {
        SmoothingMode::Fixed => {
            for (name, v) in [("alpha", args.alpha), ("beta", args.beta)] {
                if !(0.0..=1.0).contains(&v) {
                    return Err(AppError::new(2, format!("--{name} must be within [0, 1], got {v}")));
                }
            }
            SmoothingPolicy::Fixed {
                alpha: args.alpha,
                beta: args.beta,
            }
        }
        SmoothingMode::Auto => SmoothingPolicy::Auto,
    };

    let timeout_secs = match (args.timeout_secs, &env.timeout_secs) {
        (Some(secs), _) => secs,
        (None, Some(raw)) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::new(2, format!("Invalid {ENV_TIMEOUT} '{raw}': expected seconds")))?,
        (None, None) => 30,
    };
    if timeout_secs == 0 {
        return Err(AppError::new(2, "Timeout must be at least 1 second"));
    }

    let source = args
        .source
        .clone()
        .or_else(|| env.source.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    Ok(PipelineConfig {
        source,
        timeout: Duration::from_secs(timeout_secs),
        cache_ttl: Duration::from_secs(args.cache_ttl_secs),
        min_year: args.min_year,
        segment_default: args.segment_default,
        forecast: ForecastConfig {
            horizon_end,
            trend: args.trend,
            smoothing,
            gap_fill: args.gap_fill,
            ..ForecastConfig::default()
        },
        top_n: args.top,
    })
}

/// Rewrite argv so `tourcast` defaults to `tourcast report`.
///
/// Rules:
/// - `tourcast`                       -> `tourcast report`
/// - `tourcast --horizon 2026-06 ...` -> `tourcast report --horizon 2026-06 ...`
/// - `tourcast --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GapFill, TrendMode};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut all = vec!["tourcast", "report"];
        all.extend_from_slice(extra);
        match crate::cli::Cli::parse_from(all).command {
            Command::Report(args) => args.run,
            _ => unreachable!(),
        }
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(argv(&["tourcast"])), argv(&["tourcast", "report"]));
        assert_eq!(
            rewrite_args(argv(&["tourcast", "--horizon", "2026-06"])),
            argv(&["tourcast", "report", "--horizon", "2026-06"])
        );
        assert_eq!(rewrite_args(argv(&["tourcast", "--help"])), argv(&["tourcast", "--help"]));
        assert_eq!(rewrite_args(argv(&["tourcast", "tui"])), argv(&["tourcast", "tui"]));
    }

    #[test]
    fn config_from_flags() {
        let args = run_args(&[
            "--source",
            "sample:7",
            "--horizon",
            "2027-03",
            "--trend",
            "undamped",
            "--gap-fill",
            "zero",
            "--timeout-secs",
            "5",
        ]);
        let config = pipeline_config_from_args(&args, &EnvDefaults::default()).unwrap();
        assert_eq!(config.source, "sample:7");
        assert_eq!(config.forecast.horizon_end, chrono::NaiveDate::from_ymd_opt(2027, 3, 1).unwrap());
        assert_eq!(config.forecast.trend, TrendMode::Undamped);
        assert_eq!(config.forecast.gap_fill, GapFill::Zero);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.forecast.smoothing,
            SmoothingPolicy::Fixed { alpha: 0.3, beta: 0.1 }
        );
    }

    #[test]
    fn env_fills_missing_flags_only() {
        let env = EnvDefaults {
            source: Some("sample:1".to_string()),
            timeout_secs: Some("12".to_string()),
        };
        let config = pipeline_config_from_args(&run_args(&[]), &env).unwrap();
        assert_eq!(config.source, "sample:1");
        assert_eq!(config.timeout, Duration::from_secs(12));

        let config = pipeline_config_from_args(&run_args(&["--source", "data.csv"]), &env).unwrap();
        assert_eq!(config.source, "data.csv");

        let config = pipeline_config_from_args(&run_args(&[]), &EnvDefaults::default()).unwrap();
        assert_eq!(config.source, DEFAULT_SOURCE);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn bad_values_are_usage_errors() {
        let err = pipeline_config_from_args(&run_args(&["--horizon", "December"]), &EnvDefaults::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = pipeline_config_from_args(&run_args(&["--alpha", "1.5"]), &EnvDefaults::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let env = EnvDefaults {
            source: None,
            timeout_secs: Some("soon".to_string()),
        };
        assert_eq!(pipeline_config_from_args(&run_args(&[]), &env).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn auto_smoothing_ignores_alpha_beta() {
        let args = run_args(&["--smoothing", "auto", "--alpha", "7"]);
        let config = pipeline_config_from_args(&args, &EnvDefaults::default()).unwrap();
        assert_eq!(config.forecast.smoothing, SmoothingPolicy::Auto);
    }

    #[test]
    fn empty_table_exits_with_no_data() {
        let output = pipeline::PipelineOutput {
            source: "x".to_string(),
            table: Default::default(),
            diagnostic: Some("fetch failed".to_string()),
            total: Err(crate::forecast::ForecastError::NoData),
            segment: Err(crate::forecast::ForecastError::NoData),
        };
        assert_eq!(no_data_check(&output).unwrap_err().exit_code(), 3);
    }
}
