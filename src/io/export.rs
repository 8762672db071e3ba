//! Export the combined Actual / AI Forecast series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per `(series, month)`.

use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::PipelineOutput;
use crate::domain::ForecastResult;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    series: &'a str,
    date: String,
    value: f64,
    #[serde(rename = "type")]
    label: &'a str,
}

/// Write every available series of `output` to a CSV file.
///
/// Unavailable forecasts are skipped; the file still gets a header.
pub fn write_series_csv(path: &Path, output: &PipelineOutput) -> Result<(), AppError> {
    let results: Vec<&ForecastResult> = [&output.total, &output.segment]
        .into_iter()
        .filter_map(|r| r.as_ref().ok())
        .collect();
    write_results_csv(path, &results)
}

pub fn write_results_csv(path: &Path, results: &[&ForecastResult]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    if results.is_empty() {
        writer
            .write_record(["series", "date", "value", "type"])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }

    for r in results {
        for p in r.combined() {
            writer
                .serialize(CsvRow {
                    series: &r.value_column,
                    date: p.date.format("%Y-%m-%d").to_string(),
                    value: p.value,
                    label: p.label.display_name(),
                })
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ARRIVALS;
    use crate::views::test_support::{result, ym};

    #[test]
    fn csv_has_one_row_per_month_and_label() {
        let path = std::env::temp_dir().join(format!("tourcast-export-{}.csv", std::process::id()));
        let r = result(ARRIVALS, ym(2026, 10), &[10.0, 20.0], &[30.5]);
        write_results_csv(&path, &[&r]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            text,
            "series,date,value,type\n\
             arrivals,2026-10-01,10.0,Actual\n\
             arrivals,2026-11-01,20.0,Actual\n\
             arrivals,2026-12-01,30.5,AI Forecast\n"
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let path = std::env::temp_dir().join(format!("tourcast-empty-{}.csv", std::process::id()));
        write_results_csv(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(text, "series,date,value,type\n");
    }
}
