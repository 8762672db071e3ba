//! Parquet and CSV decoding into raw arrival rows.
//!
//! This module only turns bytes into typed rows. It enforces the schema
//! (`date`, `country`, `arrivals` are required) but does no filtering or
//! name mapping; that happens in `loader`.
//!
//! Any unparseable date or negative arrival count is a hard failure: the whole
//! file is rejected rather than silently dropping rows.

use std::collections::{BTreeMap, HashMap};

use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDate;
use csv::StringRecord;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::AppError;

const REQUIRED: [&str; 3] = ["date", "country", "arrivals"];
const PARQUET_MAGIC: &[u8] = b"PAR1";

/// A decoded, not yet cleaned, row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArrival {
    pub date: NaiveDate,
    pub country: String,
    pub arrivals: f64,
    pub extra: BTreeMap<String, f64>,
}

/// Decode a file body, sniffing Parquet by its magic bytes and falling back to CSV.
pub fn decode_bytes(bytes: Bytes) -> Result<Vec<RawArrival>, AppError> {
    if bytes.starts_with(PARQUET_MAGIC) {
        decode_parquet(bytes)
    } else {
        decode_csv(&bytes)
    }
}

pub fn decode_parquet(bytes: Bytes) -> Result<Vec<RawArrival>, AppError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| AppError::new(4, format!("Parquet reader init failed: {e}")))?
        .build()
        .map_err(|e| AppError::new(4, format!("Parquet reader build failed: {e}")))?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| AppError::new(4, format!("Parquet read batch failed: {e}")))?;
        decode_batch(&batch, &mut out)?;
    }
    Ok(out)
}

fn decode_batch(batch: &RecordBatch, out: &mut Vec<RawArrival>) -> Result<(), AppError> {
    let date_col = cast_column(batch, "date", &DataType::Date32)?;
    let dates = date_col
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| AppError::new(4, "Column 'date' is not a Date32 array after cast."))?;

    let country_col = cast_column(batch, "country", &DataType::Utf8)?;
    let countries = country_col
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AppError::new(4, "Column 'country' is not a string array after cast."))?;

    let arrivals_col = cast_column(batch, "arrivals", &DataType::Float64)?;
    let arrivals = as_f64(&arrivals_col, "arrivals")?;

    // Every other numeric column is passed through.
    let schema = batch.schema();
    let mut extras: Vec<(String, ArrayRef)> = Vec::new();
    for field in schema.fields() {
        if REQUIRED.contains(&field.name().as_str()) || !field.data_type().is_numeric() {
            continue;
        }
        extras.push((field.name().clone(), cast_column(batch, field.name(), &DataType::Float64)?));
    }
    let extra_values = extras
        .iter()
        .map(|(name, arr)| as_f64(arr, name).map(|values| (name.as_str(), values)))
        .collect::<Result<Vec<_>, _>>()?;

    for i in 0..batch.num_rows() {
        let date = if dates.is_null(i) {
            None
        } else {
            dates.value_as_date(i)
        };
        let date = date.ok_or_else(|| AppError::new(4, format!("Invalid or missing date in row {i}.")))?;

        let country = if countries.is_null(i) {
            "Unknown".to_string()
        } else {
            countries.value(i).trim().to_string()
        };

        let mut extra = BTreeMap::new();
        for (name, values) in &extra_values {
            if !values.is_null(i) && values.value(i).is_finite() {
                extra.insert(name.to_string(), values.value(i));
            }
        }

        out.push(RawArrival {
            date,
            country,
            arrivals: check_count(nonnull_f64(arrivals, i), || format!("row {i}"))?,
            extra,
        });
    }

    Ok(())
}

fn cast_column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef, AppError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| AppError::new(4, format!("Missing required column: `{name}`")))?;
    cast(batch.column(idx), to)
        .map_err(|e| AppError::new(4, format!("Column `{name}` cannot be read as {to}: {e}")))
}

fn as_f64<'a>(arr: &'a ArrayRef, name: &str) -> Result<&'a Float64Array, AppError> {
    arr.as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| AppError::new(4, format!("Column `{name}` is not numeric.")))
}

// Missing counts are summed as zero, matching how aggregation skips them.
fn nonnull_f64(arr: &Float64Array, i: usize) -> f64 {
    if arr.is_null(i) {
        return 0.0;
    }
    let v = arr.value(i);
    if v.is_finite() { v } else { 0.0 }
}

// Arrivals are counts.
fn check_count(v: f64, at: impl FnOnce() -> String) -> Result<f64, AppError> {
    if v < 0.0 {
        return Err(AppError::new(4, format!("Negative arrivals ({v}) on {}.", at())));
    }
    Ok(v)
}

pub fn decode_csv(body: &[u8]) -> Result<Vec<RawArrival>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(4, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in REQUIRED {
        if !header_map.contains_key(name) {
            return Err(AppError::new(4, format!("Missing required column: `{name}`")));
        }
    }

    let extra_columns: Vec<(String, usize)> = header_map
        .iter()
        .filter(|(name, _)| !REQUIRED.contains(&name.as_str()))
        .map(|(name, idx)| (name.clone(), *idx))
        .collect();

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header line, and 1-based line numbers.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(4, format!("CSV parse error on line {line}: {e}")))?;

        let raw_date = get_field(&record, &header_map, "date").unwrap_or_default();
        let date = parse_date(raw_date)
            .ok_or_else(|| AppError::new(4, format!("Invalid date '{raw_date}' on line {line}.")))?;

        let country = get_field(&record, &header_map, "country")
            .unwrap_or("Unknown")
            .to_string();
        let arrivals = get_field(&record, &header_map, "arrivals")
            .and_then(parse_f64)
            .unwrap_or(0.0);
        let arrivals = check_count(arrivals, || format!("line {line}"))?;

        let mut extra = BTreeMap::new();
        for (name, col) in &extra_columns {
            if let Some(v) = record.get(*col).map(str::trim).and_then(parse_f64) {
                extra.insert(name.clone(), v);
            }
        }

        out.push(RawArrival {
            date,
            country,
            arrivals,
            extra,
        });
    }

    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Timestamps such as `2024-01-01 00:00:00` or `2024-01-01T00:00:00`.
    if s.len() > 10 {
        if let Some(d) = s.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()) {
            return Some(d);
        }
    }
    crate::domain::parse_month(s)
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn csv_with_passthrough_columns() {
        let body = "\u{feff}date,country,arrivals,arrivals_male,note\n\
                    2024-01-01,SGP,1000,600,x\n\
                    2024-02,IDN,\"2,000\",,y\n";
        let rows = decode_csv(body.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(rows[0].extra.get("arrivals_male"), Some(&600.0));
        assert!(!rows[0].extra.contains_key("note"));
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(rows[1].arrivals, 2000.0);
        assert!(rows[1].extra.is_empty());
    }

    #[test]
    fn csv_missing_required_column_fails() {
        let body = "date,country,visitors\n2024-01-01,SGP,10\n";
        let err = decode_csv(body.as_bytes()).unwrap_err();
        assert!(err.message().contains("arrivals"), "{err}");
    }

    #[test]
    fn csv_bad_date_fails_closed() {
        let body = "date,country,arrivals\nnot-a-date,SGP,10\n";
        assert!(decode_csv(body.as_bytes()).is_err());
    }

    #[test]
    fn csv_negative_arrivals_fail_closed() {
        let body = "date,country,arrivals\n2024-01-01,SGP,10\n2024-02-01,SGP,-5\n";
        let err = decode_csv(body.as_bytes()).unwrap_err();
        assert!(err.message().contains("Negative arrivals"), "{err}");
        assert!(err.message().contains("line 3"), "{err}");
    }

    #[test]
    fn parquet_negative_arrivals_fail_closed() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Utf8, false),
            Field::new("country", DataType::Utf8, false),
            Field::new("arrivals", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2023-05-01"])),
                Arc::new(StringArray::from(vec!["THA"])),
                Arc::new(Int64Array::from(vec![Some(-1)])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = decode_bytes(Bytes::from(buf)).unwrap_err();
        assert!(err.message().contains("Negative arrivals"), "{err}");
    }

    #[test]
    fn parquet_with_string_dates_and_integer_counts() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Utf8, false),
            Field::new("country", DataType::Utf8, false),
            Field::new("arrivals", DataType::Int64, true),
            Field::new("arrivals_female", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2023-05-01", "2023-06-01"])),
                Arc::new(StringArray::from(vec!["THA", "CHN"])),
                Arc::new(Int64Array::from(vec![Some(120), None])),
                Arc::new(Int64Array::from(vec![Some(50), Some(7)])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = decode_bytes(Bytes::from(buf)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "THA");
        assert_eq!(rows[0].arrivals, 120.0);
        assert_eq!(rows[1].arrivals, 0.0);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(rows[1].extra.get("arrivals_female"), Some(&7.0));
    }
}
