//! Monthly aggregation.
//!
//! Rows are grouped by calendar month (date truncated to the 1st) and summed.
//! The smoothing model needs an evenly spaced series, so months between the
//! first and last observation with no rows are filled according to `GapFill`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{CleanTable, GapFill, MonthlySeries, add_months, month_start, months_between};
use crate::forecast::ForecastError;

pub fn aggregate_monthly(
    table: &CleanTable,
    value_column: &str,
    gap_fill: GapFill,
) -> Result<MonthlySeries, ForecastError> {
    if table.is_empty() {
        return Err(ForecastError::NoData);
    }
    if !table.has_column(value_column) {
        return Err(ForecastError::MissingColumn(value_column.to_string()));
    }

    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in &table.records {
        if let Some(v) = r.value(value_column) {
            *sums.entry(month_start(r.date)).or_insert(0.0) += v;
        }
    }

    let (Some((&start, _)), Some((&end, _))) = (sums.first_key_value(), sums.last_key_value()) else {
        return Err(ForecastError::EmptySeries);
    };

    let n = months_between(start, end) as usize + 1;
    let mut values = Vec::with_capacity(n);
    let mut filled = 0usize;
    let mut prev = 0.0;
    for i in 0..n {
        let month = add_months(start, i as i32);
        let v = match sums.get(&month) {
            Some(&v) => v,
            None => {
                filled += 1;
                match gap_fill {
                    GapFill::ForwardFill => prev,
                    GapFill::Zero => 0.0,
                }
            }
        };
        values.push(v);
        prev = v;
    }

    if filled > 0 {
        log::debug!("{value_column}: filled {filled} missing month(s) ({})", gap_fill.display_name());
    }

    Ok(MonthlySeries {
        start,
        values,
        filled,
    })
}
