//! Synthetic arrivals dataset for offline runs.
//!
//! The generator mimics the shape of the official monthly table: one row per
//! `(month, country)` with a per-country base level, a shared seasonal profile,
//! a gentle trend, a border-closure trough in 2020–2021 and lognormal noise.
//! Output is fully determined by the seed.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::decode::RawArrival;
use crate::domain::{ARRIVALS_FEMALE, ARRIVALS_MALE, add_months};
use crate::error::AppError;

/// `(code, monthly base arrivals)`; `MDV` is deliberately absent from the name table.
const COUNTRIES: [(&str, f64); 10] = [
    ("SGP", 820_000.0),
    ("IDN", 310_000.0),
    ("CHN", 260_000.0),
    ("THA", 170_000.0),
    ("BRN", 110_000.0),
    ("IND", 60_000.0),
    ("KOR", 50_000.0),
    ("GBR", 30_000.0),
    ("AUS", 28_000.0),
    ("MDV", 4_000.0),
];

/// Month-of-year multipliers (Jan..Dec): school holidays and year-end peaks.
const SEASONAL: [f64; 12] = [1.02, 0.92, 0.95, 0.97, 0.98, 1.08, 1.04, 1.00, 0.93, 0.96, 1.03, 1.12];

const START_YEAR: i32 = 2018;
const END: (i32, u32) = (2025, 6);

/// Yearly growth applied to the base level.
const TREND_PER_YEAR: f64 = 0.04;

/// Log-scale noise standard deviation.
const NOISE_SIGMA: f64 = 0.04;

/// Share of arrivals recorded as male.
const MALE_SHARE: f64 = 0.56;

pub fn generate_sample(seed: u64) -> Result<Vec<RawArrival>, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let start = NaiveDate::from_ymd_opt(START_YEAR, 1, 1)
        .ok_or_else(|| AppError::new(4, "Invalid sample start month."))?;
    let end = NaiveDate::from_ymd_opt(END.0, END.1, 1)
        .ok_or_else(|| AppError::new(4, "Invalid sample end month."))?;
    let n_months = crate::domain::months_between(start, end) + 1;

    let mut out = Vec::with_capacity(n_months as usize * COUNTRIES.len());
    for i in 0..n_months {
        let month = add_months(start, i);
        let level = disruption_factor(month) * (1.0 + TREND_PER_YEAR).powf(i as f64 / 12.0);
        let season = SEASONAL[month.month0() as usize];

        for (code, base) in COUNTRIES {
            let noise = normal.sample(&mut rng).exp();
            let arrivals = (base * level * season * noise).round().max(0.0);
            let male = (arrivals * MALE_SHARE).round();

            let mut extra = BTreeMap::new();
            extra.insert(ARRIVALS_MALE.to_string(), male);
            extra.insert(ARRIVALS_FEMALE.to_string(), arrivals - male);

            out.push(RawArrival {
                date: month,
                country: code.to_string(),
                arrivals,
                extra,
            });
        }
    }

    Ok(out)
}

// Border closures: near-zero arrivals from April 2020, reopening through 2022.
fn disruption_factor(month: NaiveDate) -> f64 {
    match (month.year(), month.month()) {
        (2020, 1..=2) => 0.85,
        (2020, 3) => 0.35,
        (2020, _) | (2021, _) => 0.03,
        (2022, m) if m <= 3 => 0.10,
        (2022, m) => 0.10 + 0.80 * (m as f64 - 3.0) / 9.0,
        _ => 1.0,
    }
}
