//! Forecast engine entry points.
//!
//! `forecast` is a pure function of its inputs: aggregate → fit → project,
//! each step returning a new value. It holds no state and is safe to call in
//! parallel for different value columns.

use crate::domain::{
    CleanTable, ForecastConfig, ForecastPoint, ForecastResult, ForecastWarning, MonthlySeries,
    SeriesLabel, add_months, month_start, months_between,
};
use crate::forecast::{ForecastError, aggregate_monthly, fit_model, holt_winters, param_grid};

/// Aggregate `value_column` of `table` to months and forecast it through
/// `config.horizon_end`.
pub fn forecast(
    table: &CleanTable,
    value_column: &str,
    config: &ForecastConfig,
) -> Result<ForecastResult, ForecastError> {
    let series = aggregate_monthly(table, value_column, config.gap_fill)?;
    let mut result = forecast_series(&series, value_column, config)?;
    if series.filled > 0 {
        result.warnings.insert(
            0,
            ForecastWarning::GapsFilled {
                months: series.filled,
                policy: config.gap_fill,
            },
        );
    }
    Ok(result)
}

/// Forecast an already aggregated series.
pub fn forecast_series(
    series: &MonthlySeries,
    value_column: &str,
    config: &ForecastConfig,
) -> Result<ForecastResult, ForecastError> {
    let Some(last) = series.last_month() else {
        return Err(ForecastError::EmptySeries);
    };

    let history: Vec<ForecastPoint> = series
        .points()
        .map(|(date, value)| ForecastPoint {
            date,
            value,
            label: SeriesLabel::Actual,
        })
        .collect();

    let steps = months_between(last, month_start(config.horizon_end));
    if steps <= 0 {
        log::info!("{value_column}: history already reaches the horizon; nothing to forecast");
        return Ok(ForecastResult {
            value_column: value_column.to_string(),
            history,
            forecast: Vec::new(),
            fit: None,
            warnings: Vec::new(),
        });
    }
    let steps = steps as usize;

    let n = series.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { needed: 2, got: n });
    }
    if series.values.iter().all(|&v| v == 0.0) {
        return Err(ForecastError::Degenerate("series is identically zero".to_string()));
    }

    let mut warnings = Vec::new();
    let recommended = 2 * config.seasonal_period;
    if n < recommended {
        log::warn!("{value_column}: only {n} months of history, seasonal fit is unreliable");
        warnings.push(ForecastWarning::ShortHistory { months: n, recommended });
    }

    let grid = param_grid(config)?;
    let fit = fit_model(&series.values, config.seasonal_period, &grid)?;
    let projected = holt_winters::project(&fit.state, n, fit.params.phi, steps);
    if projected.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::NonConvergence("projection is not finite".to_string()));
    }

    // Arrival counts cannot go negative.
    let forecast: Vec<ForecastPoint> = projected
        .into_iter()
        .enumerate()
        .map(|(i, v)| ForecastPoint {
            date: add_months(last, i as i32 + 1),
            value: v.max(0.0),
            label: SeriesLabel::Forecast,
        })
        .collect();

    log::info!(
        "{value_column}: fitted {n} months, projected {steps} through {}",
        config.horizon_end.format("%Y-%m")
    );

    Ok(ForecastResult {
        value_column: value_column.to_string(),
        history,
        forecast,
        fit: Some(fit.fitted_params()),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{ARRIVALS, ArrivalRecord, GapFill, TrendMode};

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn synthetic(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| {
                let tf = t as f64;
                20_000.0 + 150.0 * tf + 3_000.0 * (2.0 * std::f64::consts::PI * tf / 12.0).sin()
            })
            .collect()
    }

    fn table_from(start: NaiveDate, values: &[f64], country: &str) -> CleanTable {
        CleanTable::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let date = add_months(start, i as i32);
                    ArrivalRecord {
                        date,
                        year: chrono::Datelike::year(&date),
                        country: country.to_string(),
                        country_name: country.to_string(),
                        arrivals: v,
                        extra: BTreeMap::new(),
                    }
                })
                .collect(),
        )
    }

    fn config(horizon: NaiveDate, trend: TrendMode) -> ForecastConfig {
        ForecastConfig {
            horizon_end: horizon,
            trend,
            ..ForecastConfig::default()
        }
    }

    #[test]
    fn history_and_forecast_cover_every_month_once() {
        let table = table_from(ym(2019, 1), &synthetic(30), "SGP");
        let result = forecast(&table, ARRIVALS, &config(ym(2022, 3), TrendMode::Damped)).unwrap();

        assert_eq!(result.history.len(), 30);
        assert_eq!(result.forecast.len(), 9);
        assert_eq!(result.forecast[0].date, ym(2021, 7));
        assert_eq!(result.forecast.last().unwrap().date, ym(2022, 3));

        let combined = result.combined();
        let dates: Vec<_> = combined.iter().map(|p| p.date).collect();
        for (i, d) in dates.iter().enumerate() {
            assert_eq!(*d, add_months(ym(2019, 1), i as i32));
        }
        let hist: HashSet<_> = combined
            .iter()
            .filter(|p| p.label == SeriesLabel::Actual)
            .map(|p| p.date)
            .collect();
        let fc: HashSet<_> = combined
            .iter()
            .filter(|p| p.label == SeriesLabel::Forecast)
            .map(|p| p.date)
            .collect();
        assert!(hist.is_disjoint(&fc));
        assert_eq!(hist.len() + fc.len(), combined.len());
    }

    #[test]
    fn horizon_already_reached_returns_history_only() {
        let table = table_from(ym(2019, 1), &synthetic(24), "SGP");
        for horizon in [ym(2020, 12), ym(2020, 6)] {
            let result = forecast(&table, ARRIVALS, &config(horizon, TrendMode::Damped)).unwrap();
            assert!(result.forecast.is_empty());
            assert_eq!(result.history.len(), 24);
            assert!(result.fit.is_none());
        }
    }

    #[test]
    fn one_step_ahead_error_is_small_on_seasonal_trend() {
        // 35 months to fit, month 36 held out.
        let y = synthetic(36);
        let table = table_from(ym(2019, 1), &y[..35], "SGP");

        let undamped = forecast(&table, ARRIVALS, &config(ym(2021, 12), TrendMode::Undamped)).unwrap();
        assert_eq!(undamped.forecast.len(), 1);
        let got = undamped.forecast[0].value;
        assert!((got - y[35]).abs() / y[35] < 1e-6, "got {got}, want {}", y[35]);

        let damped = forecast(&table, ARRIVALS, &config(ym(2021, 12), TrendMode::Damped)).unwrap();
        let got = damped.forecast[0].value;
        assert!((got - y[35]).abs() / y[35] < 0.02, "got {got}, want {}", y[35]);

        // Better than just returning the mean.
        let mean = y[..35].iter().sum::<f64>() / 35.0;
        assert!((got - y[35]).abs() < (mean - y[35]).abs());
    }

    #[test]
    fn damped_grows_slower_than_undamped() {
        let table = table_from(ym(2019, 1), &synthetic(36), "SGP");
        let horizon = ym(2024, 12);
        let damped = forecast(&table, ARRIVALS, &config(horizon, TrendMode::Damped)).unwrap();
        let undamped = forecast(&table, ARRIVALS, &config(horizon, TrendMode::Undamped)).unwrap();

        assert!(damped.fit.unwrap().phi < 1.0);
        assert_eq!(undamped.fit.unwrap().phi, 1.0);
        assert!(damped.year_total(2024, SeriesLabel::Forecast) < undamped.year_total(2024, SeriesLabel::Forecast));
    }

    #[test]
    fn idn_three_years_to_month_37() {
        let y: Vec<f64> = (0..36).map(|i| 100_000.0 + 1_000.0 * i as f64).collect();
        let table = table_from(ym(2019, 1), &y, "Indonesia");
        let result = forecast(&table, ARRIVALS, &config(ym(2022, 1), TrendMode::Damped)).unwrap();
        assert_eq!(result.history.len(), 36);
        assert_eq!(result.forecast.len(), 1);
        assert_eq!(result.forecast[0].date, ym(2022, 1));
        assert_eq!(result.forecast[0].label, SeriesLabel::Forecast);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn short_history_warns_but_fits() {
        let table = table_from(ym(2023, 1), &synthetic(12), "SGP");
        let result = forecast(&table, ARRIVALS, &config(ym(2024, 6), TrendMode::Damped)).unwrap();
        assert_eq!(result.forecast.len(), 6);
        assert_eq!(
            result.warnings,
            vec![ForecastWarning::ShortHistory { months: 12, recommended: 24 }]
        );
    }

    #[test]
    fn gaps_are_reported() {
        let mut table = table_from(ym(2019, 1), &synthetic(30), "SGP");
        table.records.remove(10);
        let mut cfg = config(ym(2021, 12), TrendMode::Damped);
        cfg.gap_fill = GapFill::Zero;
        let result = forecast(&table, ARRIVALS, &cfg).unwrap();
        assert_eq!(result.history.len(), 30);
        assert_eq!(result.history[10].value, 0.0);
        assert_eq!(
            result.warnings,
            vec![ForecastWarning::GapsFilled { months: 1, policy: GapFill::Zero }]
        );
    }

    #[test]
    fn pathological_series_are_reported_not_panicking() {
        let horizon = config(ym(2030, 1), TrendMode::Damped);

        let single = table_from(ym(2024, 1), &[5.0], "SGP");
        assert_eq!(
            forecast(&single, ARRIVALS, &horizon).unwrap_err(),
            ForecastError::InsufficientData { needed: 2, got: 1 }
        );

        let zeros = table_from(ym(2022, 1), &[0.0; 30], "SGP");
        assert!(matches!(
            forecast(&zeros, ARRIVALS, &horizon).unwrap_err(),
            ForecastError::Degenerate(_)
        ));

        assert_eq!(
            forecast(&CleanTable::default(), ARRIVALS, &horizon).unwrap_err(),
            ForecastError::NoData
        );
    }

    #[test]
    fn forecasts_are_never_negative() {
        let y: Vec<f64> = (0..30).map(|i| 3_000.0 - 100.0 * i as f64).collect();
        let table = table_from(ym(2019, 1), &y, "SGP");
        let result = forecast(&table, ARRIVALS, &config(ym(2024, 12), TrendMode::Undamped)).unwrap();
        assert!(result.forecast.iter().all(|p| p.value >= 0.0));
    }

    #[test]
    fn fixed_smoothing_is_deterministic() {
        let table = table_from(ym(2019, 1), &synthetic(40), "SGP");
        let cfg = config(ym(2026, 12), TrendMode::Damped);
        let a = forecast(&table, ARRIVALS, &cfg).unwrap();
        let b = forecast(&table, ARRIVALS, &cfg).unwrap();
        assert_eq!(a, b);
    }
}
