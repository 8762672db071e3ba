//! Smoothing-parameter grid generation.
//!
//! We fit Holt-Winters using a deterministic grid search over the free
//! coefficients rather than a numerical optimiser, so identical inputs always
//! give identical forecasts.

use crate::domain::{ForecastConfig, SmoothingPolicy, TrendMode};
use crate::forecast::{ForecastError, HwParams};

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linear_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, ForecastError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(ForecastError::InvalidParameter(format!(
            "invalid range: min={min}, max={max} (must be finite and max>min)"
        )));
    }
    if steps < 2 {
        return Err(ForecastError::InvalidParameter("grid steps must be >= 2".to_string()));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

fn unit_interval(name: &str, v: f64) -> Result<f64, ForecastError> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(ForecastError::InvalidParameter(format!("{name} must be in [0, 1], got {v}")))
    }
}

/// All candidate parameter sets for `config`, nested α → β → γ → φ.
pub fn param_grid(config: &ForecastConfig) -> Result<Vec<HwParams>, ForecastError> {
    let (alphas, betas) = match config.smoothing {
        SmoothingPolicy::Fixed { alpha, beta } => {
            (vec![unit_interval("alpha", alpha)?], vec![unit_interval("beta", beta)?])
        }
        SmoothingPolicy::Auto => (linear_space(0.05, 0.95, 19)?, linear_space(0.01, 0.30, 10)?),
    };
    let gammas = linear_space(0.0, 0.6, 13)?;
    let phis = match config.trend {
        TrendMode::Damped => linear_space(0.80, 0.99, 20)?,
        TrendMode::Undamped => vec![1.0],
    };

    let mut out = Vec::with_capacity(alphas.len() * betas.len() * gammas.len() * phis.len());
    for &alpha in &alphas {
        for &beta in &betas {
            for &gamma in &gammas {
                for &phi in &phis {
                    out.push(HwParams { alpha, beta, gamma, phi });
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_space_includes_endpoints() {
        let v = linear_space(0.8, 0.99, 20).unwrap();
        assert_eq!(v.len(), 20);
        assert!((v[0] - 0.8).abs() < 1e-12);
        assert!((v[19] - 0.99).abs() < 1e-12);
    }

    #[test]
    fn fixed_undamped_grid_only_searches_gamma() {
        let config = ForecastConfig {
            trend: TrendMode::Undamped,
            ..ForecastConfig::default()
        };
        let grid = param_grid(&config).unwrap();
        assert_eq!(grid.len(), 13);
        assert!(grid.iter().all(|p| p.alpha == 0.3 && p.beta == 0.1 && p.phi == 1.0));
    }

    #[test]
    fn damped_phi_stays_below_one() {
        let grid = param_grid(&ForecastConfig::default()).unwrap();
        assert_eq!(grid.len(), 13 * 20);
        assert!(grid.iter().all(|p| p.phi >= 0.8 && p.phi < 1.0));
    }

    #[test]
    fn auto_grid_spans_alpha_and_beta() {
        let config = ForecastConfig {
            smoothing: SmoothingPolicy::Auto,
            trend: TrendMode::Undamped,
            ..ForecastConfig::default()
        };
        assert_eq!(param_grid(&config).unwrap().len(), 19 * 10 * 13);
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let config = ForecastConfig {
            smoothing: SmoothingPolicy::Fixed { alpha: 1.5, beta: 0.1 },
            ..ForecastConfig::default()
        };
        assert!(matches!(param_grid(&config), Err(ForecastError::InvalidParameter(_))));
    }
}
