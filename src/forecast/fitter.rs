//! Grid-search calibration of the smoothing coefficients.
//!
//! Given a contiguous monthly series and a list of candidate `HwParams`, we
//! run the recursions for each candidate from the same initial state, score it
//! by in-sample one-step SSE and return the best one.

use rayon::prelude::*;

use crate::domain::FittedParams;
use crate::forecast::holt_winters::{self, HwParams, HwState};
use crate::forecast::ForecastError;

/// Best fit for one series.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub params: HwParams,
    /// State after consuming every observation; the projection starts here.
    pub state: HwState,
    pub sse: f64,
    pub rmse: f64,
}

impl ModelFit {
    pub fn fitted_params(&self) -> FittedParams {
        FittedParams {
            alpha: self.params.alpha,
            beta: self.params.beta,
            gamma: self.params.gamma,
            phi: self.params.phi,
            sse: self.sse,
            rmse: self.rmse,
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: HwParams,
    state: HwState,
    sse: f64,
}

pub fn fit_model(values: &[f64], period: usize, grid: &[HwParams]) -> Result<ModelFit, ForecastError> {
    if values.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }
    if grid.is_empty() {
        return Err(ForecastError::InvalidParameter("parameter grid is empty".to_string()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::NonConvergence("series contains non-finite values".to_string()));
    }

    let init = holt_winters::initial_state(values, period)
        .ok_or_else(|| ForecastError::NonConvergence("could not initialise level and trend".to_string()))?;

    // Evaluate each candidate independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, params)| {
            holt_winters::run(values, params, &init).map(|(state, sse)| Candidate {
                idx,
                params: *params,
                state,
                sse,
            })
        })
        .collect();

    let Some(first) = candidates.first() else {
        return Err(ForecastError::NonConvergence(
            "no parameter candidate produced a finite fit".to_string(),
        ));
    };

    // Deterministic selection: pick the minimum SSE; break ties by original grid index.
    let mut best = first;
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    let rmse = (best.sse / values.len() as f64).sqrt();
    log::debug!(
        "selected alpha={:.3} beta={:.3} gamma={:.3} phi={:.3} rmse={:.1} ({} candidates)",
        best.params.alpha,
        best.params.beta,
        best.params.gamma,
        best.params.phi,
        rmse,
        candidates.len()
    );

    Ok(ModelFit {
        params: best.params,
        state: best.state.clone(),
        sse: best.sse,
        rmse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_seasonal(n: usize) -> Vec<f64> {
        // Fixed pseudo-noise so the test is reproducible without an RNG.
        (0..n)
            .map(|t| {
                let tf = t as f64;
                let noise = ((t * 7919) % 13) as f64 - 6.0;
                500.0 + 4.0 * tf + 80.0 * (2.0 * std::f64::consts::PI * tf / 12.0).cos() + noise
            })
            .collect()
    }

    #[test]
    fn fit_model_returns_finite_rmse() {
        let y = noisy_seasonal(48);
        let grid = vec![
            HwParams { alpha: 0.3, beta: 0.1, gamma: 0.1, phi: 1.0 },
            HwParams { alpha: 0.3, beta: 0.1, gamma: 0.3, phi: 0.9 },
        ];
        let fit = fit_model(&y, 12, &grid).unwrap();
        assert!(fit.sse.is_finite());
        assert!(fit.rmse.is_finite() && fit.rmse > 0.0);
    }

    #[test]
    fn fit_model_picks_lowest_sse() {
        let y = noisy_seasonal(48);
        let grid = vec![
            HwParams { alpha: 0.3, beta: 0.1, gamma: 0.1, phi: 0.8 },
            HwParams { alpha: 0.3, beta: 0.1, gamma: 0.1, phi: 1.0 },
        ];
        let fit = fit_model(&y, 12, &grid).unwrap();
        let init = holt_winters::initial_state(&y, 12).unwrap();
        let scores: Vec<f64> = grid
            .iter()
            .map(|p| holt_winters::run(&y, p, &init).unwrap().1)
            .collect();
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!(fit.sse, min);
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let y = noisy_seasonal(36);
        let p = HwParams { alpha: 0.3, beta: 0.1, gamma: 0.2, phi: 1.0 };
        let fit = fit_model(&y, 12, &[p, p, p]).unwrap();
        assert_eq!(fit.params, p);
    }

    #[test]
    fn single_point_is_insufficient() {
        let p = HwParams { alpha: 0.3, beta: 0.1, gamma: 0.2, phi: 1.0 };
        let err = fit_model(&[1.0], 12, &[p]).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 2, got: 1 });
    }
}
