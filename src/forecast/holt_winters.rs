//! Additive Holt-Winters with optional trend damping.
//!
//! Recursions (one step, seasonal index `j = t mod m`):
//!
//! ```text
//! ŷ_t  = l + φ·b + s_j
//! l'   = α·(y_t − s_j) + (1 − α)·(l + φ·b)
//! b'   = β·(l' − l) + (1 − β)·φ·b
//! s_j' = γ·(y_t − l') + (1 − γ)·s_j
//! ```
//!
//! The h-step forecast from the final state is `l + (φ + φ² + … + φʰ)·b + s`.
//! With `φ = 1` this is the classic linear-trend model.

use crate::math::fit_line;

/// Smoothing coefficients for one candidate model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HwParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub phi: f64,
}

/// Level, trend and one seasonal offset per position in the cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HwState {
    pub level: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
}

/// Initial state from the data.
///
/// With at least two complete seasons, level and trend come from a line
/// through the season means (placed at the centre of each season). Otherwise
/// the line goes through the raw points. The level is stored as of `t = -1` so
/// that the first one-step prediction lands on the fitted line.
///
/// Seasonal offsets are the mean detrended residual per position, shifted to
/// sum to zero; they stay zero when there is less than one full season.
pub fn initial_state(values: &[f64], period: usize) -> Option<HwState> {
    let n = values.len();
    if n < 2 || period == 0 {
        return None;
    }

    let seasons = n / period;
    let (intercept, slope) = if seasons >= 2 {
        let centre = (period as f64 - 1.0) / 2.0;
        let xs: Vec<f64> = (0..seasons).map(|k| (k * period) as f64 + centre).collect();
        let ys: Vec<f64> = values
            .chunks_exact(period)
            .map(|c| c.iter().sum::<f64>() / period as f64)
            .collect();
        fit_line(&xs, &ys)?
    } else {
        let xs: Vec<f64> = (0..n).map(|t| t as f64).collect();
        fit_line(&xs, values)?
    };

    let mut seasonal = vec![0.0; period];
    if seasons >= 1 {
        let used = seasons * period;
        for (t, &y) in values[..used].iter().enumerate() {
            seasonal[t % period] += y - (intercept + slope * t as f64);
        }
        for s in seasonal.iter_mut() {
            *s /= seasons as f64;
        }
        let mean = seasonal.iter().sum::<f64>() / period as f64;
        for s in seasonal.iter_mut() {
            *s -= mean;
        }
    }

    let state = HwState {
        level: intercept - slope,
        trend: slope,
        seasonal,
    };
    state.is_finite().then_some(state)
}

impl HwState {
    fn is_finite(&self) -> bool {
        self.level.is_finite() && self.trend.is_finite() && self.seasonal.iter().all(|s| s.is_finite())
    }
}

/// Run the recursions over `values`, returning the final state and the
/// in-sample one-step SSE. `None` if any quantity becomes non-finite.
pub fn run(values: &[f64], params: &HwParams, init: &HwState) -> Option<(HwState, f64)> {
    let m = init.seasonal.len();
    if m == 0 {
        return None;
    }
    let HwParams { alpha, beta, gamma, phi } = *params;

    let mut state = init.clone();
    let mut sse = 0.0;
    for (t, &y) in values.iter().enumerate() {
        let j = t % m;
        let s = state.seasonal[j];
        let damped_trend = phi * state.trend;

        let pred = state.level + damped_trend + s;
        let err = y - pred;
        sse += err * err;

        let level = alpha * (y - s) + (1.0 - alpha) * (state.level + damped_trend);
        let trend = beta * (level - state.level) + (1.0 - beta) * damped_trend;
        state.seasonal[j] = gamma * (y - level) + (1.0 - gamma) * s;
        state.level = level;
        state.trend = trend;

        if !(sse.is_finite() && state.is_finite()) {
            return None;
        }
    }

    Some((state, sse))
}

/// Point forecasts for `steps` months after `n_obs` observations.
pub fn project(state: &HwState, n_obs: usize, phi: f64, steps: usize) -> Vec<f64> {
    let m = state.seasonal.len();
    let mut out = Vec::with_capacity(steps);
    // Running `φ + φ² + … + φʰ`.
    let mut damp = 0.0;
    let mut p = 1.0;
    for h in 1..=steps {
        p *= phi;
        damp += p;
        let s = if m == 0 { 0.0 } else { state.seasonal[(n_obs + h - 1) % m] };
        out.push(state.level + damp * state.trend + s);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_linear(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| {
                let tf = t as f64;
                1000.0 + 10.0 * tf + 100.0 * (2.0 * std::f64::consts::PI * tf / 12.0).sin()
            })
            .collect()
    }

    #[test]
    fn initial_state_recovers_line_and_season() {
        let y = seasonal_linear(36);
        let st = initial_state(&y, 12).unwrap();
        assert!((st.trend - 10.0).abs() < 1e-9, "trend {}", st.trend);
        assert!((st.level - 990.0).abs() < 1e-9, "level {}", st.level);
        let sum: f64 = st.seasonal.iter().sum();
        assert!(sum.abs() < 1e-9);
        assert!((st.seasonal[3] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn short_series_uses_raw_points() {
        let y = [5.0, 7.0, 9.0];
        let st = initial_state(&y, 12).unwrap();
        assert!((st.trend - 2.0).abs() < 1e-9);
        assert!((st.level - 3.0).abs() < 1e-9);
        assert!(st.seasonal.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn exact_series_has_zero_error() {
        let y = seasonal_linear(36);
        let st = initial_state(&y, 12).unwrap();
        let p = HwParams { alpha: 0.3, beta: 0.1, gamma: 0.2, phi: 1.0 };
        let (end, sse) = run(&y, &p, &st).unwrap();
        assert!(sse < 1e-12, "sse {sse}");

        let next = project(&end, y.len(), 1.0, 1)[0];
        let expected = seasonal_linear(37)[36];
        assert!((next - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn run_rejects_overflow() {
        let y = vec![f64::MAX; 24];
        let st = HwState { level: f64::MAX, trend: f64::MAX, seasonal: vec![0.0; 12] };
        let p = HwParams { alpha: 0.5, beta: 0.5, gamma: 0.5, phi: 1.0 };
        assert!(run(&y, &p, &st).is_none());
    }

    #[test]
    fn projection_uses_cumulative_damping() {
        let state = HwState {
            level: 100.0,
            trend: 10.0,
            seasonal: vec![1.0, -1.0],
        };
        let phi: f64 = 0.9;
        let fc = project(&state, 3, phi, 400);
        assert_eq!(fc.len(), 400);
        for h in [1usize, 2, 17, 400] {
            let s = state.seasonal[(3 + h - 1) % 2];
            let geometric = phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi);
            let expected = 100.0 + geometric * 10.0 + s;
            assert!((fc[h - 1] - expected).abs() < 1e-9, "h={h}: {} vs {expected}", fc[h - 1]);
        }
        // Undamped continues linearly.
        let fc = project(&state, 0, 1.0, 5);
        assert!((fc[4] - (100.0 + 50.0 + 1.0)).abs() < 1e-12);
    }
}
