//! Stochastic oscillator and Williams %R.
//!
//! %K = (close - lowest_low) / (highest_high - lowest_low) * 100 over
//! the lookback window, %D = SMA(3) of %K. Williams %R uses the same
//! window and maps to [-100, 0]:
//!
//!   %R = (highest_high - close) / (highest_high - lowest_low) * -100
//!
//! A degenerate window (highest == lowest) yields 50 for %K and -50
//! for %R rather than dividing by zero.

use crate::domain::indicator::rolling::{rolling_max, rolling_min, sma};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> StochasticSeries {
    let n = highs.len().min(lows.len()).min(closes.len());
    let highest = rolling_max(&highs[..n], k_period);
    let lowest = rolling_min(&lows[..n], k_period);

    let mut k = vec![f64::NAN; n];
    for i in 0..n {
        if !highest[i].is_finite() || !lowest[i].is_finite() {
            continue;
        }
        let span = highest[i] - lowest[i];
        k[i] = if span == 0.0 {
            50.0
        } else {
            (closes[i] - lowest[i]) / span * 100.0
        };
    }

    let d = sma(&k, d_period);

    StochasticSeries { k, d }
}

pub fn stochastic_default(highs: &[f64], lows: &[f64], closes: &[f64]) -> StochasticSeries {
    stochastic(highs, lows, closes, DEFAULT_K_PERIOD, DEFAULT_D_PERIOD)
}

pub fn williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let highest = rolling_max(&highs[..n], period);
    let lowest = rolling_min(&lows[..n], period);

    let mut out = vec![f64::NAN; n];
    for i in 0..n {
        if !highest[i].is_finite() || !lowest[i].is_finite() {
            continue;
        }
        let span = highest[i] - lowest[i];
        out[i] = if span == 0.0 {
            -50.0
        } else {
            (highest[i] - closes[i]) / span * -100.0
        };
    }
    out
}
