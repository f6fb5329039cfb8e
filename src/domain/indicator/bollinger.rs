//! Bollinger Bands.
//!
//! Middle band is the SMA of the closing price, the outer bands sit
//! `k` population standard deviations above and below it. Also
//! produces the bandwidth ((upper - lower) / middle * 100) and %B
//! ((price - lower) / (upper - lower)).
//!
//! Default parameters: period=20, multiplier=2.0.
//! Warmup: first (period-1) entries are NaN.

use crate::domain::indicator::rolling::{rolling_std_population, sma};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STD_DEV: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
    pub percent_b: Vec<f64>,
}

pub fn bollinger(closes: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    let n = closes.len();
    let middle = sma(closes, period);
    let std = rolling_std_population(closes, period);

    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut width = vec![f64::NAN; n];
    let mut percent_b = vec![f64::NAN; n];

    for i in 0..n {
        if !middle[i].is_finite() || !std[i].is_finite() {
            continue;
        }
        upper[i] = middle[i] + std_dev * std[i];
        lower[i] = middle[i] - std_dev * std[i];
        if middle[i] != 0.0 {
            width[i] = (upper[i] - lower[i]) / middle[i] * 100.0;
        }
        let span = upper[i] - lower[i];
        if span != 0.0 {
            percent_b[i] = (closes[i] - lower[i]) / span;
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
        width,
        percent_b,
    }
}

pub fn bollinger_default(closes: &[f64]) -> BollingerSeries {
    bollinger(closes, DEFAULT_PERIOD, DEFAULT_STD_DEV)
}
