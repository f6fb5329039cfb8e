//! Commodity Channel Index.
//!
//! CCI = (typical_price - SMA(typical_price)) / (0.015 * mean_deviation)
//! where typical price is (high + low + close) / 3 and mean deviation
//! is the average absolute distance of typical prices from the window
//! SMA. A zero mean deviation yields 0 rather than dividing by zero.

pub const DEFAULT_PERIOD: usize = 20;
const SCALE: f64 = 0.015;

pub fn cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut out = vec![f64::NAN; n];
    if period == 0 {
        return out;
    }

    let typical: Vec<f64> = (0..n)
        .map(|i| (highs[i] + lows[i] + closes[i]) / 3.0)
        .collect();

    for i in (period - 1)..n {
        let window = &typical[i + 1 - period..=i];
        if window.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let mean_dev = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        out[i] = if mean_dev == 0.0 {
            0.0
        } else {
            (typical[i] - mean) / (SCALE * mean_dev)
        };
    }

    out
}

pub fn cci_default(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    cci(highs, lows, closes, DEFAULT_PERIOD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cci_warmup() {
        let highs: Vec<f64> = (0..25).map(|i| 105.0 + i as f64).collect();
        let lows: Vec<f64> = (0..25).map(|i| 95.0 + i as f64).collect();
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();

        let out = cci_default(&highs, &lows, &closes);

        assert!(out[18].is_nan());
        assert!(out[19].is_finite());
    }

    #[test]
    fn cci_constant_series_is_zero() {
        let highs = vec![100.0; 25];
        let lows = vec![100.0; 25];
        let closes = vec![100.0; 25];

        let out = cci_default(&highs, &lows, &closes);
        assert_relative_eq!(out[24], 0.0);
    }

    #[test]
    fn cci_known_window() {
        // typical prices 1..=5: mean 3, mean deviation (2+1+0+1+2)/5 = 1.2
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = cci(&closes, &closes, &closes, 5);

        let expected = (5.0 - 3.0) / (0.015 * 1.2);
        assert_relative_eq!(out[4], expected, max_relative = 1e-12);
    }

    #[test]
    fn cci_positive_when_above_average() {
        let highs: Vec<f64> = (0..25).map(|i| 105.0 + i as f64 * 2.0).collect();
        let lows: Vec<f64> = (0..25).map(|i| 95.0 + i as f64 * 2.0).collect();
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64 * 2.0).collect();

        let out = cci_default(&highs, &lows, &closes);
        assert!(out[24] > 0.0);
    }

    #[test]
    fn cci_negative_when_below_average() {
        let highs: Vec<f64> = (0..25).map(|i| 155.0 - i as f64 * 2.0).collect();
        let lows: Vec<f64> = (0..25).map(|i| 145.0 - i as f64 * 2.0).collect();
        let closes: Vec<f64> = (0..25).map(|i| 150.0 - i as f64 * 2.0).collect();

        let out = cci_default(&highs, &lows, &closes);
        assert!(out[24] < 0.0);
    }

    #[test]
    fn cci_zero_period() {
        let out = cci(&[100.0], &[100.0], &[100.0], 0);
        assert!(out[0].is_nan());
    }
}
