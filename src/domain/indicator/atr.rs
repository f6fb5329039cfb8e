//! Average True Range.
//!
//! True range of the first bar is high - low; afterwards it is
//! max(high - low, |high - prev_close|, |low - prev_close|). The ATR
//! seeds with the simple average of the first `period` true ranges and
//! then follows Wilder smoothing:
//!
//!   atr[i] = (atr[i-1] * (period - 1) + tr[i]) / period
//!
//! Warmup: first (period-1) entries are NaN.

pub const DEFAULT_PERIOD: usize = 14;

pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let hl = highs[i] - lows[i];
        let tr = if i == 0 {
            hl
        } else {
            let prev_close = closes[i - 1];
            hl.max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        };
        out.push(tr);
    }
    out
}

pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let tr = true_ranges(highs, lows, closes);

    let seed: f64 = tr[0..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = seed;

    for i in period..n {
        out[i] = (out[i - 1] * (period - 1) as f64 + tr[i]) / period as f64;
    }

    out
}

pub fn atr_default(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    atr(highs, lows, closes, DEFAULT_PERIOD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn atr_warmup() {
        let highs = vec![110.0; 5];
        let lows = vec![90.0; 5];
        let closes = vec![100.0; 5];

        let out = atr(&highs, &lows, &closes, 3);
        assert_eq!(out.len(), 5);

        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(out[2].is_finite());
        assert!(out[3].is_finite());
        assert!(out[4].is_finite());
    }

    #[test]
    fn atr_seed_is_average() {
        let highs = [110.0, 115.0, 120.0];
        let lows = [100.0, 105.0, 110.0];
        let closes = [105.0, 110.0, 115.0];

        let out = atr(&highs, &lows, &closes, 3);

        let expected = (10.0 + 10.0 + 10.0) / 3.0;
        assert_relative_eq!(out[2], expected, max_relative = 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let highs = [110.0, 115.0, 120.0, 125.0];
        let lows = [100.0, 105.0, 110.0, 115.0];
        let closes = [105.0, 110.0, 115.0, 120.0];

        let out = atr(&highs, &lows, &closes, 3);

        let seed = 10.0;
        let expected = (seed * 2.0 + 10.0) / 3.0;
        assert_relative_eq!(out[3], expected, max_relative = 1e-9);
    }

    #[test]
    fn atr_insufficient_bars() {
        let highs = [110.0, 110.0];
        let lows = [90.0, 90.0];
        let closes = [100.0, 100.0];

        let out = atr(&highs, &lows, &closes, 5);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn true_range_uses_gap_from_previous_close() {
        // second bar gaps up, so the range stretches back to the prior close
        let highs = [110.0, 130.0, 120.0];
        let lows = [100.0, 120.0, 110.0];
        let closes = [105.0, 125.0, 115.0];

        let tr = true_ranges(&highs, &lows, &closes);

        assert_relative_eq!(tr[0], 10.0);
        assert_relative_eq!(tr[1], 25.0); // 130 - 105
        assert_relative_eq!(tr[2], 10.0);
    }

    #[test]
    fn atr_zero_period() {
        let out = atr(&[110.0], &[90.0], &[100.0], 0);
        assert!(out[0].is_nan());
    }

    #[test]
    fn atr_empty_input() {
        let out = atr_default(&[], &[], &[]);
        assert!(out.is_empty());
    }
}
