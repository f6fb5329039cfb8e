//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Warmup: slow - 1 for the line, slow - 1 + signal - 1 for signal/histogram.

use crate::domain::indicator::ema::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let n = closes.len();
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdSeries {
            line: vec![f64::NAN; n],
            signal: vec![f64::NAN; n],
            histogram: vec![f64::NAN; n],
        };
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    // the signal EMA seeds itself past the line's NaN warm-up
    let signal = ema(&line, signal_period);

    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn macd_default(closes: &[f64]) -> MacdSeries {
    macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_default() {
        let out = macd_default(&ramp(40));

        let line_warmup = DEFAULT_SLOW - 1;
        let signal_warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;

        assert!(out.line[line_warmup - 1].is_nan());
        assert!(out.line[line_warmup].is_finite());
        assert!(out.signal[signal_warmup - 1].is_nan());
        assert!(out.signal[signal_warmup].is_finite());
        assert!(out.histogram[signal_warmup - 1].is_nan());
        assert!(out.histogram[signal_warmup].is_finite());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let out = macd_default(&ramp(60));

        for i in 0..60 {
            if out.histogram[i].is_finite() {
                assert!(
                    (out.histogram[i] - (out.line[i] - out.signal[i])).abs() < f64::EPSILON,
                    "mismatch at index {}",
                    i
                );
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let out = macd(&closes, 3, 5, 2);

        let ema_fast = ema(&closes, 3);
        let ema_slow = ema(&closes, 5);

        for i in 0..closes.len() {
            if out.line[i].is_finite() {
                assert!((out.line[i] - (ema_fast[i] - ema_slow[i])).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let out = macd_default(&ramp(60));
        // fast EMA above slow EMA on a steady ramp
        assert!(out.line[59] > 0.0);
    }

    #[test]
    fn macd_empty_input() {
        let out = macd_default(&[]);
        assert!(out.line.is_empty());
        assert!(out.signal.is_empty());
        assert!(out.histogram.is_empty());
    }

    #[test]
    fn macd_zero_period_all_nan() {
        let closes = [100.0, 101.0, 102.0];
        for (f, s, sig) in [(0, 26, 9), (12, 0, 9), (12, 26, 0)] {
            let out = macd(&closes, f, s, sig);
            assert!(out.line.iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }

    #[test]
    fn macd_custom_parameters_warmup() {
        let out = macd(&ramp(20), 5, 10, 3);

        let warmup = 10 - 1 + 3 - 1;
        assert!(out.signal[warmup - 1].is_nan());
        assert!(out.signal[warmup].is_finite());
    }
}
