//! Rolling-window primitives shared across indicators and features.
//!
//! Windows are recomputed per position rather than maintained
//! incrementally so that a NaN inside a window poisons exactly that
//! window's output, matching the series convention.

/// Simple moving average. First `period - 1` entries are NaN.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().sum::<f64>() / period as f64;
    }
    out
}

/// Rolling sample standard deviation (divisor n-1).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period < 2 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (period as f64 - 1.0);
        out[i] = var.sqrt();
    }
    out
}

/// Rolling population standard deviation (divisor n).
pub fn rolling_std_population(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var =
            window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        out[i] = var.sqrt();
    }
    out
}

/// k-period percentage change: `v[i] / v[i-k] - 1`.
/// NaN where the base is zero or the lag reaches before the series.
pub fn pct_change(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    for i in period..values.len() {
        let base = values[i - period];
        if base != 0.0 {
            out[i] = values[i] / base - 1.0;
        }
    }
    out
}

/// Series shifted forward by `k`: `out[i] = v[i-k]`.
pub fn lag(values: &[f64], k: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in k..values.len() {
        out[i] = values[i - k];
    }
    out
}

/// Rolling maximum over `period` entries.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        out[i] = values[i + 1 - period..=i]
            .iter()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    }
    out
}

/// Rolling minimum over `period` entries.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        out[i] = values[i + 1 - period..=i]
            .iter()
            .fold(f64::INFINITY, |a, &b| a.min(b));
    }
    out
}
