//! Exponential moving average.
//!
//! k = 2/(n+1), seed with the SMA of the first n defined values, then
//! EMA[i] = v[i]*k + EMA[i-1]*(1-k). A NaN prefix (e.g. a MACD line fed
//! back in for its signal) is skipped before seeding.

/// EMA over a series that may carry a NaN warm-up prefix.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let first = match values.iter().position(|v| v.is_finite()) {
        Some(i) => i,
        None => return out,
    };
    if values.len() - first < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed_end = first + period;
    let mut current = values[first..seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = current;

    for i in seed_end..values.len() {
        current = values[i] * k + current * (1.0 - k);
        out[i] = current;
    }

    out
}
