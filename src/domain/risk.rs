//! Return-series statistics: volatility, Sharpe ratio, Value-at-Risk,
//! drawdown and correlation.
//!
//! All functions operate on simple (arithmetic) daily returns and
//! annualize with a 252 trading-day year. Degenerate inputs (empty
//! series, zero volatility) yield 0 rather than NaN or an error.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Daily simple returns: (close[i] - close[i-1]) / close[i-1].
///
/// Output has one fewer element than the input. A non-positive or
/// non-finite base contributes a 0 return.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return Vec::new();
    }
    closes
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 && w[0].is_finite() && w[1].is_finite() {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divides by n-1). Zero for fewer than
/// two values.
pub fn std_sample(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Population standard deviation (divides by n). Zero for empty input.
pub fn std_population(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

pub fn annualized_volatility(returns: &[f64]) -> f64 {
    std_sample(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

pub fn annualized_return(returns: &[f64]) -> f64 {
    mean(returns) * TRADING_DAYS_PER_YEAR
}

/// Annualized Sharpe ratio with no risk-free rate. Zero when the
/// volatility is zero.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let vol = annualized_volatility(returns);
    if vol > 0.0 {
        annualized_return(returns) / vol
    } else {
        0.0
    }
}

/// Percentile with linear interpolation between order statistics.
///
/// `pct` is in [0, 100]. For sorted values a[0..n] the rank is
/// pct/100 * (n-1) and the result interpolates between the two
/// bracketing entries. Zero for empty input.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

/// 95% Value-at-Risk: the 5th percentile of the return distribution.
pub fn value_at_risk_95(returns: &[f64]) -> f64 {
    percentile(returns, 5.0)
}

/// 99% Value-at-Risk: the 1st percentile of the return distribution.
pub fn value_at_risk_99(returns: &[f64]) -> f64 {
    percentile(returns, 1.0)
}

/// Largest peak-to-trough decline of the cumulative-return curve,
/// expressed as a fraction in [-1, 0].
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = 1.0;
    let mut worst: f64 = 0.0;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        if peak > 0.0 {
            worst = worst.min(cumulative / peak - 1.0);
        }
    }
    worst
}

/// Pearson correlation of two equal-length series. Zero if either
/// side has no variance or the series are empty or mismatched.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    let ma = mean(a);
    let mb = mean(b);

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..a.len() {
        let da = a[i] - ma;
        let db = b[i] - mb;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom > 0.0 { cov / denom } else { 0.0 }
}
