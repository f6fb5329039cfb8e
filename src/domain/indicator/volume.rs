//! Volume indicators.
//!
//! OBV[0] = volume[0]
//! If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
//! If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
//! If close[i] == close[i-1]: OBV[i] = OBV[i-1]
//!
//! The A/D line accumulates close-location-value weighted volume,
//! with CLV treated as 0 on bars where high == low. Volume ROC is the
//! percentage change of volume against `period` bars earlier, and the
//! volume ratio divides each bar's volume by its rolling SMA (NaN
//! where the SMA is zero or still warming up).

use crate::domain::indicator::rolling::sma;

pub const DEFAULT_ROC_PERIOD: usize = 20;
pub const DEFAULT_SMA_PERIOD: usize = 20;

pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let n = closes.len().min(volumes.len());
    let mut out = Vec::with_capacity(n);
    let mut running = 0.0;

    for i in 0..n {
        if i == 0 {
            running = volumes[0];
        } else if closes[i] > closes[i - 1] {
            running += volumes[i];
        } else if closes[i] < closes[i - 1] {
            running -= volumes[i];
        }
        out.push(running);
    }
    out
}

pub fn accumulation_distribution(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
) -> Vec<f64> {
    let n = highs
        .len()
        .min(lows.len())
        .min(closes.len())
        .min(volumes.len());
    let mut out = Vec::with_capacity(n);
    let mut running = 0.0;

    for i in 0..n {
        let span = highs[i] - lows[i];
        let clv = if span == 0.0 {
            0.0
        } else {
            ((closes[i] - lows[i]) - (highs[i] - closes[i])) / span
        };
        running += clv * volumes[i];
        out.push(running);
    }
    out
}

pub fn volume_roc(volumes: &[f64], period: usize) -> Vec<f64> {
    let n = volumes.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 {
        return out;
    }
    for i in period..n {
        let base = volumes[i - period];
        if base != 0.0 && base.is_finite() && volumes[i].is_finite() {
            out[i] = (volumes[i] - base) / base * 100.0;
        }
    }
    out
}

pub fn volume_ratio(volumes: &[f64], period: usize) -> Vec<f64> {
    let avg = sma(volumes, period);
    volumes
        .iter()
        .zip(&avg)
        .map(|(v, a)| {
            if a.is_finite() && *a != 0.0 {
                v / a
            } else {
                f64::NAN
            }
        })
        .collect()
}
