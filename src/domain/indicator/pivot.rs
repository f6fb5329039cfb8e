//! Floor-trader pivot points from a single bar.
//!
//! pivot = (H + L + C) / 3
//! R1 = 2 * pivot - L        S1 = 2 * pivot - H
//! R2 = pivot + (H - L)      S2 = pivot - (H - L)

use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotPoints {
    pub pivot: f64,
    pub resistance_1: f64,
    pub support_1: f64,
    pub resistance_2: f64,
    pub support_2: f64,
}

impl PivotPoints {
    pub fn from_bar(bar: &PriceBar) -> Self {
        let pivot = (bar.high + bar.low + bar.close) / 3.0;
        let range = bar.high - bar.low;
        Self {
            pivot,
            resistance_1: 2.0 * pivot - bar.low,
            support_1: 2.0 * pivot - bar.high,
            resistance_2: pivot + range,
            support_2: pivot - range,
        }
    }
}
