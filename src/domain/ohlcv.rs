//! OHLCV bar and validated price series.

use crate::domain::error::MarketlensError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// An ordered OHLCV series for one symbol.
///
/// Construction is the only mutation point: `new` enforces per-bar price
/// invariants and strictly increasing dates, so every consumer can assume
/// a clean series.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, MarketlensError> {
        let symbol = symbol.into();

        for bar in &bars {
            validate_bar(bar)?;
        }

        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(MarketlensError::Validation {
                    reason: format!(
                        "bars out of order: {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

fn validate_bar(bar: &PriceBar) -> Result<(), MarketlensError> {
    let fields = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
        ("volume", bar.volume),
    ];

    for (name, value) in fields {
        if !value.is_finite() {
            return Err(MarketlensError::Validation {
                reason: format!("bar {}: {} is not finite", bar.date, name),
            });
        }
        if value < 0.0 {
            return Err(MarketlensError::Validation {
                reason: format!("bar {}: {} is negative ({})", bar.date, name, value),
            });
        }
    }

    if bar.high < bar.low {
        return Err(MarketlensError::Validation {
            reason: format!(
                "bar {}: high {} below low {}",
                bar.date, bar.high, bar.low
            ),
        });
    }
    if bar.high < bar.open.max(bar.close) {
        return Err(MarketlensError::Validation {
            reason: format!("bar {}: high {} below open/close", bar.date, bar.high),
        });
    }
    if bar.low > bar.open.min(bar.close) {
        return Err(MarketlensError::Validation {
            reason: format!("bar {}: low {} above open/close", bar.date, bar.low),
        });
    }

    Ok(())
}
