//! Macroeconomic context snapshot fed into the feature pipeline.

use serde::Serialize;

/// Point-in-time macro backdrop for prediction runs.
///
/// The regime/cycle/sentiment strings are matched exactly when deriving
/// feature flags: "bull_market", "expansion" and "positive" flip the
/// corresponding flag to 1, anything else leaves it at 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroContext {
    pub market_regime: String,
    pub economic_cycle: String,
    pub risk_sentiment: String,
    pub fed_funds_rate: f64,
    pub cpi: f64,
    pub unemployment_rate: f64,
    /// 0-100 scale.
    pub geopolitical_risk: f64,
}

impl Default for MacroContext {
    fn default() -> Self {
        Self {
            market_regime: "bull_market".into(),
            economic_cycle: "late_expansion".into(),
            risk_sentiment: "neutral".into(),
            fed_funds_rate: 5.25,
            cpi: 3.2,
            unemployment_rate: 3.7,
            geopolitical_risk: 35.0,
        }
    }
}

impl MacroContext {
    pub fn regime_flag(&self) -> f64 {
        if self.market_regime == "bull_market" {
            1.0
        } else {
            0.0
        }
    }

    pub fn cycle_flag(&self) -> f64 {
        if self.economic_cycle == "expansion" {
            1.0
        } else {
            0.0
        }
    }

    pub fn sentiment_flag(&self) -> f64 {
        if self.risk_sentiment == "positive" {
            1.0
        } else {
            0.0
        }
    }
}
