//! Report structures produced by [`IndicatorEngine::analyze`].
//!
//! Indicator values that are undefined for the given history (warm-up
//! windows longer than the series) surface as `None` and serialize as
//! JSON null. Classification enums serialize as lowercase strings.
//!
//! [`IndicatorEngine::analyze`]: crate::domain::analyzer::IndicatorEngine::analyze

use std::fmt;

use chrono::NaiveDate;

use crate::domain::pattern::PatternMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumSignal {
    Oversold,
    Overbought,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityRegime {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSignal {
    High,
    Low,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendLabel::Bullish => "bullish",
            TrendLabel::Bearish => "bearish",
            TrendLabel::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl fmt::Display for MomentumSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MomentumSignal::Oversold => "oversold",
            MomentumSignal::Overbought => "overbought",
            MomentumSignal::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityRegime::Low => "low",
            VolatilityRegime::Medium => "medium",
            VolatilityRegime::High => "high",
        };
        f.write_str(s)
    }
}

impl fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolumeSignal::High => "high",
            VolumeSignal::Low => "low",
            VolumeSignal::Normal => "normal",
        };
        f.write_str(s)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// Where the price sits today: last close, day-over-day change and the
/// position inside the full range of the supplied history.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SummaryReport {
    pub current_price: f64,
    /// Absolute change from the previous close; `None` with fewer than
    /// two bars.
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub high_52_week: f64,
    pub low_52_week: f64,
    pub avg_volume: f64,
    /// Close relative to the [low, high] range, as a percentage.
    /// 50 when the range is degenerate.
    pub price_position: f64,
    /// Date of the last bar in the series.
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TrendReport {
    pub short_term: TrendLabel,
    pub medium_term: TrendLabel,
    pub long_term: TrendLabel,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub trend_strength: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MomentumReport {
    pub rsi: Option<f64>,
    pub rsi_signal: MomentumSignal,
    pub stochastic_k: Option<f64>,
    pub stochastic_d: Option<f64>,
    pub stochastic_signal: MomentumSignal,
    pub williams_r: Option<f64>,
    pub cci: Option<f64>,
    pub momentum_score: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VolatilityReport {
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_width: Option<f64>,
    pub bollinger_percent_b: Option<f64>,
    pub atr: Option<f64>,
    /// Rolling 20-day standard deviation of returns, annualized and
    /// expressed as a percentage.
    pub historical_volatility: Option<f64>,
    pub volatility_regime: Option<VolatilityRegime>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VolumeReport {
    pub current_volume: f64,
    pub volume_sma: Option<f64>,
    /// Current volume over its 20-day average; 1.0 when the average is
    /// zero or undefined.
    pub volume_ratio: f64,
    pub obv: Option<f64>,
    pub volume_roc: Option<f64>,
    pub accumulation_distribution: Option<f64>,
    pub volume_signal: VolumeSignal,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SupportResistanceReport {
    pub pivot: f64,
    pub resistance_1: f64,
    pub resistance_2: f64,
    pub support_1: f64,
    pub support_2: f64,
    /// Three largest highs of the last 20 bars, descending.
    pub recent_highs: Vec<f64>,
    /// Three smallest lows of the last 20 bars, ascending.
    pub recent_lows: Vec<f64>,
    /// Closest recent high above the current close, if any.
    pub nearest_resistance: Option<f64>,
    /// Closest recent low below the current close, if any.
    pub nearest_support: Option<f64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SignalReport {
    pub buy_signals: Vec<String>,
    pub sell_signals: Vec<String>,
    pub hold_signals: Vec<String>,
    pub overall_signal: TradeAction,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RiskReport {
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// 5th percentile of daily returns; `None` with fewer than two
    /// bars (no return distribution to take a percentile of).
    pub var_95: Option<f64>,
    /// 1st percentile of daily returns; `None` with fewer than two
    /// bars.
    pub var_99: Option<f64>,
    pub max_drawdown: f64,
    pub risk_score: f64,
}

/// Full technical analysis of one symbol's price history.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndicatorReport {
    pub symbol: String,
    pub summary: SummaryReport,
    pub trend: TrendReport,
    pub momentum: MomentumReport,
    pub volatility: VolatilityReport,
    pub volume: VolumeReport,
    pub support_resistance: SupportResistanceReport,
    pub patterns: Vec<PatternMatch>,
    pub signals: SignalReport,
    pub risk: RiskReport,
}
