//! Technical analysis engine: turns one symbol's price history into an
//! [`IndicatorReport`].
//!
//! The engine is a pure batch computation. It never mutates the input
//! series and holds no state besides its pattern detector, so a single
//! engine can serve concurrent callers. Indicators whose window exceeds
//! the available history degrade to `None`/"unknown" in the report; only
//! an empty series is an error.

use crate::domain::error::MarketlensError;
use crate::domain::indicator::atr::atr_default;
use crate::domain::indicator::bollinger::bollinger_default;
use crate::domain::indicator::cci::cci_default;
use crate::domain::indicator::ema::ema;
use crate::domain::indicator::macd::macd_default;
use crate::domain::indicator::pivot::PivotPoints;
use crate::domain::indicator::rolling::{pct_change, rolling_std, sma};
use crate::domain::indicator::rsi::rsi;
use crate::domain::indicator::stochastic::{stochastic_default, williams_r};
use crate::domain::indicator::volume::{
    accumulation_distribution, obv, volume_roc, DEFAULT_ROC_PERIOD, DEFAULT_SMA_PERIOD,
};
use crate::domain::indicator::{last_value, value_at};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::pattern::{NoPatternDetector, PatternDetector};
use crate::domain::report::{
    IndicatorReport, MomentumReport, MomentumSignal, RiskReport, SignalReport, SummaryReport,
    SupportResistanceReport, TradeAction, TrendLabel, TrendReport, VolatilityRegime,
    VolatilityReport, VolumeReport, VolumeSignal,
};
use crate::domain::risk;

/// Lookback for recent swing highs/lows in the support/resistance scan.
const RECENT_WINDOW: usize = 20;

/// Composite 0-100 scores (trend strength, momentum, risk) are fixed at
/// the midpoint until a real scoring model exists.
const NEUTRAL_SCORE: f64 = 50.0;

pub struct IndicatorEngine {
    detector: Box<dyn PatternDetector + Send + Sync>,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self {
            detector: Box::new(NoPatternDetector),
        }
    }

    pub fn with_detector(detector: Box<dyn PatternDetector + Send + Sync>) -> Self {
        Self { detector }
    }

    /// Computes the full indicator report for `series`.
    ///
    /// Fails only on an empty series. Short histories produce a report
    /// with the affected values set to `None`.
    pub fn analyze(&self, series: &PriceSeries) -> Result<IndicatorReport, MarketlensError> {
        if series.is_empty() {
            return Err(MarketlensError::InsufficientData {
                symbol: series.symbol().to_string(),
                rows: 0,
                minimum: 1,
            });
        }

        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        Ok(IndicatorReport {
            symbol: series.symbol().to_string(),
            summary: build_summary(series, &closes, &highs, &lows, &volumes),
            trend: build_trend(&closes),
            momentum: build_momentum(&highs, &lows, &closes),
            volatility: build_volatility(&highs, &lows, &closes),
            volume: build_volume(&highs, &lows, &closes, &volumes),
            support_resistance: build_support_resistance(series, &highs, &lows, &closes),
            patterns: self.detector.detect(&highs, &lows, &closes),
            signals: build_signals(&closes),
            risk: build_risk(&closes),
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_summary(
    series: &PriceSeries,
    closes: &[f64],
    highs: &[f64],
    lows: &[f64],
    volumes: &[f64],
) -> SummaryReport {
    let n = closes.len();
    let current_price = closes[n - 1];

    let (change, change_percent) = if n >= 2 {
        let prev = closes[n - 2];
        let change = current_price - prev;
        let pct = if prev != 0.0 {
            Some(change / prev * 100.0)
        } else {
            None
        };
        (Some(change), pct)
    } else {
        (None, None)
    };

    let high = highs.iter().copied().fold(f64::MIN, f64::max);
    let low = lows.iter().copied().fold(f64::MAX, f64::min);
    let range = high - low;
    let price_position = if range > 0.0 {
        (current_price - low) / range * 100.0
    } else {
        50.0
    };

    SummaryReport {
        current_price,
        change,
        change_percent,
        high_52_week: high,
        low_52_week: low,
        avg_volume: risk::mean(volumes),
        price_position,
        // reports are reproducible: dated by the data, not the wall clock
        as_of: series.bars()[n - 1].date,
    }
}

fn trend_label(price: f64, sma_value: Option<f64>) -> TrendLabel {
    match sma_value {
        Some(s) if price > s => TrendLabel::Bullish,
        Some(_) => TrendLabel::Bearish,
        None => TrendLabel::Unknown,
    }
}

fn build_trend(closes: &[f64]) -> TrendReport {
    let price = closes[closes.len() - 1];

    let sma_20 = last_value(&sma(closes, 20));
    let sma_50 = last_value(&sma(closes, 50));
    let sma_200 = last_value(&sma(closes, 200));
    let macd = macd_default(closes);

    TrendReport {
        short_term: trend_label(price, sma_20),
        medium_term: trend_label(price, sma_50),
        long_term: trend_label(price, sma_200),
        sma_20,
        sma_50,
        sma_200,
        ema_12: last_value(&ema(closes, 12)),
        ema_26: last_value(&ema(closes, 26)),
        macd: last_value(&macd.line),
        macd_signal: last_value(&macd.signal),
        macd_histogram: last_value(&macd.histogram),
        trend_strength: NEUTRAL_SCORE,
    }
}

fn rsi_signal(value: Option<f64>) -> MomentumSignal {
    match value {
        Some(v) if v < 30.0 => MomentumSignal::Oversold,
        Some(v) if v > 70.0 => MomentumSignal::Overbought,
        _ => MomentumSignal::Neutral,
    }
}

fn stochastic_signal(k: Option<f64>, d: Option<f64>) -> MomentumSignal {
    match (k, d) {
        (Some(k), Some(d)) if k < 20.0 && d < 20.0 => MomentumSignal::Oversold,
        (Some(k), Some(d)) if k > 80.0 && d > 80.0 => MomentumSignal::Overbought,
        _ => MomentumSignal::Neutral,
    }
}

fn build_momentum(highs: &[f64], lows: &[f64], closes: &[f64]) -> MomentumReport {
    let rsi_last = last_value(&rsi(closes, 14));
    let stoch = stochastic_default(highs, lows, closes);
    let k = last_value(&stoch.k);
    let d = last_value(&stoch.d);

    MomentumReport {
        rsi: rsi_last,
        rsi_signal: rsi_signal(rsi_last),
        stochastic_k: k,
        stochastic_d: d,
        stochastic_signal: stochastic_signal(k, d),
        williams_r: last_value(&williams_r(highs, lows, closes, 14)),
        cci: last_value(&cci_default(highs, lows, closes)),
        momentum_score: NEUTRAL_SCORE,
    }
}

fn volatility_regime(annualized_pct: f64) -> VolatilityRegime {
    if annualized_pct < 15.0 {
        VolatilityRegime::Low
    } else if annualized_pct < 25.0 {
        VolatilityRegime::Medium
    } else {
        VolatilityRegime::High
    }
}

fn build_volatility(highs: &[f64], lows: &[f64], closes: &[f64]) -> VolatilityReport {
    let bands = bollinger_default(closes);

    let returns = pct_change(closes, 1);
    let hist_vol = last_value(&rolling_std(&returns, 20))
        .map(|s| s * risk::TRADING_DAYS_PER_YEAR.sqrt() * 100.0);

    VolatilityReport {
        bollinger_upper: last_value(&bands.upper),
        bollinger_middle: last_value(&bands.middle),
        bollinger_lower: last_value(&bands.lower),
        bollinger_width: last_value(&bands.width),
        bollinger_percent_b: last_value(&bands.percent_b),
        atr: last_value(&atr_default(highs, lows, closes)),
        historical_volatility: hist_vol,
        volatility_regime: hist_vol.map(volatility_regime),
    }
}

fn volume_signal(ratio: f64) -> VolumeSignal {
    if ratio > 1.5 {
        VolumeSignal::High
    } else if ratio < 0.5 {
        VolumeSignal::Low
    } else {
        VolumeSignal::Normal
    }
}

fn build_volume(highs: &[f64], lows: &[f64], closes: &[f64], volumes: &[f64]) -> VolumeReport {
    let current_volume = volumes[volumes.len() - 1];
    let volume_sma = last_value(&sma(volumes, DEFAULT_SMA_PERIOD));

    let ratio = match volume_sma {
        Some(avg) if avg > 0.0 => current_volume / avg,
        _ => 1.0,
    };

    VolumeReport {
        current_volume,
        volume_sma,
        volume_ratio: ratio,
        obv: last_value(&obv(closes, volumes)),
        volume_roc: last_value(&volume_roc(volumes, DEFAULT_ROC_PERIOD)),
        accumulation_distribution: last_value(&accumulation_distribution(
            highs, lows, closes, volumes,
        )),
        volume_signal: volume_signal(ratio),
    }
}

fn build_support_resistance(
    series: &PriceSeries,
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> SupportResistanceReport {
    let pivots = PivotPoints::from_bar(&series.bars()[series.len() - 1]);
    let current_price = closes[closes.len() - 1];

    let start = highs.len().saturating_sub(RECENT_WINDOW);

    let mut recent_highs: Vec<f64> = highs[start..].to_vec();
    recent_highs.sort_by(|a, b| f64::total_cmp(b, a));
    recent_highs.truncate(3);

    let mut recent_lows: Vec<f64> = lows[start..].to_vec();
    recent_lows.sort_by(f64::total_cmp);
    recent_lows.truncate(3);

    let nearest_resistance = recent_highs
        .iter()
        .copied()
        .filter(|h| *h > current_price)
        .reduce(f64::min);
    let nearest_support = recent_lows
        .iter()
        .copied()
        .filter(|l| *l < current_price)
        .reduce(f64::max);

    SupportResistanceReport {
        pivot: pivots.pivot,
        resistance_1: pivots.resistance_1,
        resistance_2: pivots.resistance_2,
        support_1: pivots.support_1,
        support_2: pivots.support_2,
        recent_highs,
        recent_lows,
        nearest_resistance,
        nearest_support,
    }
}

fn build_signals(closes: &[f64]) -> SignalReport {
    let mut buy_signals = Vec::new();
    let mut sell_signals = Vec::new();

    match last_value(&rsi(closes, 14)) {
        Some(v) if v < 30.0 => buy_signals.push("RSI oversold".to_string()),
        Some(v) if v > 70.0 => sell_signals.push("RSI overbought".to_string()),
        _ => {}
    }

    // crossover: the line/signal relation flipped between the last two bars
    let macd = macd_default(closes);
    let n = closes.len();
    if n >= 2 {
        if let (Some(line), Some(sig), Some(prev_line), Some(prev_sig)) = (
            value_at(&macd.line, n - 1),
            value_at(&macd.signal, n - 1),
            value_at(&macd.line, n - 2),
            value_at(&macd.signal, n - 2),
        ) {
            if line > sig && prev_line <= prev_sig {
                buy_signals.push("MACD bullish crossover".to_string());
            } else if line < sig && prev_line >= prev_sig {
                sell_signals.push("MACD bearish crossover".to_string());
            }
        }
    }

    // level signal: which side of its 20-day average the close sits on
    if let Some(s) = last_value(&sma(closes, 20)) {
        let price = closes[n - 1];
        if price > s {
            buy_signals.push("Price above 20-day SMA".to_string());
        } else if price < s {
            sell_signals.push("Price below 20-day SMA".to_string());
        }
    }

    let overall_signal = if buy_signals.len() > sell_signals.len() {
        TradeAction::Buy
    } else if sell_signals.len() > buy_signals.len() {
        TradeAction::Sell
    } else {
        TradeAction::Hold
    };

    SignalReport {
        buy_signals,
        sell_signals,
        hold_signals: Vec::new(),
        overall_signal,
    }
}

fn build_risk(closes: &[f64]) -> RiskReport {
    let returns = risk::simple_returns(closes);
    let (var_95, var_99) = if returns.is_empty() {
        (None, None)
    } else {
        (
            Some(risk::value_at_risk_95(&returns)),
            Some(risk::value_at_risk_99(&returns)),
        )
    };

    RiskReport {
        volatility: risk::annualized_volatility(&returns),
        sharpe_ratio: risk::sharpe_ratio(&returns),
        var_95,
        var_99,
        max_drawdown: risk::max_drawdown(&returns),
        risk_score: NEUTRAL_SCORE,
    }
}
