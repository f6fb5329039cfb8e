//! Model-based forecasting over engineered features.
//!
//! Every call refits from scratch: the engine holds hyperparameters
//! only, so predictions depend on nothing but the inputs and the seed.
//! Three supervised stages (next-day return, five-bar direction,
//! short-horizon volatility) run on a chronological 80/20 split and
//! predict the newest row; the remaining sections of the
//! [`Prediction`] are rule-based.

use crate::domain::error::MarketlensError;
use crate::domain::features::{FeaturePipeline, FeatureTable, MIN_FEATURE_ROWS};
use crate::domain::indicator::rolling::rolling_std;
use crate::domain::macro_context::MacroContext;
use crate::domain::model::{
    GradientBoost, LinearModel, ModelParams, RandomForest, Regressor,
};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::prediction::{
    ConfidenceLevel, ConfidenceMetrics, FactorImpact, FactorStrength, KeyFactor,
    ModelOutputs, Prediction, PricePrediction, RiskAssessment, RiskLevel, ScenarioSet,
    TrendDirection, TrendPrediction, VolatilityPrediction, VolatilityTrend,
};
use crate::domain::report::VolatilityRegime;

pub struct PredictionEngine {
    params: ModelParams,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self {
            params: ModelParams::default(),
        }
    }

    pub fn with_params(params: ModelParams) -> Self {
        Self { params }
    }

    /// Produces the full forward-looking view for one symbol.
    ///
    /// `horizon` is carried through into the result untouched. Errors
    /// are structural only (not enough history for the feature table
    /// or for one of the supervised stages); numeric failures inside a
    /// stage degrade that component instead.
    pub fn predict(
        &self,
        series: &PriceSeries,
        macro_context: &MacroContext,
        horizon: &str,
    ) -> Result<Prediction, MarketlensError> {
        let table = FeaturePipeline::build(series, macro_context)?;
        let rows: Vec<&[f64]> = table.rows().collect();
        let symbol = series.symbol();

        let price = self.price_stage(symbol, &rows, table.closes())?;
        let trend = self.trend_stage(symbol, &rows, table.closes())?;
        let volatility = self.volatility_stage(symbol, &rows, &table)?;
        let risk = assess_risk(&table, macro_context);
        let confidence = confidence_metrics(table.len());
        let key_factors = key_factors(&table, macro_context);

        Ok(Prediction {
            symbol: symbol.to_string(),
            horizon: horizon.to_string(),
            price,
            trend,
            volatility,
            risk,
            scenarios: ScenarioSet::baseline(),
            confidence,
            key_factors,
        })
    }

    /// Next-day return: three regressors, averaged.
    fn price_stage(
        &self,
        symbol: &str,
        rows: &[&[f64]],
        closes: &[f64],
    ) -> Result<PricePrediction, MarketlensError> {
        let mut x: Vec<&[f64]> = Vec::with_capacity(rows.len());
        let mut y: Vec<f64> = Vec::with_capacity(rows.len());
        for i in 0..rows.len().saturating_sub(1) {
            let target = closes[i + 1] / closes[i] - 1.0;
            if target.is_finite() {
                x.push(rows[i]);
                y.push(target);
            }
        }
        require_rows(symbol, x.len())?;

        let forest = fit_predict_last(&x, &y, |tx, ty| RandomForest::fit(tx, ty, &self.params));
        let boost = fit_predict_last(&x, &y, |tx, ty| GradientBoost::fit(tx, ty, &self.params));
        let linear = fit_predict_last(&x, &y, |tx, ty| LinearModel::fit(tx, ty));

        let outputs = [forest, boost, linear];
        let ensemble = outputs.iter().sum::<f64>() / outputs.len() as f64;
        if !ensemble.is_finite() {
            return Ok(PricePrediction::degraded());
        }

        let spread = (outputs.iter().map(|o| (o - ensemble).powi(2)).sum::<f64>()
            / outputs.len() as f64)
            .sqrt();

        Ok(PricePrediction {
            predicted_return: ensemble,
            model_outputs: ModelOutputs {
                random_forest: forest,
                gradient_boost: boost,
                linear_model: linear,
            },
            confidence: (1.0 - spread).max(0.1),
        })
    }

    /// Five-bar direction as a 0/1 regression; the forest's averaged
    /// leaf means double as a probability.
    fn trend_stage(
        &self,
        symbol: &str,
        rows: &[&[f64]],
        closes: &[f64],
    ) -> Result<TrendPrediction, MarketlensError> {
        let usable = rows.len().saturating_sub(5);
        require_rows(symbol, usable)?;

        let x = &rows[..usable];
        let y: Vec<f64> = (0..usable)
            .map(|i| if closes[i + 5] > closes[i] { 1.0 } else { 0.0 })
            .collect();

        let probability =
            fit_predict_last(x, &y, |tx, ty| RandomForest::fit(tx, ty, &self.params));
        if !probability.is_finite() {
            return Ok(TrendPrediction::degraded());
        }

        let direction = if probability > 0.6 {
            TrendDirection::Bullish
        } else if probability < 0.4 {
            TrendDirection::Bearish
        } else {
            TrendDirection::Neutral
        };

        Ok(TrendPrediction {
            probability,
            direction,
            strength: (probability - 0.5).abs() * 2.0,
        })
    }

    /// Rolling 5-bar return volatility, forecast one step ahead.
    fn volatility_stage(
        &self,
        symbol: &str,
        rows: &[&[f64]],
        table: &FeatureTable,
    ) -> Result<VolatilityPrediction, MarketlensError> {
        // price_change is a table column, so it exists and is finite
        let price_change = table
            .column("price_change")
            .ok_or_else(|| MarketlensError::Data {
                reason: "feature table lost its price_change column".to_string(),
            })?;
        let target = rolling_std(&price_change, 5);

        let usable = rows.len().saturating_sub(4);
        require_rows(symbol, usable)?;

        let x = &rows[4..];
        let y = &target[4..];

        let forecast = fit_predict_last(x, y, |tx, ty| RandomForest::fit(tx, ty, &self.params));
        if !forecast.is_finite() {
            return Ok(VolatilityPrediction::degraded());
        }

        let regime = if forecast > 0.03 {
            VolatilityRegime::High
        } else if forecast < 0.01 {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Medium
        };
        let historical_mean = y.iter().sum::<f64>() / y.len() as f64;
        let trend = if forecast > historical_mean {
            VolatilityTrend::Increasing
        } else {
            VolatilityTrend::Decreasing
        };

        Ok(VolatilityPrediction {
            forecast,
            regime,
            trend,
        })
    }
}

fn require_rows(symbol: &str, rows: usize) -> Result<(), MarketlensError> {
    if rows < MIN_FEATURE_ROWS {
        return Err(MarketlensError::InsufficientData {
            symbol: symbol.to_string(),
            rows,
            minimum: MIN_FEATURE_ROWS,
        });
    }
    Ok(())
}

/// Chronological 80/20 split: fit on the head, predict the newest row.
fn fit_predict_last<R, F>(x: &[&[f64]], y: &[f64], fit: F) -> f64
where
    R: Regressor,
    F: FnOnce(&[&[f64]], &[f64]) -> R,
{
    let split = (x.len() as f64 * 0.8) as usize;
    let model = fit(&x[..split], &y[..split]);
    model.predict(x[x.len() - 1])
}

fn bucket_weight(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::High => 0.8,
        RiskLevel::Medium => 0.5,
        RiskLevel::Low => 0.2,
    }
}

/// Rule-based risk picture over the feature table and macro snapshot.
fn assess_risk(table: &FeatureTable, macro_context: &MacroContext) -> RiskAssessment {
    let volatility_risk = match table
        .column("volatility_20d")
        .and_then(|col| col.last().copied())
    {
        Some(v) if v > 0.03 => RiskLevel::High,
        Some(v) if v > 0.02 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    };

    let closes = table.closes();
    let low = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let position = if high > low {
        (closes[closes.len() - 1] - low) / (high - low)
    } else {
        0.5
    };
    let price_level_risk = if position > 0.8 {
        RiskLevel::High
    } else if position < 0.2 {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };

    let macro_risk = macro_context.geopolitical_risk / 100.0;
    let liquidity_risk = RiskLevel::Low;
    let concentration_risk = RiskLevel::Low;

    let score = 0.3 * bucket_weight(volatility_risk)
        + 0.2 * bucket_weight(price_level_risk)
        + 0.3 * macro_risk
        + 0.1 * bucket_weight(liquidity_risk)
        + 0.1 * bucket_weight(concentration_risk);
    let overall_score = score.min(1.0);

    let level = if overall_score > 0.7 {
        RiskLevel::High
    } else if overall_score > 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let mut mitigation_suggestions = Vec::new();
    if volatility_risk == RiskLevel::High {
        mitigation_suggestions.push("Consider hedging strategies or options".to_string());
    }
    if price_level_risk == RiskLevel::High {
        mitigation_suggestions.push("Consider taking partial profits".to_string());
    }
    if macro_risk > 0.6 {
        mitigation_suggestions.push("Monitor macroeconomic indicators closely".to_string());
    }
    if mitigation_suggestions.is_empty() {
        mitigation_suggestions.push("Current risk levels are manageable".to_string());
    }

    RiskAssessment {
        volatility_risk,
        price_level_risk,
        macro_risk,
        liquidity_risk,
        concentration_risk,
        overall_score,
        level,
        mitigation_suggestions,
    }
}

fn confidence_metrics(rows: usize) -> ConfidenceMetrics {
    let data_quality = (rows as f64 / 1000.0).min(1.0);
    let feature_stability = 0.8;
    let model_agreement = 0.7;
    let overall = (data_quality + feature_stability + model_agreement) / 3.0;
    let level = if overall > 0.8 {
        ConfidenceLevel::High
    } else if overall > 0.6 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    ConfidenceMetrics {
        data_quality,
        feature_stability,
        model_agreement,
        overall,
        level,
    }
}

fn key_factors(table: &FeatureTable, macro_context: &MacroContext) -> Vec<KeyFactor> {
    let last_rsi = table
        .column("rsi")
        .and_then(|col| col.last().copied())
        .unwrap_or(50.0);

    vec![
        KeyFactor {
            factor: "Technical Momentum".to_string(),
            impact: if last_rsi < 70.0 {
                FactorImpact::Positive
            } else {
                FactorImpact::Negative
            },
            strength: FactorStrength::High,
            description: "RSI and momentum indicators suggest current trend continuation"
                .to_string(),
        },
        KeyFactor {
            factor: "Macroeconomic Environment".to_string(),
            impact: if macro_context.market_regime == "bull_market" {
                FactorImpact::Positive
            } else {
                FactorImpact::Negative
            },
            strength: FactorStrength::Medium,
            description: "Overall economic conditions support market direction".to_string(),
        },
        KeyFactor {
            factor: "Volatility Regime".to_string(),
            impact: FactorImpact::Neutral,
            strength: FactorStrength::Medium,
            description: "Current volatility levels are within normal range".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: (close - 1.0).max(0.0),
                close,
                volume: 8_000.0 + (i % 13) as f64 * 250.0,
            })
            .collect();
        PriceSeries::new("PRED", bars).unwrap()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.21).sin() * 6.0 + i as f64 * 0.04)
            .collect()
    }

    fn engine() -> PredictionEngine {
        PredictionEngine::with_params(ModelParams::tiny())
    }

    #[test]
    fn short_history_fails_at_the_feature_table() {
        let result = engine().predict(&series(&wave(120)), &MacroContext::default(), "30d");
        assert!(matches!(
            result,
            Err(MarketlensError::InsufficientData { .. })
        ));
    }

    #[test]
    fn trend_stage_needs_five_extra_rows() {
        // 150 bars leave 101 table rows: enough for the price stage
        // (100 targets) but not the trend stage (96)
        let result = engine().predict(&series(&wave(150)), &MacroContext::default(), "30d");
        match result {
            Err(MarketlensError::InsufficientData { rows, minimum, .. }) => {
                assert_eq!(rows, 96);
                assert_eq!(minimum, MIN_FEATURE_ROWS);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn full_prediction_is_structurally_complete() {
        let prediction = engine()
            .predict(&series(&wave(170)), &MacroContext::default(), "30d")
            .unwrap();

        assert_eq!(prediction.symbol, "PRED");
        assert_eq!(prediction.horizon, "30d");
        assert!(prediction.price.predicted_return.is_finite());
        assert!((0.1..=1.0).contains(&prediction.price.confidence));
        assert!((0.0..=1.0).contains(&prediction.trend.probability));
        assert!((0.0..=1.0).contains(&prediction.trend.strength));
        assert!(prediction.volatility.forecast.is_finite());
        assert!(prediction.risk.overall_score <= 1.0);
        assert_eq!(prediction.key_factors.len(), 3);
    }

    #[test]
    fn identical_inputs_identical_outputs() {
        let data = series(&wave(170));
        let ctx = MacroContext::default();

        let a = engine().predict(&data, &ctx, "30d").unwrap();
        let b = engine().predict(&data, &ctx, "30d").unwrap();

        let a_json = serde_json::to_string(&a).unwrap();
        let b_json = serde_json::to_string(&b).unwrap();
        assert_eq!(a_json, b_json);
    }

    #[test]
    fn calm_series_forecasts_low_volatility() {
        // ±0.1% moves: realized 5-day std sits well under the 0.01
        // low-regime line
        let closes: Vec<f64> = (0..170)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 0.1)
            .collect();
        let prediction = engine()
            .predict(&series(&closes), &MacroContext::default(), "30d")
            .unwrap();

        assert_eq!(prediction.volatility.regime, VolatilityRegime::Low);
        assert!(prediction.volatility.forecast < 0.01);
    }

    #[test]
    fn macro_risk_drives_mitigation() {
        let ctx = MacroContext {
            geopolitical_risk: 90.0,
            ..MacroContext::default()
        };
        let prediction = engine().predict(&series(&wave(170)), &ctx, "30d").unwrap();

        assert!((prediction.risk.macro_risk - 0.9).abs() < 1e-12);
        assert!(prediction
            .risk
            .mitigation_suggestions
            .iter()
            .any(|s| s == "Monitor macroeconomic indicators closely"));
    }

    #[test]
    fn quiet_picture_reports_manageable_risk() {
        // calm prices, low geopolitical risk, mid-range close
        let mut closes: Vec<f64> = (0..170)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 0.1)
            .collect();
        closes[169] = 100.0;
        let ctx = MacroContext {
            geopolitical_risk: 20.0,
            ..MacroContext::default()
        };
        let prediction = engine().predict(&series(&closes), &ctx, "30d").unwrap();

        assert_eq!(
            prediction.risk.mitigation_suggestions,
            vec!["Current risk levels are manageable".to_string()]
        );
    }

    #[test]
    fn bear_regime_flips_the_macro_factor() {
        let ctx = MacroContext {
            market_regime: "bear_market".to_string(),
            ..MacroContext::default()
        };
        let prediction = engine().predict(&series(&wave(170)), &ctx, "30d").unwrap();

        let factor = prediction
            .key_factors
            .iter()
            .find(|f| f.factor == "Macroeconomic Environment")
            .unwrap();
        assert_eq!(factor.impact, FactorImpact::Negative);
    }

    #[test]
    fn confidence_scales_with_rows() {
        let metrics = confidence_metrics(500);
        assert!((metrics.data_quality - 0.5).abs() < 1e-12);
        assert!((metrics.overall - (0.5 + 0.8 + 0.7) / 3.0).abs() < 1e-12);
        assert_eq!(metrics.level, ConfidenceLevel::Medium);

        let metrics = confidence_metrics(5000);
        assert_eq!(metrics.data_quality, 1.0);
        assert_eq!(metrics.level, ConfidenceLevel::High);
    }

    #[test]
    fn scenarios_carry_the_static_prior() {
        let prediction = engine()
            .predict(&series(&wave(170)), &MacroContext::default(), "90d")
            .unwrap();

        assert!((prediction.scenarios.bull_case.expected_return - 0.15).abs() < 1e-12);
        assert!((prediction.scenarios.bear_case.expected_return + 0.10).abs() < 1e-12);
        assert!((prediction.scenarios.base_case.probability - 0.5).abs() < 1e-12);
    }
}
