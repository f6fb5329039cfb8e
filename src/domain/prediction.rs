//! Prediction structures produced by [`PredictionEngine::predict`].
//!
//! A `Prediction` is always structurally complete: when a sub-model
//! fails numerically its component is replaced by a conservative
//! degraded default instead of going missing.
//!
//! [`PredictionEngine::predict`]: crate::domain::predictor::PredictionEngine::predict

use std::fmt;

use crate::domain::report::VolatilityRegime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorImpact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStrength {
    Low,
    Medium,
    High,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Bullish => "bullish",
            TrendDirection::Bearish => "bearish",
            TrendDirection::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for VolatilityTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityTrend::Increasing => "increasing",
            VolatilityTrend::Decreasing => "decreasing",
            VolatilityTrend::Stable => "stable",
        };
        f.write_str(s)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        };
        f.write_str(s)
    }
}

impl fmt::Display for FactorImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FactorImpact::Positive => "positive",
            FactorImpact::Negative => "negative",
            FactorImpact::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for FactorStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FactorStrength::Low => "low",
            FactorStrength::Medium => "medium",
            FactorStrength::High => "high",
        };
        f.write_str(s)
    }
}

/// Per-model next-day return estimates feeding the ensemble.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelOutputs {
    pub random_forest: f64,
    pub gradient_boost: f64,
    pub linear_model: f64,
}

/// Ensemble next-day return forecast.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PricePrediction {
    /// Mean of the three model outputs.
    pub predicted_return: f64,
    pub model_outputs: ModelOutputs,
    /// 1 minus the spread of the model outputs, floored at 0.1.
    pub confidence: f64,
}

impl PricePrediction {
    /// Neutral default when the ensemble fails numerically.
    pub fn degraded() -> Self {
        Self {
            predicted_return: 0.0,
            model_outputs: ModelOutputs {
                random_forest: 0.0,
                gradient_boost: 0.0,
                linear_model: 0.0,
            },
            confidence: 0.0,
        }
    }
}

/// Five-bar direction forecast.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrendPrediction {
    /// Estimated probability that the close is higher five bars out.
    pub probability: f64,
    pub direction: TrendDirection,
    /// Distance from a coin flip, scaled to [0, 1].
    pub strength: f64,
}

impl TrendPrediction {
    pub fn degraded() -> Self {
        Self {
            probability: 0.5,
            direction: TrendDirection::Neutral,
            strength: 0.0,
        }
    }
}

/// Short-horizon realized-volatility forecast.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VolatilityPrediction {
    /// Forecast 5-bar return standard deviation (daily scale).
    pub forecast: f64,
    pub regime: VolatilityRegime,
    pub trend: VolatilityTrend,
}

impl VolatilityPrediction {
    pub fn degraded() -> Self {
        Self {
            forecast: 0.02,
            regime: VolatilityRegime::Medium,
            trend: VolatilityTrend::Stable,
        }
    }
}

/// Weighted risk picture across volatility, price level, macro,
/// liquidity and concentration factors.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RiskAssessment {
    pub volatility_risk: RiskLevel,
    pub price_level_risk: RiskLevel,
    /// Geopolitical risk rescaled to [0, 1].
    pub macro_risk: f64,
    pub liquidity_risk: RiskLevel,
    pub concentration_risk: RiskLevel,
    /// Weighted factor score in [0, 1].
    pub overall_score: f64,
    pub level: RiskLevel,
    pub mitigation_suggestions: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Scenario {
    pub probability: f64,
    pub expected_return: f64,
    pub key_drivers: Vec<String>,
    pub timeframe: String,
}

/// Fixed bull/base/bear prior over the coming quarter.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScenarioSet {
    pub bull_case: Scenario,
    pub base_case: Scenario,
    pub bear_case: Scenario,
}

impl ScenarioSet {
    /// The static scenario prior. Probabilities sum to one.
    pub fn baseline() -> Self {
        let scenario = |probability, expected_return, drivers: [&str; 3]| Scenario {
            probability,
            expected_return,
            key_drivers: drivers.iter().map(|d| d.to_string()).collect(),
            timeframe: "3_months".to_string(),
        };
        Self {
            bull_case: scenario(
                0.3,
                0.15,
                ["strong_earnings", "fed_pivot", "tech_innovation"],
            ),
            base_case: scenario(
                0.5,
                0.05,
                ["steady_growth", "stable_policy", "moderate_inflation"],
            ),
            bear_case: scenario(
                0.2,
                -0.10,
                ["recession_fears", "policy_tightening", "geopolitical_tensions"],
            ),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConfidenceMetrics {
    /// min(1, rows / 1000): more history, more trust.
    pub data_quality: f64,
    pub feature_stability: f64,
    pub model_agreement: f64,
    pub overall: f64,
    pub level: ConfidenceLevel,
}

/// One named driver behind the forecast, for the report reader.
#[derive(Debug, Clone, serde::Serialize)]
pub struct KeyFactor {
    pub factor: String,
    pub impact: FactorImpact,
    pub strength: FactorStrength,
    pub description: String,
}

/// Complete forward-looking view for one symbol.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Prediction {
    pub symbol: String,
    pub horizon: String,
    pub price: PricePrediction,
    pub trend: TrendPrediction,
    pub volatility: VolatilityPrediction,
    pub risk: RiskAssessment,
    pub scenarios: ScenarioSet,
    pub confidence: ConfidenceMetrics,
    pub key_factors: Vec<KeyFactor>,
}
