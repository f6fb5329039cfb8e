//! Portfolio construction from per-asset return statistics.
//!
//! Weighting is profile-driven rather than solved: conservative and
//! aggressive profiles use fixed per-asset weights, moderate is equal
//! weight. In the default `Literal` scheme the fixed weights are
//! applied as-is, so with anything other than five conservative or
//! four aggressive assets they deliberately do not sum to one and the
//! remainder stays unallocated; `Normalized` rescales them to a fully
//! invested portfolio.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::MarketlensError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::risk::{
    annualized_return, annualized_volatility, max_drawdown, mean, pearson_correlation,
    sharpe_ratio, simple_returns,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl FromStr for RiskTolerance {
    type Err = MarketlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(MarketlensError::Validation {
                reason: format!(
                    "unknown risk tolerance '{other}' (expected conservative, moderate or aggressive)"
                ),
            }),
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        };
        f.write_str(s)
    }
}

/// How profile weights are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightScheme {
    /// Fixed per-asset weights as-is, whatever they sum to.
    #[default]
    Literal,
    /// Rescaled so the weights sum to one.
    Normalized,
}

/// How per-asset correlation is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMode {
    /// Fixed 0.5 placeholder.
    #[default]
    Literal,
    /// Mean pairwise Pearson correlation against the other assets.
    Computed,
}

/// Annualized per-asset figures feeding the portfolio metrics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AssetStatistics {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub correlation: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PortfolioMetrics {
    /// Weighted sum of asset returns.
    pub expected_return: f64,
    /// Weighted sum of asset volatilities (correlation-blind).
    pub expected_volatility: f64,
    pub sharpe_ratio: f64,
    pub diversification_score: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Allocation {
    pub risk_profile: RiskTolerance,
    pub weights: BTreeMap<String, f64>,
    pub dollar_amounts: BTreeMap<String, f64>,
    pub total_investment: f64,
    pub asset_statistics: BTreeMap<String, AssetStatistics>,
    pub metrics: PortfolioMetrics,
    pub recommendations: Vec<String>,
}

pub struct PortfolioOptimizer {
    weight_scheme: WeightScheme,
    correlation_mode: CorrelationMode,
}

impl Default for PortfolioOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioOptimizer {
    pub fn new() -> Self {
        Self {
            weight_scheme: WeightScheme::default(),
            correlation_mode: CorrelationMode::default(),
        }
    }

    pub fn with_modes(weight_scheme: WeightScheme, correlation_mode: CorrelationMode) -> Self {
        Self {
            weight_scheme,
            correlation_mode,
        }
    }

    /// Allocates `investment_amount` across `assets` for the given
    /// risk profile.
    ///
    /// Fails with `NoAssets` on an empty map and `InsufficientData`
    /// for any asset with fewer than two bars (no return can be
    /// computed from one price).
    pub fn optimize(
        &self,
        assets: &BTreeMap<String, PriceSeries>,
        risk_tolerance: RiskTolerance,
        investment_amount: f64,
    ) -> Result<Allocation, MarketlensError> {
        if assets.is_empty() {
            return Err(MarketlensError::NoAssets);
        }
        if !investment_amount.is_finite() || investment_amount < 0.0 {
            return Err(MarketlensError::Validation {
                reason: format!("investment amount must be non-negative, got {investment_amount}"),
            });
        }
        for (symbol, series) in assets {
            if series.len() < 2 {
                return Err(MarketlensError::InsufficientData {
                    symbol: symbol.clone(),
                    rows: series.len(),
                    minimum: 2,
                });
            }
        }

        let returns: BTreeMap<&str, Vec<f64>> = assets
            .iter()
            .map(|(symbol, series)| (symbol.as_str(), simple_returns(&series.closes())))
            .collect();

        let asset_statistics: BTreeMap<String, AssetStatistics> = returns
            .iter()
            .map(|(symbol, rets)| {
                let correlation = match self.correlation_mode {
                    CorrelationMode::Literal => 0.5,
                    CorrelationMode::Computed => mean_pairwise_correlation(symbol, &returns),
                };
                let stats = AssetStatistics {
                    expected_return: annualized_return(rets),
                    volatility: annualized_volatility(rets),
                    sharpe_ratio: sharpe_ratio(rets),
                    max_drawdown: max_drawdown(rets),
                    correlation,
                };
                (symbol.to_string(), stats)
            })
            .collect();

        let base_weight = match risk_tolerance {
            RiskTolerance::Conservative => 0.20,
            RiskTolerance::Aggressive => 0.25,
            RiskTolerance::Moderate => 1.0 / assets.len() as f64,
        };
        let mut weights: BTreeMap<String, f64> = assets
            .keys()
            .map(|symbol| (symbol.clone(), base_weight))
            .collect();
        if self.weight_scheme == WeightScheme::Normalized {
            let total: f64 = weights.values().sum();
            if total > 0.0 {
                for weight in weights.values_mut() {
                    *weight /= total;
                }
            }
        }

        let dollar_amounts: BTreeMap<String, f64> = weights
            .iter()
            .map(|(symbol, weight)| (symbol.clone(), weight * investment_amount))
            .collect();

        let expected_return: f64 = weights
            .iter()
            .map(|(symbol, weight)| weight * asset_statistics[symbol].expected_return)
            .sum();
        let expected_volatility: f64 = weights
            .iter()
            .map(|(symbol, weight)| weight * asset_statistics[symbol].volatility)
            .sum();
        let portfolio_sharpe = if expected_volatility > 0.0 {
            expected_return / expected_volatility
        } else {
            0.0
        };

        Ok(Allocation {
            risk_profile: risk_tolerance,
            weights,
            dollar_amounts,
            total_investment: investment_amount,
            asset_statistics,
            metrics: PortfolioMetrics {
                expected_return,
                expected_volatility,
                sharpe_ratio: portfolio_sharpe,
                diversification_score: 0.8,
            },
            recommendations: recommendations(),
        })
    }
}

/// Mean correlation of one asset's returns against every other asset,
/// tail-aligned to the shorter series. A lone asset correlates 0.
fn mean_pairwise_correlation(own: &str, returns: &BTreeMap<&str, Vec<f64>>) -> f64 {
    let mine = &returns[own];
    let pairwise: Vec<f64> = returns
        .iter()
        .filter(|(symbol, _)| **symbol != own)
        .map(|(_, theirs)| tail_correlation(mine, theirs))
        .collect();
    mean(&pairwise)
}

fn tail_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    pearson_correlation(&a[a.len() - n..], &b[b.len() - n..])
}

fn recommendations() -> Vec<String> {
    [
        "Consider rebalancing quarterly to maintain target allocation",
        "Monitor macroeconomic factors that may impact sector performance",
        "Review risk tolerance and adjust allocation if needed",
        "Consider adding international exposure for diversification",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: (close - 1.0).max(0.0),
                close,
                volume: 1_000.0,
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    fn assets(entries: &[(&str, Vec<f64>)]) -> BTreeMap<String, PriceSeries> {
        entries
            .iter()
            .map(|(symbol, closes)| (symbol.to_string(), series(symbol, closes)))
            .collect()
    }

    fn climbing(start: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + i as f64).collect()
    }

    #[test]
    fn conservative_literal_weights_are_fixed() {
        let map = assets(&[
            ("AAA", climbing(100.0, 30)),
            ("BBB", climbing(50.0, 30)),
            ("CCC", climbing(80.0, 30)),
            ("DDD", climbing(20.0, 30)),
            ("EEE", climbing(60.0, 30)),
        ]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Conservative, 100_000.0)
            .unwrap();

        for weight in allocation.weights.values() {
            assert_relative_eq!(*weight, 0.20);
        }
        // five assets at 0.20 happen to cover the full amount
        let total: f64 = allocation.weights.values().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn literal_weights_may_leave_cash_unallocated() {
        let map = assets(&[
            ("AAA", climbing(100.0, 30)),
            ("BBB", climbing(50.0, 30)),
        ]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Conservative, 100_000.0)
            .unwrap();

        let total: f64 = allocation.weights.values().sum();
        assert_relative_eq!(total, 0.40, epsilon = 1e-9);
        assert_relative_eq!(allocation.dollar_amounts["AAA"], 20_000.0, epsilon = 1e-6);
    }

    #[test]
    fn aggressive_literal_weight_is_quarter() {
        let map = assets(&[
            ("AAA", climbing(100.0, 30)),
            ("BBB", climbing(50.0, 30)),
        ]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Aggressive, 80_000.0)
            .unwrap();

        assert_relative_eq!(allocation.weights["AAA"], 0.25);
        assert_relative_eq!(allocation.dollar_amounts["BBB"], 20_000.0, epsilon = 1e-6);
    }

    #[test]
    fn moderate_is_equal_weight_summing_to_one() {
        let map = assets(&[
            ("AAA", climbing(100.0, 30)),
            ("BBB", climbing(50.0, 30)),
            ("CCC", climbing(80.0, 30)),
            ("DDD", climbing(20.0, 30)),
        ]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Moderate, 100_000.0)
            .unwrap();

        for weight in allocation.weights.values() {
            assert_relative_eq!(*weight, 0.25);
        }
        let total: f64 = allocation.weights.values().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn normalized_scheme_always_sums_to_one() {
        let map = assets(&[
            ("AAA", climbing(100.0, 30)),
            ("BBB", climbing(50.0, 30)),
            ("CCC", climbing(80.0, 30)),
        ]);
        let optimizer =
            PortfolioOptimizer::with_modes(WeightScheme::Normalized, CorrelationMode::Literal);
        let allocation = optimizer
            .optimize(&map, RiskTolerance::Conservative, 90_000.0)
            .unwrap();

        let total: f64 = allocation.weights.values().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        assert_relative_eq!(allocation.weights["AAA"], 1.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(allocation.dollar_amounts["AAA"], 30_000.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_universe_is_rejected() {
        let result =
            PortfolioOptimizer::new().optimize(&BTreeMap::new(), RiskTolerance::Moderate, 1.0);
        assert!(matches!(result, Err(MarketlensError::NoAssets)));
    }

    #[test]
    fn single_bar_asset_is_rejected() {
        let map = assets(&[("AAA", climbing(100.0, 30)), ("BBB", vec![42.0])]);
        let result = PortfolioOptimizer::new().optimize(&map, RiskTolerance::Moderate, 1.0);

        match result {
            Err(MarketlensError::InsufficientData {
                symbol,
                rows,
                minimum,
            }) => {
                assert_eq!(symbol, "BBB");
                assert_eq!(rows, 1);
                assert_eq!(minimum, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn negative_investment_is_rejected() {
        let map = assets(&[("AAA", climbing(100.0, 30))]);
        let result = PortfolioOptimizer::new().optimize(&map, RiskTolerance::Moderate, -5.0);
        assert!(matches!(result, Err(MarketlensError::Validation { .. })));
    }

    #[test]
    fn asset_statistics_known_values() {
        // returns +10% then -10%: zero mean, sample std sqrt(0.02),
        // drawdown -10%
        let map = assets(&[("AAA", vec![100.0, 110.0, 99.0])]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Moderate, 10_000.0)
            .unwrap();

        let stats = &allocation.asset_statistics["AAA"];
        assert_relative_eq!(stats.expected_return, 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            stats.volatility,
            (0.02f64).sqrt() * 252.0f64.sqrt(),
            epsilon = 1e-9
        );
        assert_relative_eq!(stats.sharpe_ratio, 0.0, epsilon = 1e-9);
        assert_relative_eq!(stats.max_drawdown, -0.1, epsilon = 1e-9);
        assert_relative_eq!(stats.correlation, 0.5);
    }

    #[test]
    fn metrics_are_weighted_sums() {
        let map = assets(&[
            ("AAA", vec![100.0, 110.0, 99.0]),
            ("BBB", climbing(50.0, 3)),
        ]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Moderate, 10_000.0)
            .unwrap();

        let a = &allocation.asset_statistics["AAA"];
        let b = &allocation.asset_statistics["BBB"];
        let expected_return = 0.5 * a.expected_return + 0.5 * b.expected_return;
        let expected_volatility = 0.5 * a.volatility + 0.5 * b.volatility;

        assert_relative_eq!(
            allocation.metrics.expected_return,
            expected_return,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            allocation.metrics.expected_volatility,
            expected_volatility,
            epsilon = 1e-9
        );
        assert_relative_eq!(allocation.metrics.diversification_score, 0.8);
    }

    #[test]
    fn computed_correlation_of_identical_assets_is_one() {
        let map = assets(&[
            ("AAA", vec![100.0, 110.0, 99.0, 105.0, 101.0]),
            ("BBB", vec![200.0, 220.0, 198.0, 210.0, 202.0]),
        ]);
        let optimizer =
            PortfolioOptimizer::with_modes(WeightScheme::Literal, CorrelationMode::Computed);
        let allocation = optimizer
            .optimize(&map, RiskTolerance::Moderate, 10_000.0)
            .unwrap();

        // BBB is AAA scaled by two, so their returns are identical
        assert_relative_eq!(
            allocation.asset_statistics["AAA"].correlation,
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn computed_correlation_single_asset_is_zero() {
        let map = assets(&[("AAA", vec![100.0, 110.0, 99.0])]);
        let optimizer =
            PortfolioOptimizer::with_modes(WeightScheme::Literal, CorrelationMode::Computed);
        let allocation = optimizer
            .optimize(&map, RiskTolerance::Moderate, 10_000.0)
            .unwrap();

        assert_relative_eq!(allocation.asset_statistics["AAA"].correlation, 0.0);
    }

    #[test]
    fn recommendations_are_stable() {
        let map = assets(&[("AAA", climbing(100.0, 30))]);
        let allocation = PortfolioOptimizer::new()
            .optimize(&map, RiskTolerance::Moderate, 10_000.0)
            .unwrap();

        assert_eq!(allocation.recommendations.len(), 4);
        assert_eq!(
            allocation.recommendations[0],
            "Consider rebalancing quarterly to maintain target allocation"
        );
    }

    #[test]
    fn risk_tolerance_parses_case_insensitively() {
        assert_eq!(
            "Moderate".parse::<RiskTolerance>().unwrap(),
            RiskTolerance::Moderate
        );
        assert_eq!(
            "AGGRESSIVE".parse::<RiskTolerance>().unwrap(),
            RiskTolerance::Aggressive
        );
        assert!(matches!(
            "yolo".parse::<RiskTolerance>(),
            Err(MarketlensError::Validation { .. })
        ));
    }
}
