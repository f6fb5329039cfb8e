//! Regression models backing the prediction engine.
//!
//! Three regressors share one prediction interface: a bagged forest of
//! CART trees, gradient boosting over shallow trees, and a
//! ridge-stabilized linear model. All of them fit in one pass from a
//! slice of feature rows and are immutable afterwards, so a fitted
//! model is `Send + Sync` and two fits on the same data produce the
//! same predictions.

pub mod boost;
pub mod forest;
pub mod linear;
pub mod tree;

pub use boost::GradientBoost;
pub use forest::RandomForest;
pub use linear::LinearModel;

/// A fitted regression model.
pub trait Regressor {
    /// Predicts the target for one feature row.
    fn predict(&self, row: &[f64]) -> f64;
}

/// Hyperparameters shared across the ensemble.
///
/// The defaults mirror the production configuration: 100 trees in the
/// forest and 100 boosting rounds with depth-3 trees and a 0.1
/// learning rate, all seeded at 42. Tests shrink these to keep fits
/// fast.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub trees: usize,
    pub max_depth: usize,
    pub min_leaf: usize,
    pub boost_rounds: usize,
    pub boost_depth: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 8,
            min_leaf: 5,
            boost_rounds: 100,
            boost_depth: 3,
            learning_rate: 0.1,
            seed: 42,
        }
    }
}

impl ModelParams {
    /// A small configuration for unit tests.
    #[cfg(test)]
    pub(crate) fn tiny() -> Self {
        Self {
            trees: 10,
            max_depth: 4,
            min_leaf: 2,
            boost_rounds: 20,
            boost_depth: 2,
            learning_rate: 0.1,
            seed: 42,
        }
    }
}
