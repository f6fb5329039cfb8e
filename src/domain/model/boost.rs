//! Gradient boosting over shallow regression trees.
//!
//! Squared-error boosting: start from the target mean, then repeatedly
//! fit a small tree to the current residuals and fold it in scaled by
//! the learning rate. No subsampling, so the fit is deterministic
//! without an RNG.

use super::tree::DecisionTree;
use super::{ModelParams, Regressor};

#[derive(Debug, Clone)]
pub struct GradientBoost {
    base: f64,
    learning_rate: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoost {
    pub fn fit(x: &[&[f64]], y: &[f64], params: &ModelParams) -> Self {
        let n = x.len();
        let base = if n == 0 {
            0.0
        } else {
            y.iter().sum::<f64>() / n as f64
        };

        let indices: Vec<usize> = (0..n).collect();
        let mut residuals: Vec<f64> = y.iter().map(|v| v - base).collect();
        let mut trees = Vec::with_capacity(params.boost_rounds);

        for _ in 0..params.boost_rounds {
            if n == 0 {
                break;
            }
            let tree = DecisionTree::fit(
                x,
                &residuals,
                &indices,
                params.boost_depth,
                params.min_leaf,
            );
            for (i, residual) in residuals.iter_mut().enumerate() {
                *residual -= params.learning_rate * tree.predict(x[i]);
            }
            trees.push(tree);
        }

        Self {
            base,
            learning_rate: params.learning_rate,
            trees,
        }
    }
}

impl Regressor for GradientBoost {
    fn predict(&self, row: &[f64]) -> f64 {
        self.base
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|t| t.predict(row))
                    .sum::<f64>()
    }
}
