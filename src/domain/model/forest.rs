//! Bootstrap-aggregated regression forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tree::DecisionTree;
use super::{ModelParams, Regressor};

/// Averaged ensemble of CART trees, each fit on a bootstrap resample.
///
/// The RNG is seeded from `params.seed`, so the same data and
/// parameters always grow the same forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(x: &[&[f64]], y: &[f64], params: &ModelParams) -> Self {
        let n = x.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.trees);

        for _ in 0..params.trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(DecisionTree::fit(
                x,
                y,
                &sample,
                params.max_depth,
                params.min_leaf,
            ));
        }

        Self { trees }
    }
}

impl Regressor for RandomForest {
    fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }
}
