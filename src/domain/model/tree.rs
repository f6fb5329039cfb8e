//! CART regression tree.
//!
//! Nodes live in an arena and reference each other by index, so the
//! tree is a flat `Vec` with the root at 0. Split search is exact:
//! every feature is scanned with sorted prefix sums, and the split
//! minimizing the summed squared error of the two children wins.
//! Thresholds sit at the midpoint between adjacent distinct values.

use super::Regressor;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fits a tree on the rows selected by `indices` (repeats allowed,
    /// which is how the forest feeds bootstrap samples in).
    pub fn fit(
        x: &[&[f64]],
        y: &[f64],
        indices: &[usize],
        max_depth: usize,
        min_leaf: usize,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, indices.to_vec(), max_depth, min_leaf);
        tree
    }

    /// Grows one node and returns its arena index.
    fn grow(
        &mut self,
        x: &[&[f64]],
        y: &[f64],
        indices: Vec<usize>,
        depth_left: usize,
        min_leaf: usize,
    ) -> usize {
        let mean = mean_of(y, &indices);

        if depth_left == 0 || indices.len() < 2 * min_leaf.max(1) {
            return self.push_leaf(mean);
        }
        match best_split(x, y, &indices, min_leaf.max(1)) {
            None => self.push_leaf(mean),
            Some(split) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .into_iter()
                    .partition(|&i| x[i][split.feature] <= split.threshold);

                // reserve the slot before recursing so the root stays at 0
                let node = self.nodes.len();
                self.nodes.push(Node::Leaf { value: mean });
                let left = self.grow(x, y, left_idx, depth_left - 1, min_leaf);
                let right = self.grow(x, y, right_idx, depth_left - 1, min_leaf);
                self.nodes[node] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                node
            }
        }
    }

    fn push_leaf(&mut self, value: f64) -> usize {
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }
}

impl Regressor for DecisionTree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

/// Exhaustive split search. Returns `None` when the node is pure or
/// no split leaves `min_leaf` rows on each side.
fn best_split(
    x: &[&[f64]],
    y: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<SplitChoice> {
    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let node_sse = total_sq - total * total / n as f64;
    if node_sse <= 1e-12 {
        return None;
    }

    let n_features = x[indices[0]].len();
    let mut best: Option<(f64, SplitChoice)> = None;
    let mut sorted: Vec<(f64, f64)> = Vec::with_capacity(n);

    for feature in 0..n_features {
        sorted.clear();
        sorted.extend(indices.iter().map(|&i| (x[i][feature], y[i])));
        sorted.sort_by(|a, b| f64::total_cmp(&a.0, &b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            left_sum += sorted[k - 1].1;
            left_sq += sorted[k - 1].1 * sorted[k - 1].1;

            if sorted[k - 1].0 == sorted[k].0 {
                continue;
            }
            if k < min_leaf || n - k < min_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / k as f64)
                + (right_sq - right_sum * right_sum / (n - k) as f64);

            if best.as_ref().is_none_or(|(score, _)| sse < *score) {
                best = Some((
                    sse,
                    SplitChoice {
                        feature,
                        threshold: (sorted[k - 1].0 + sorted[k].0) / 2.0,
                    },
                ));
            }
        }
    }

    best.map(|(_, choice)| choice)
}
