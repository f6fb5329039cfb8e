//! Ridge-stabilized linear regression.
//!
//! Features and target are centered before solving the normal
//! equations, so the intercept is just the target mean and constant
//! feature columns (the broadcast macro values) end up with a zero
//! coefficient instead of blowing up the solve. The ridge term is tiny
//! and only there to keep the system invertible.

use super::Regressor;

const RIDGE_LAMBDA: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct LinearModel {
    feature_means: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn fit(x: &[&[f64]], y: &[f64]) -> Self {
        let n = x.len();
        if n == 0 {
            return Self {
                feature_means: Vec::new(),
                coefficients: Vec::new(),
                intercept: 0.0,
            };
        }
        let d = x[0].len();

        let mut feature_means = vec![0.0; d];
        for row in x {
            for (m, v) in feature_means.iter_mut().zip(*row) {
                *m += v;
            }
        }
        for m in &mut feature_means {
            *m /= n as f64;
        }
        let intercept = y.iter().sum::<f64>() / n as f64;

        // normal equations on centered data: (XᵀX + λI) w = Xᵀy
        let mut gram = vec![vec![0.0; d]; d];
        let mut moment = vec![0.0; d];
        for (row, &target) in x.iter().zip(y) {
            let centered: Vec<f64> = row
                .iter()
                .zip(&feature_means)
                .map(|(v, m)| v - m)
                .collect();
            let residual = target - intercept;
            for j in 0..d {
                moment[j] += centered[j] * residual;
                for k in j..d {
                    gram[j][k] += centered[j] * centered[k];
                }
            }
        }
        for j in 0..d {
            gram[j][j] += RIDGE_LAMBDA;
            for k in 0..j {
                gram[j][k] = gram[k][j];
            }
        }

        let coefficients = solve(gram, moment);

        Self {
            feature_means,
            coefficients,
            intercept,
        }
    }
}

impl Regressor for LinearModel {
    fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + row
                .iter()
                .zip(&self.feature_means)
                .zip(&self.coefficients)
                .map(|((v, m), c)| (v - m) * c)
                .sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting. A vanishing pivot zeroes
/// that unknown rather than failing the solve.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let d = b.len();

    for col in 0..d {
        let pivot_row = (col..d)
            .max_by(|&p, &q| f64::total_cmp(&a[p][col].abs(), &a[q][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col];
        if pivot.abs() < 1e-12 {
            continue;
        }
        for row in (col + 1)..d {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..d {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; d];
    for col in (0..d).rev() {
        let pivot = a[col][col];
        if pivot.abs() < 1e-12 {
            x[col] = 0.0;
            continue;
        }
        let tail: f64 = ((col + 1)..d).map(|k| a[col][k] * x[k]).sum();
        x[col] = (b[col] - tail) / pivot;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rows(data: &[Vec<f64>]) -> Vec<&[f64]> {
        data.iter().map(|r| r.as_slice()).collect()
    }

    #[test]
    fn recovers_a_single_slope() {
        // y = 2x + 1
        let data: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let x = rows(&data);
        let y: Vec<f64> = (0..20).map(|i| 2.0 * i as f64 + 1.0).collect();

        let model = LinearModel::fit(&x, &y);

        assert_relative_eq!(model.predict(&[0.0]), 1.0, epsilon = 1e-6);
        assert_relative_eq!(model.predict(&[10.0]), 21.0, epsilon = 1e-6);
        assert_relative_eq!(model.predict(&[50.0]), 101.0, epsilon = 1e-4);
    }

    #[test]
    fn recovers_two_independent_slopes() {
        // y = 3a - 2b + 5 over a small grid
        let mut data = Vec::new();
        let mut y = Vec::new();
        for a in 0..6 {
            for b in 0..6 {
                data.push(vec![a as f64, b as f64]);
                y.push(3.0 * a as f64 - 2.0 * b as f64 + 5.0);
            }
        }
        let x = rows(&data);

        let model = LinearModel::fit(&x, &y);

        assert_relative_eq!(model.predict(&[2.0, 3.0]), 5.0, epsilon = 1e-6);
        assert_relative_eq!(model.predict(&[0.0, 0.0]), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn constant_feature_gets_zero_weight() {
        let data: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 7.0]).collect();
        let x = rows(&data);
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let model = LinearModel::fit(&x, &y);

        // the centered constant column contributes nothing either way,
        // but its coefficient must not pollute predictions at other
        // values of that feature
        assert!(model.coefficients[1].abs() < 1e-3);
        assert_relative_eq!(model.predict(&[4.0, 7.0]), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_fit_predicts_zero() {
        let model = LinearModel::fit(&[], &[]);
        assert_eq!(model.predict(&[]), 0.0);
    }

    #[test]
    fn intercept_is_the_target_mean() {
        let data: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let x = rows(&data);
        let y = vec![4.0; 8];

        let model = LinearModel::fit(&x, &y);

        assert_relative_eq!(model.intercept, 4.0);
        assert_relative_eq!(model.predict(&[3.0]), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn duplicated_feature_stays_finite() {
        // perfectly collinear columns: ridge keeps the solve stable and
        // the fitted function still matches the data
        let data: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, i as f64]).collect();
        let x = rows(&data);
        let y: Vec<f64> = (0..12).map(|i| 4.0 * i as f64).collect();

        let model = LinearModel::fit(&x, &y);

        let p = model.predict(&[6.0, 6.0]);
        assert!(p.is_finite());
        assert_relative_eq!(p, 24.0, epsilon = 1e-3);
    }
}
