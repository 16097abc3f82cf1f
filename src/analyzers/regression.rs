//! Ordinary least squares with an intercept, solved through the normal
//! equations.

use anyhow::{Result, bail, ensure};
use serde::Serialize;

use crate::analyzers::utility::mean;

/// Share of rows held out for scoring.
pub const TEST_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub feature: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Regression {
    pub target: String,
    pub intercept: f64,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub mean_squared_error: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl Regression {
    /// Feature with the largest absolute coefficient.
    pub fn strongest(&self) -> Option<&Coefficient> {
        self.coefficients
            .iter()
            .max_by(|a, b| a.value.abs().total_cmp(&b.value.abs()))
    }
}

/// Deterministic interleaved split: a row goes to the test side each time
/// the running count crosses a multiple of `1 / test_fraction`.
pub fn train_test_split<T: Clone>(rows: &[T], test_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let before = (i as f64 * test_fraction).floor();
        let after = ((i + 1) as f64 * test_fraction).floor();
        if after > before {
            test.push(row.clone());
        } else {
            train.push(row.clone());
        }
    }

    (train, test)
}

/// Fits `y = b0 + b1*x1 + ... + bk*xk`. Returns `[b0, b1, ..., bk]`.
pub fn fit_ols(x: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
    ensure!(x.len() == y.len(), "{} rows but {} targets", x.len(), y.len());
    ensure!(!x.is_empty(), "no rows to fit");

    let k = x[0].len() + 1;
    ensure!(x.len() >= k, "need at least {k} rows, got {}", x.len());

    // Normal equations: (X^T X) b = X^T y, with a leading column of ones.
    let mut a = vec![vec![0.0; k + 1]; k];
    for (row, target) in x.iter().zip(y) {
        ensure!(row.len() + 1 == k, "ragged feature row");
        let design: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
        for i in 0..k {
            for j in 0..k {
                a[i][j] += design[i] * design[j];
            }
            a[i][k] += design[i] * target;
        }
    }

    solve(a)
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix.
fn solve(mut a: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let n = a.len();
    let scale = a
        .iter()
        .flat_map(|r| r[..n].iter())
        .fold(0.0f64, |m, v| m.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 * scale {
            bail!("design matrix is singular");
        }
        a.swap(col, pivot);

        let p = a[col][col];
        for v in a[col].iter_mut() {
            *v /= p;
        }
        for r in 0..n {
            if r != col {
                let factor = a[r][col];
                if factor != 0.0 {
                    for c in col..=n {
                        a[r][c] -= factor * a[col][c];
                    }
                }
            }
        }
    }

    Ok(a.into_iter().map(|row| row[n]).collect())
}

pub fn predict(beta: &[f64], row: &[f64]) -> f64 {
    beta[0] + beta[1..].iter().zip(row).map(|(b, x)| b * x).sum::<f64>()
}

/// Coefficient of determination. NaN when `actual` has no variance.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let m = mean(actual);
    let ss_tot: f64 = actual.iter().map(|y| (y - m).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return f64::NAN;
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Fits on the training split and scores on the held-out rows.
pub fn regress(
    target: &str,
    features: &[&str],
    x: &[Vec<f64>],
    y: &[f64],
) -> Result<Regression> {
    let rows: Vec<(Vec<f64>, f64)> = x.iter().cloned().zip(y.iter().copied()).collect();
    let (train, test) = train_test_split(&rows, TEST_FRACTION);

    let (train_x, train_y): (Vec<Vec<f64>>, Vec<f64>) = train.into_iter().unzip();
    let beta = fit_ols(&train_x, &train_y)?;

    let test_y: Vec<f64> = test.iter().map(|(_, y)| *y).collect();
    let predicted: Vec<f64> = test.iter().map(|(row, _)| predict(&beta, row)).collect();

    Ok(Regression {
        target: target.to_string(),
        intercept: beta[0],
        coefficients: features
            .iter()
            .zip(&beta[1..])
            .map(|(f, v)| Coefficient {
                feature: f.to_string(),
                value: *v,
            })
            .collect(),
        r_squared: r2_score(&test_y, &predicted),
        mean_squared_error: mean_squared_error(&test_y, &predicted),
        train_rows: train_y.len(),
        test_rows: test_y.len(),
    })
}
