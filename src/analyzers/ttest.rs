use anyhow::{Result, anyhow, ensure};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::analyzers::utility::{mean, variance};

/// p-values below this are reported as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTest {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
    pub significant: bool,
}

/// Two-sided Student's t-test for independent samples with pooled variance.
pub fn ttest_ind(a: &[f64], b: &[f64]) -> Result<TTest> {
    ensure!(
        a.len() >= 2 && b.len() >= 2,
        "t-test needs at least two observations per group (got {} and {})",
        a.len(),
        b.len()
    );

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a), mean(b));
    let df = n1 + n2 - 2.0;

    let pooled = ((n1 - 1.0) * variance(a, m1) + (n2 - 1.0) * variance(b, m2)) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    ensure!(se > 0.0, "both groups have zero variance");

    let t = (m1 - m2) / se;
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| anyhow!("invalid t distribution: {e}"))?;
    let p = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);

    Ok(TTest {
        t_statistic: t,
        p_value: p,
        degrees_of_freedom: df,
        significant: p < SIGNIFICANCE_LEVEL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separated_groups_are_significant() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [6.0, 7.0, 8.0, 9.0, 10.0];
        let r = ttest_ind(&a, &b).unwrap();

        assert!((r.t_statistic + 5.0).abs() < 1e-12);
        assert_eq!(r.degrees_of_freedom, 8.0);
        // scipy.stats.ttest_ind gives p = 0.001052
        assert!((r.p_value - 0.001052).abs() < 1e-5);
        assert!(r.significant);
    }

    #[test]
    fn test_identical_groups_not_significant() {
        let a = [1.0, 2.0, 3.0];
        let r = ttest_ind(&a, &a).unwrap();
        assert_eq!(r.t_statistic, 0.0);
        assert!((r.p_value - 1.0).abs() < 1e-12);
        assert!(!r.significant);
    }

    #[test]
    fn test_small_group_rejected() {
        assert!(ttest_ind(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_zero_variance_rejected() {
        assert!(ttest_ind(&[3.0, 3.0], &[3.0, 3.0]).is_err());
    }
}
