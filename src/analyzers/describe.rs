use serde::Serialize;

use crate::analyzers::utility::{mean, quantile, variance};

/// Summary statistics of one numeric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Describe {
    /// Standard deviation uses the sample (n - 1) denominator.
    /// Empty input yields a zero count and NaN everywhere else.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Describe {
                count: 0,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                median: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let m = mean(values);
        let std = if values.len() > 1 {
            variance(values, m).sqrt()
        } else {
            f64::NAN
        };

        Describe {
            count: values.len(),
            mean: m,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        }
    }
}
