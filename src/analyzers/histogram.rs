use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    /// Index of the most populated bin (first one on ties).
    pub peak: Option<usize>,
}

/// Equal-width histogram over [min, max] with the last bin closed on the right.
///
/// A constant series is spread over [v - 0.5, v + 0.5].
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram {
            bins: Vec::new(),
            peak: None,
        };
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let mut peak = 0;
    for (i, c) in counts.iter().enumerate() {
        if *c > counts[peak] {
            peak = i;
        }
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect();

    Histogram {
        bins,
        peak: Some(peak),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_last_bin_inclusive() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let h = histogram(&values, 3);

        let counts: Vec<usize> = h.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![3, 3, 4]);
        assert_eq!(h.peak, Some(2));
        assert_eq!(h.bins[0].lower, 0.0);
        assert_eq!(h.bins[2].upper, 9.0);
    }

    #[test]
    fn test_histogram_constant_series() {
        let h = histogram(&[2.0, 2.0, 2.0], 2);
        assert_eq!(h.bins[0].lower, 1.5);
        assert_eq!(h.bins[1].upper, 2.5);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_histogram_empty() {
        let h = histogram(&[], 30);
        assert!(h.bins.is_empty());
        assert_eq!(h.peak, None);
    }
}
