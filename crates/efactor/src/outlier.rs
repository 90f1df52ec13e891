use ordered_float::OrderedFloat;

use cinder_core::quantile::percentile;

/// IQR fences for a factor group. The lower fence is floored at
/// `mean - 2*sigma` when `q1 - 1.5*IQR` would go negative, since emission
/// factors cannot be negative and the plain rule over-flags skewed groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fences {
    pub lo: f64,
    pub hi: f64,
}

impl Fences {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

/// Compute IQR fences over a group of factor values. `None` for groups too
/// small to have a meaningful spread.
pub fn iqr_fences(values: &[f64]) -> Option<Fences> {
    if values.len() < 4 {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.len() < 4 {
        return None;
    }
    sorted.sort_by_key(|v| OrderedFloat(*v));

    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;

    let mut lo = q1 - 1.5 * iqr;
    let hi = q3 + 1.5 * iqr;

    if lo < 0.0 {
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        lo = mean - 2.0 * variance.sqrt();
    }

    Some(Fences { lo, hi })
}

/// An outlier factor and the group median that replaces it in the corrected
/// series. Originals are never discarded; both estimates stay available.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedFactor {
    /// Index of the factor within the group it was detected in.
    pub index: usize,
    pub original: f64,
    pub corrected: f64,
}

/// Detect outliers in one factor group and pair each with the group median.
/// A group with no outliers returns no corrected rows.
pub fn correct_outliers(values: &[f64]) -> Vec<CorrectedFactor> {
    let Some(fences) = iqr_fences(values) else {
        return Vec::new();
    };

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));
    let median = percentile(&sorted, 0.50);

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !fences.contains(**v))
        .map(|(index, v)| CorrectedFactor {
            index,
            original: *v,
            corrected: median,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_is_flagged_and_replaced_by_median() {
        let corrected = correct_outliers(&[1.0, 1.0, 1.0, 1.0, 100.0]);
        assert_eq!(corrected.len(), 1);
        assert_eq!(corrected[0].index, 4);
        assert_eq!(corrected[0].original, 100.0);
        assert_eq!(corrected[0].corrected, 1.0);
    }

    #[test]
    fn uniform_group_has_no_outliers() {
        assert!(correct_outliers(&[2.0, 2.0, 2.0, 2.0, 2.0]).is_empty());
    }

    #[test]
    fn small_group_is_left_alone() {
        assert!(correct_outliers(&[1.0, 100.0]).is_empty());
    }

    #[test]
    fn lower_fence_floored_at_two_sigma() {
        // Skewed group where q1 - 1.5*IQR < 0: the floor keeps small
        // positive values from being flagged.
        let values = [1.0, 2.0, 3.0, 50.0];
        let fences = iqr_fences(&values).unwrap();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sigma =
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!((fences.lo - (mean - 2.0 * sigma)).abs() < 1e-9);
    }
}
