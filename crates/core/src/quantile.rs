use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Calibrated range used everywhere a point estimate would overstate
/// confidence: minimum, median, and 75th percentile of the underlying
/// evidence. Invariant: `0 <= q0 <= q2 <= q3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileTriple {
    pub q0: f64,
    pub q2: f64,
    pub q3: f64,
}

impl QuantileTriple {
    /// A degenerate triple from a single observation.
    pub fn scalar(value: f64) -> QuantileTriple {
        QuantileTriple {
            q0: value,
            q2: value,
            q3: value,
        }
    }

    /// Collapse a series of redundant estimates into the 0th/50th/75th
    /// percentiles. The caller must pass the series in its documented stable
    /// order; this function re-sorts by value internally (via `OrderedFloat`,
    /// so NaN cannot poison the order) which makes the result independent of
    /// input permutation.
    ///
    /// Returns `None` for an empty series or one with no positive total, per
    /// the rule that absent evidence is dropped rather than kept as zero.
    pub fn from_samples(samples: &[f64]) -> Option<QuantileTriple> {
        if samples.is_empty() || !samples.iter().any(|v| *v > 0.0) {
            return None;
        }
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by_key(|v| OrderedFloat(*v));
        Some(QuantileTriple {
            q0: sorted[0],
            q2: percentile(&sorted, 0.50),
            q3: percentile(&sorted, 0.75),
        })
    }

    pub fn is_ordered(&self) -> bool {
        self.q0 >= 0.0 && self.q0 <= self.q2 && self.q2 <= self.q3
    }

    pub fn scale(&self, factor: f64) -> QuantileTriple {
        QuantileTriple {
            q0: self.q0 * factor,
            q2: self.q2 * factor,
            q3: self.q3 * factor,
        }
    }
}

/// Linear interpolation between closest ranks over an already-sorted slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&p));
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
