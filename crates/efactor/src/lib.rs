//! `cinder-efactor` — back-calculates material throughput and consumed energy
//! from the pollutant inventory's reported emissions and emission factors.
//!
//! Every unit usually carries several redundant emission records (different
//! pollutants, periodic entries); their disagreement is kept as calibrated
//! uncertainty by collapsing to a quantile triple rather than averaging.
//! Reported factors are cross-checked against a crowd-sourced factor table,
//! with IQR-based outlier correction and a plausibility ceiling backed by
//! design-capacity regeneration.

pub mod capacity;
pub mod estimate;
pub mod outlier;
pub mod record;

pub use capacity::capacity_from_text;
pub use estimate::{estimate_units, EfStats, EfUnitEstimate, EstimatorConfig};
pub use outlier::{correct_outliers, iqr_fences, CorrectedFactor};
pub use record::{ActionVerb, NeiRecord, SecondaryFactor, SecondaryTable};

/// Maximum plausible unit-level annual energy, MJ. The largest unit-level
/// value ever observed in the tier-methodology source; anything above it is
/// treated as an artifact of a bad factor or unit of measure.
pub const MAX_UNIT_ENERGY_MJ: f64 = 7.9e10;
