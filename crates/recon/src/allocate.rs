use cinder_core::QuantileTriple;

/// Result of disaggregating one facility-fuel OCS lump onto the pollutant
/// inventory's named sub-units.
#[derive(Debug, Clone, PartialEq)]
pub enum Allocation {
    /// Sub-unit estimates were positive and fit inside the OCS total; they
    /// are kept unchanged.
    Retained(Vec<QuantileTriple>),
    /// Sub-unit estimates were scaled so their central values sum to the OCS
    /// total, preserving each sub-unit's share.
    Scaled(Vec<QuantileTriple>),
    /// No positive sub-unit evidence to allocate onto.
    NoSubUnits,
}

/// Allocate `ocs_total_mj` across sub-unit estimates by proportional share
/// of their central (q2) values.
///
/// If the sub-unit sum is positive and does not exceed the OCS total, the
/// independent estimates are direct evidence and are kept. Otherwise each
/// sub-unit gets `ocs_total * share`, applied to the whole triple so the
/// calibrated spread scales with the center.
pub fn allocate_ocs(ocs_total_mj: f64, sub_units: &[QuantileTriple]) -> Allocation {
    let sum: f64 = sub_units.iter().map(|t| t.q2).sum();
    if sub_units.is_empty() || sum <= 0.0 {
        return Allocation::NoSubUnits;
    }
    if sum <= ocs_total_mj {
        return Allocation::Retained(sub_units.to_vec());
    }
    let factor = ocs_total_mj / sum;
    Allocation::Scaled(sub_units.iter().map(|t| t.scale(factor)).collect())
}
