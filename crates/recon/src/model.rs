use serde::Serialize;

use cinder_core::CombustionUnit;
use cinder_efactor::EfStats;

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// Which reconciliation branch produced a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconBranch {
    /// Facility reports only to the pollutant inventory.
    NeiOnly,
    /// Facility reports only to the tier-methodology inventory.
    GhgrpOnly,
    /// Dual facility, no OCS ambiguity, tier-methodology estimate kept.
    DualTierPreferred,
    /// Dual facility, no OCS ambiguity, emission-factor estimate kept.
    DualEfPreferred,
    /// OCS present; sub-unit estimates fit inside the OCS total and were
    /// retained unchanged.
    OcsNeiRetained,
    /// OCS present; sub-unit estimates scaled to the OCS total by share.
    OcsScaled,
    /// OCS present but advisory and unallocatable; the lump was kept.
    OcsLumpKept,
}

impl std::fmt::Display for ReconBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NeiOnly => "nei_only",
            Self::GhgrpOnly => "ghgrp_only",
            Self::DualTierPreferred => "dual_tier_preferred",
            Self::DualEfPreferred => "dual_ef_preferred",
            Self::OcsNeiRetained => "ocs_nei_retained",
            Self::OcsScaled => "ocs_scaled",
            Self::OcsLumpKept => "ocs_lump_kept",
        };
        write!(f, "{name}")
    }
}

/// One compiled inventory row: a combustion unit with its resolved estimate
/// and the reconciliation branch that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    /// Canonical registry id, when the source facility id is linked.
    pub registry_id: Option<String>,
    pub unit: CombustionUnit,
    pub branch: ReconBranch,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Machine-readable accounting of every branch the run took.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub facilities_nei_only: usize,
    pub facilities_ghgrp_only: usize,
    pub facilities_dual: usize,
    pub ghgrp_records_in: usize,
    pub ghgrp_records_out_of_year: usize,
    pub ghgrp_units: usize,
    pub nei_units: usize,
    pub rows_out: usize,
    pub ocs_retained: usize,
    pub ocs_scaled: usize,
    pub ocs_lumps_kept: usize,
    pub identity_duplicates_dropped: usize,
    pub ef_stats: EfStats,
}
