use std::collections::BTreeSet;

use cinder_core::IdentityTable;

/// Which inventories a registry facility appears in with usable estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityClass {
    NeiOnly,
    GhgrpOnly,
    Dual,
}

/// Partition of the linked facility universe, computed once per run from the
/// identity table and the two estimate sets' facility ids.
#[derive(Debug, Default)]
pub struct Partition {
    pub nei_only: BTreeSet<String>,
    pub ghgrp_only: BTreeSet<String>,
    pub dual: BTreeSet<String>,
}

impl Partition {
    /// `nei_facilities` / `ghgrp_facilities` are the source-side facility
    /// ids that actually produced estimates; linkage goes through the
    /// registry, and unlinked ids never reach the dual set.
    pub fn build(
        identity: &IdentityTable,
        nei_facilities: impl IntoIterator<Item = String>,
        ghgrp_facilities: impl IntoIterator<Item = String>,
    ) -> Partition {
        let nei_registries: BTreeSet<String> = nei_facilities
            .into_iter()
            .filter_map(|id| identity.registry_for_nei(&id).map(String::from))
            .collect();
        let ghgrp_registries: BTreeSet<String> = ghgrp_facilities
            .into_iter()
            .filter_map(|id| identity.registry_for_ghgrp(&id).map(String::from))
            .collect();

        let mut partition = Partition::default();
        for registry in nei_registries.union(&ghgrp_registries) {
            let class = match (
                nei_registries.contains(registry),
                ghgrp_registries.contains(registry),
            ) {
                (true, true) => FacilityClass::Dual,
                (true, false) => FacilityClass::NeiOnly,
                (false, true) => FacilityClass::GhgrpOnly,
                (false, false) => unreachable!("registry came from one of the two sets"),
            };
            match class {
                FacilityClass::NeiOnly => partition.nei_only.insert(registry.clone()),
                FacilityClass::GhgrpOnly => partition.ghgrp_only.insert(registry.clone()),
                FacilityClass::Dual => partition.dual.insert(registry.clone()),
            };
        }
        partition
    }

    pub fn classify(&self, registry_id: &str) -> Option<FacilityClass> {
        if self.dual.contains(registry_id) {
            Some(FacilityClass::Dual)
        } else if self.nei_only.contains(registry_id) {
            Some(FacilityClass::NeiOnly)
        } else if self.ghgrp_only.contains(registry_id) {
            Some(FacilityClass::GhgrpOnly)
        } else {
            None
        }
    }
}
