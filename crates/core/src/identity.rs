use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One row of the facility registry: a canonical registry id and the ids the
/// two inventories use for the same facility. Secondary ids arrive
/// comma-joined when a registry facility maps to several reporting ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityIdentity {
    pub registry_id: String,
    pub nei_id: Option<String>,
    pub ghgrp_id: Option<String>,
}

/// Exploded, deduplicated identity linkage, built once per run and read-only
/// during reconciliation.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    /// registry id -> NEI facility ids (exploded 1:many)
    pub nei_by_registry: BTreeMap<String, Vec<String>>,
    /// registry id -> GHGRP facility ids (exploded 1:many)
    pub ghgrp_by_registry: BTreeMap<String, Vec<String>>,
    /// NEI facility id -> registry id (first occurrence wins)
    pub registry_by_nei: BTreeMap<String, String>,
    /// GHGRP facility id -> registry id (first occurrence wins)
    pub registry_by_ghgrp: BTreeMap<String, String>,
    /// Duplicate (registry, secondary) pairs dropped during the build.
    pub duplicates_dropped: usize,
}

impl IdentityTable {
    /// Explode comma-joined secondary ids 1:many and index both directions.
    /// Duplicate pairs keep their first occurrence; the drop count is
    /// surfaced so the choice is visible in the run summary.
    pub fn build(rows: &[FacilityIdentity]) -> IdentityTable {
        let mut table = IdentityTable::default();
        let mut seen: BTreeSet<(String, String, bool)> = BTreeSet::new();

        for row in rows {
            for nei_id in explode(row.nei_id.as_deref()) {
                if !seen.insert((row.registry_id.clone(), nei_id.clone(), false)) {
                    table.duplicates_dropped += 1;
                    continue;
                }
                table
                    .nei_by_registry
                    .entry(row.registry_id.clone())
                    .or_default()
                    .push(nei_id.clone());
                table
                    .registry_by_nei
                    .entry(nei_id)
                    .or_insert_with(|| row.registry_id.clone());
            }
            for ghgrp_id in explode(row.ghgrp_id.as_deref()) {
                if !seen.insert((row.registry_id.clone(), ghgrp_id.clone(), true)) {
                    table.duplicates_dropped += 1;
                    continue;
                }
                table
                    .ghgrp_by_registry
                    .entry(row.registry_id.clone())
                    .or_default()
                    .push(ghgrp_id.clone());
                table
                    .registry_by_ghgrp
                    .entry(ghgrp_id)
                    .or_insert_with(|| row.registry_id.clone());
            }
        }

        table
    }

    /// Registry id for an NEI facility id, when linked.
    pub fn registry_for_nei(&self, nei_id: &str) -> Option<&str> {
        self.registry_by_nei.get(nei_id).map(String::as_str)
    }

    /// Registry id for a GHGRP facility id, when linked.
    pub fn registry_for_ghgrp(&self, ghgrp_id: &str) -> Option<&str> {
        self.registry_by_ghgrp.get(ghgrp_id).map(String::as_str)
    }
}

/// Split an optionally comma-joined id field into its trimmed parts.
fn explode(raw: Option<&str>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(registry: &str, nei: Option<&str>, ghgrp: Option<&str>) -> FacilityIdentity {
        FacilityIdentity {
            registry_id: registry.into(),
            nei_id: nei.map(String::from),
            ghgrp_id: ghgrp.map(String::from),
        }
    }

    #[test]
    fn explodes_comma_joined_ids() {
        let table = IdentityTable::build(&[row("R1", Some("123, 456"), None)]);
        assert_eq!(
            table.nei_by_registry["R1"],
            vec!["123".to_string(), "456".to_string()]
        );
        assert_eq!(table.registry_for_nei("123"), Some("R1"));
        assert_eq!(table.registry_for_nei("456"), Some("R1"));
    }

    #[test]
    fn duplicate_pairs_keep_first() {
        let table = IdentityTable::build(&[
            row("R1", Some("123"), None),
            row("R1", Some("123"), None),
        ]);
        assert_eq!(table.nei_by_registry["R1"].len(), 1);
        assert_eq!(table.duplicates_dropped, 1);
    }

    #[test]
    fn ambiguous_secondary_keeps_first_registry() {
        let table = IdentityTable::build(&[
            row("R1", None, Some("900")),
            row("R2", None, Some("900")),
        ]);
        assert_eq!(table.registry_for_ghgrp("900"), Some("R1"));
    }

    #[test]
    fn blank_fields_produce_no_links() {
        let table = IdentityTable::build(&[row("R1", Some(" , "), None)]);
        assert!(table.nei_by_registry.is_empty());
    }
}
