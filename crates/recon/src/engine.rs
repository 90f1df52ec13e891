use std::collections::{BTreeMap, BTreeSet};

use cinder_core::{
    CombustionUnit, EnergyEstimate, EstimateSource, FacilityIdentity, Fuel, IdentityTable,
    QuantileTriple, UnitKey, UnitKind,
};
use cinder_efactor::{estimate_units, EfUnitEstimate, EstimatorConfig, SecondaryFactor, SecondaryTable};
use cinder_harmonize::{
    classify_unit_type, select_unit_type, unit_type_from_scc, Candidates, HarmonizerConfig,
};
use cinder_tiered::{aggregate_units, estimate_energy, GhgrpRecord, UnitEnergy};

use crate::allocate::{allocate_ocs, Allocation};
use crate::config::{DualPolicy, RunConfig};
use crate::error::ReconError;
use crate::model::{InventoryRow, ReconBranch, RunSummary};
use crate::partition::{FacilityClass, Partition};

/// Pre-loaded collaborator inputs, all immutable for the duration of a run.
pub struct EngineInput {
    pub ghgrp: Vec<GhgrpRecord>,
    pub nei: Vec<cinder_efactor::NeiRecord>,
    pub secondary_factors: Vec<SecondaryFactor>,
    pub identities: Vec<FacilityIdentity>,
}

#[derive(Debug)]
pub struct RunOutput {
    pub inventory: Vec<InventoryRow>,
    pub summary: RunSummary,
}

/// Run the full compilation: estimate both sides, link identities, partition
/// facilities, reconcile dual reporters, and emit the sorted inventory.
pub fn run(config: &RunConfig, input: &EngineInput) -> Result<RunOutput, ReconError> {
    config.validate()?;
    let harmonizer = HarmonizerConfig::new();
    let mut summary = RunSummary::default();

    // Identity linkage, built once, read-only afterwards.
    let identity = IdentityTable::build(&input.identities);
    summary.identity_duplicates_dropped = identity.duplicates_dropped;

    // Tier-methodology side, restricted to the compilation year.
    summary.ghgrp_records_in = input.ghgrp.len();
    let in_year: Vec<GhgrpRecord> = input
        .ghgrp
        .iter()
        .filter(|r| r.reporting_year == config.reporting_year)
        .cloned()
        .collect();
    summary.ghgrp_records_out_of_year = input.ghgrp.len() - in_year.len();
    let tier_rows = estimate_energy(&harmonizer, &in_year);
    let ghgrp_units = aggregate_units(&tier_rows);
    summary.ghgrp_units = ghgrp_units.len();

    // Emission-factor side.
    let estimator_config = EstimatorConfig {
        max_unit_energy_mj: config.limits.max_unit_energy_mj,
    };
    let secondary = SecondaryTable::build(&input.secondary_factors);
    let (nei_units, ef_stats) = estimate_units(&estimator_config, &harmonizer, &input.nei, &secondary);
    summary.nei_units = nei_units.len();
    summary.ef_stats = ef_stats;

    // Facility partition over the linked universe.
    let partition = Partition::build(
        &identity,
        nei_units.iter().map(|u| u.facility_id.clone()),
        ghgrp_units.iter().map(|u| u.facility_id.clone()),
    );
    summary.facilities_nei_only = partition.nei_only.len();
    summary.facilities_ghgrp_only = partition.ghgrp_only.len();
    summary.facilities_dual = partition.dual.len();

    // Route estimates: dual facility-fuels get reconciled, everything else
    // passes through with its source-side branch.
    let mut nei_dual: BTreeMap<(String, Fuel), Vec<&EfUnitEstimate>> = BTreeMap::new();
    let mut nei_passthrough: Vec<(&EfUnitEstimate, Option<String>)> = Vec::new();
    for unit in &nei_units {
        let registry = identity.registry_for_nei(&unit.facility_id).map(String::from);
        match registry.as_deref().and_then(|r| partition.classify(r)) {
            Some(FacilityClass::Dual) => {
                let registry = registry.expect("dual implies linked");
                nei_dual.entry((registry, unit.fuel)).or_default().push(unit);
            }
            _ => nei_passthrough.push((unit, registry)),
        }
    }

    let mut ghgrp_dual: BTreeMap<(String, Fuel), Vec<&UnitEnergy>> = BTreeMap::new();
    let mut ghgrp_passthrough: Vec<(&UnitEnergy, Option<String>)> = Vec::new();
    for unit in &ghgrp_units {
        let registry = identity
            .registry_for_ghgrp(&unit.facility_id)
            .map(String::from);
        match registry.as_deref().and_then(|r| partition.classify(r)) {
            Some(FacilityClass::Dual) => {
                let registry = registry.expect("dual implies linked");
                ghgrp_dual.entry((registry, unit.fuel)).or_default().push(unit);
            }
            _ => ghgrp_passthrough.push((unit, registry)),
        }
    }

    let mut rows: Vec<InventoryRow> = Vec::new();
    for (unit, registry) in nei_passthrough {
        rows.push(nei_row(&harmonizer, unit, registry, ReconBranch::NeiOnly, None));
    }
    for (unit, registry) in ghgrp_passthrough {
        rows.push(ghgrp_row(&harmonizer, unit, registry, ReconBranch::GhgrpOnly));
    }

    // Dual facility-fuels.
    let mut consumed_nei: BTreeSet<(String, Fuel)> = BTreeSet::new();
    for ((registry, fuel), units) in &ghgrp_dual {
        let key = (registry.clone(), *fuel);
        let sub_units = nei_dual.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let (ocs_units, named_units): (Vec<&&UnitEnergy>, Vec<&&UnitEnergy>) =
            units.iter().partition(|u| is_ocs(&u.unit_name));

        if ocs_units.is_empty() {
            reconcile_plain_dual(
                &harmonizer,
                config.dual_policy,
                registry,
                units,
                sub_units,
                &mut rows,
            );
        } else {
            reconcile_ocs(
                &harmonizer,
                config,
                registry,
                &ocs_units,
                &named_units,
                sub_units,
                &mut rows,
                &mut summary,
            );
        }
        consumed_nei.insert(key);
    }

    // NEI fuels at dual facilities with no tier-side counterpart keep their
    // independent estimate.
    for ((registry, fuel), units) in &nei_dual {
        if consumed_nei.contains(&(registry.clone(), *fuel)) {
            continue;
        }
        for unit in units {
            rows.push(nei_row(
                &harmonizer,
                unit,
                Some(registry.clone()),
                ReconBranch::NeiOnly,
                None,
            ));
        }
    }

    // Deterministic output order.
    rows.sort_by(|a, b| (&a.registry_id, &a.unit.key).cmp(&(&b.registry_id, &b.unit.key)));
    summary.rows_out = rows.len();

    log::info!(
        "reconciler: {} rows ({} dual facilities, {} OCS scaled, {} OCS retained)",
        summary.rows_out,
        summary.facilities_dual,
        summary.ocs_scaled,
        summary.ocs_retained
    );

    Ok(RunOutput {
        inventory: rows,
        summary,
    })
}

/// Aggregate catch-all units the tier-methodology source reports when a
/// facility's equipment is not itemized.
fn is_ocs(unit_name: &str) -> bool {
    let upper = unit_name.to_ascii_uppercase();
    upper.contains("OCS") || upper.contains("OTHER COMBUSTION")
}

/// Dual facility-fuel without an OCS lump: both sides estimated the same
/// physical units at different granularity; the configured policy picks the
/// resolved side.
fn reconcile_plain_dual(
    harmonizer: &HarmonizerConfig,
    policy: DualPolicy,
    registry: &str,
    ghgrp_units: &[&UnitEnergy],
    nei_units: &[&EfUnitEstimate],
    rows: &mut Vec<InventoryRow>,
) {
    match policy {
        DualPolicy::PreferTierMethod => {
            for unit in ghgrp_units {
                rows.push(ghgrp_row(
                    harmonizer,
                    unit,
                    Some(registry.to_string()),
                    ReconBranch::DualTierPreferred,
                ));
            }
        }
        DualPolicy::PreferEmissionFactor => {
            if nei_units.is_empty() {
                for unit in ghgrp_units {
                    rows.push(ghgrp_row(
                        harmonizer,
                        unit,
                        Some(registry.to_string()),
                        ReconBranch::DualTierPreferred,
                    ));
                }
            } else {
                for unit in nei_units {
                    rows.push(nei_row(
                        harmonizer,
                        unit,
                        Some(registry.to_string()),
                        ReconBranch::DualEfPreferred,
                        None,
                    ));
                }
            }
        }
    }
}

/// OCS case: disaggregate the lump onto the pollutant inventory's named
/// sub-units. Allocation is advisory below the configured share cutoff
/// (clean fits are taken, forced scaling is not) and mandatory at or above
/// it.
#[allow(clippy::too_many_arguments)]
fn reconcile_ocs(
    harmonizer: &HarmonizerConfig,
    config: &RunConfig,
    registry: &str,
    ocs_units: &[&&UnitEnergy],
    named_units: &[&&UnitEnergy],
    nei_units: &[&EfUnitEstimate],
    rows: &mut Vec<InventoryRow>,
    summary: &mut RunSummary,
) {
    // Named tier units are distinct physical equipment; they pass through.
    for unit in named_units {
        rows.push(ghgrp_row(
            harmonizer,
            unit,
            Some(registry.to_string()),
            ReconBranch::DualTierPreferred,
        ));
    }

    let ocs_total: f64 = ocs_units.iter().map(|u| u.energy_mj).sum();
    let named_total: f64 = named_units.iter().map(|u| u.energy_mj).sum();
    let facility_total = ocs_total + named_total;
    let ocs_share = if facility_total > 0.0 {
        ocs_total / facility_total
    } else {
        0.0
    };
    let mandatory = ocs_share >= config.limits.ocs_mandatory_share
        || config.dual_policy == DualPolicy::PreferEmissionFactor;

    // Sub-units with no energy evidence (throughput-only) cannot take an
    // allocation; they pass through with their own estimate.
    for unit in nei_units.iter().filter(|u| u.energy_mj.is_none()) {
        rows.push(nei_row(
            harmonizer,
            unit,
            Some(registry.to_string()),
            ReconBranch::NeiOnly,
            None,
        ));
    }

    let allocatable: Vec<&EfUnitEstimate> = nei_units
        .iter()
        .copied()
        .filter(|u| u.energy_mj.is_some())
        .collect();
    let triples: Vec<QuantileTriple> = allocatable
        .iter()
        .map(|u| u.energy_mj.expect("filtered above"))
        .collect();

    match allocate_ocs(ocs_total, &triples) {
        Allocation::Retained(kept) => {
            summary.ocs_retained += 1;
            for (unit, triple) in allocatable.iter().zip(kept) {
                rows.push(nei_row(
                    harmonizer,
                    unit,
                    Some(registry.to_string()),
                    ReconBranch::OcsNeiRetained,
                    Some(triple),
                ));
            }
        }
        Allocation::Scaled(scaled) if mandatory => {
            summary.ocs_scaled += 1;
            for (unit, triple) in allocatable.iter().zip(scaled) {
                let mut row = nei_row(
                    harmonizer,
                    unit,
                    Some(registry.to_string()),
                    ReconBranch::OcsScaled,
                    Some(triple),
                );
                row.unit.estimate.source = EstimateSource::Allocated;
                row.unit.estimate.provenance =
                    format!("{}+ocs_share", row.unit.estimate.provenance);
                rows.push(row);
            }
        }
        Allocation::Scaled(_) | Allocation::NoSubUnits => {
            summary.ocs_lumps_kept += 1;
            for unit in ocs_units {
                rows.push(ghgrp_row(
                    harmonizer,
                    unit,
                    Some(registry.to_string()),
                    ReconBranch::OcsLumpKept,
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Row constructors
// ---------------------------------------------------------------------------

fn nei_row(
    harmonizer: &HarmonizerConfig,
    unit: &EfUnitEstimate,
    registry_id: Option<String>,
    branch: ReconBranch,
    energy_override: Option<QuantileTriple>,
) -> InventoryRow {
    let unit_type = select_unit_type(&Candidates {
        source: classify_unit_type(harmonizer, &unit.unit_type_raw),
        scc: unit_type_from_scc(&unit.scc),
        description: classify_unit_type(harmonizer, &unit.unit_description),
    });
    InventoryRow {
        registry_id,
        unit: CombustionUnit {
            key: UnitKey::new(unit.facility_id.clone(), unit.unit_id.clone(), unit.fuel),
            unit_type_raw: unit.unit_type_raw.clone(),
            unit_type,
            fuel_type_raw: unit.fuel_type_raw.clone(),
            design_capacity: unit.design_capacity,
            design_capacity_uom: unit.design_capacity_uom,
            estimate: EnergyEstimate {
                energy_mj: energy_override.or(unit.energy_mj),
                throughput_tonnes: unit.throughput_tonnes,
                ghg_tonnes_co2e: unit.ghg_tonnes_co2e,
                source: unit.source,
                provenance: unit.provenance.clone(),
            },
        },
        branch,
    }
}

fn ghgrp_row(
    harmonizer: &HarmonizerConfig,
    unit: &UnitEnergy,
    registry_id: Option<String>,
    branch: ReconBranch,
) -> InventoryRow {
    let unit_type = if is_ocs(&unit.unit_name) {
        UnitKind::OtherCombustion
    } else {
        classify_unit_type(harmonizer, &unit.unit_name)
    };
    InventoryRow {
        registry_id,
        unit: CombustionUnit {
            key: UnitKey::new(unit.facility_id.clone(), unit.unit_name.clone(), unit.fuel),
            unit_type_raw: unit.unit_name.clone(),
            unit_type,
            fuel_type_raw: unit.fuel_raw.clone(),
            design_capacity: None,
            design_capacity_uom: None,
            estimate: EnergyEstimate {
                energy_mj: Some(QuantileTriple::scalar(unit.energy_mj)),
                throughput_tonnes: None,
                ghg_tonnes_co2e: unit.ghg_tonnes_co2e.map(QuantileTriple::scalar),
                source: EstimateSource::TierMethod,
                provenance: unit.provenance.clone(),
            },
        },
        branch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::Uom;
    use cinder_efactor::NeiRecord;

    fn config() -> RunConfig {
        RunConfig::from_toml(
            r#"
name = "test compile"
reporting_year = 2021

[inputs]
ghgrp = "ghgrp.csv"
nei = "nei.csv"
secondary_factors = "factors.csv"
registry = "registry.csv"
"#,
        )
        .unwrap()
    }

    fn identity(registry: &str, nei: &str, ghgrp: &str) -> FacilityIdentity {
        FacilityIdentity {
            registry_id: registry.into(),
            nei_id: Some(nei.into()),
            ghgrp_id: Some(ghgrp.into()),
        }
    }

    fn ghgrp_record(facility: &str, unit: &str, co2_tonnes: f64) -> GhgrpRecord {
        GhgrpRecord {
            facility_id: facility.into(),
            reporting_year: 2021,
            unit_name: unit.into(),
            tier1_co2_tonnes: Some(co2_tonnes),
            tier2_co2_tonnes: None,
            tier3_co2_tonnes: None,
            tier4_ch4_tonnes: None,
            fuel_type: Some("natural gas".into()),
            fuel_type_other: None,
            fuel_blend: None,
            annual_heat_input_mmbtu: None,
            fuel_quantity: None,
            fuel_quantity_uom: None,
            measured_hhv_mmbtu: None,
        }
    }

    /// A CO record sized so the back-calculated energy is
    /// `mmcf * 1026 MMBtu * MJ_PER_MMBTU`.
    fn nei_record(facility: &str, unit: &str, mmcf: f64) -> NeiRecord {
        NeiRecord {
            facility_id: facility.into(),
            unit_id: unit.into(),
            process_id: "p1".into(),
            scc: "10200602".into(),
            pollutant_code: "CO".into(),
            total_emissions: Some(84.0 * mmcf),
            emissions_uom: Some(Uom::Lb),
            emission_factor: Some(84.0),
            ef_numerator_uom: Some(Uom::Lb),
            ef_denominator_uom: Some(Uom::MMcf),
            calc_method: None,
            unit_type_raw: "boiler".into(),
            unit_description: "natural gas boiler".into(),
            process_description: String::new(),
            fuel_hint: Some("natural gas".into()),
            design_capacity: None,
            design_capacity_uom: None,
        }
    }

    fn mj(mmcf: f64) -> f64 {
        mmcf * 1026.0 * cinder_core::MJ_PER_MMBTU
    }

    #[test]
    fn partitions_and_branches() {
        let input = EngineInput {
            ghgrp: vec![ghgrp_record("g1", "Boiler 1", 100.0), ghgrp_record("g2", "Boiler A", 50.0)],
            nei: vec![nei_record("n1", "u1", 1.0), nei_record("n3", "u9", 2.0)],
            secondary_factors: vec![],
            identities: vec![
                identity("R1", "n1", "g1"),
                FacilityIdentity {
                    registry_id: "R2".into(),
                    nei_id: None,
                    ghgrp_id: Some("g2".into()),
                },
                FacilityIdentity {
                    registry_id: "R3".into(),
                    nei_id: Some("n3".into()),
                    ghgrp_id: None,
                },
            ],
        };
        let output = run(&config(), &input).unwrap();

        assert_eq!(output.summary.facilities_dual, 1);
        assert_eq!(output.summary.facilities_ghgrp_only, 1);
        assert_eq!(output.summary.facilities_nei_only, 1);

        // Dual facility defaults to the tier estimate.
        let dual_row = output
            .inventory
            .iter()
            .find(|r| r.registry_id.as_deref() == Some("R1"))
            .unwrap();
        assert_eq!(dual_row.branch, ReconBranch::DualTierPreferred);
        assert_eq!(dual_row.unit.estimate.source, EstimateSource::TierMethod);

        let nei_only = output
            .inventory
            .iter()
            .find(|r| r.registry_id.as_deref() == Some("R3"))
            .unwrap();
        assert_eq!(nei_only.branch, ReconBranch::NeiOnly);
    }

    #[test]
    fn dual_policy_can_prefer_emission_factor() {
        let input = EngineInput {
            ghgrp: vec![ghgrp_record("g1", "Boiler 1", 100.0)],
            nei: vec![nei_record("n1", "u1", 1.0)],
            secondary_factors: vec![],
            identities: vec![identity("R1", "n1", "g1")],
        };
        let mut config = config();
        config.dual_policy = DualPolicy::PreferEmissionFactor;
        let output = run(&config, &input).unwrap();

        let row = &output.inventory[0];
        assert_eq!(row.branch, ReconBranch::DualEfPreferred);
        assert_eq!(row.unit.estimate.source, EstimateSource::EmissionFactor);
    }

    /// An OCS lump reported through the tier-4 heat-input path so the lump
    /// energy is pinned exactly.
    fn ocs_record(facility: &str, name: &str, energy_mmbtu: f64, fuel: &str) -> GhgrpRecord {
        let mut rec = ghgrp_record(facility, name, 0.0);
        rec.tier1_co2_tonnes = None;
        rec.tier4_ch4_tonnes = Some(0.0);
        rec.annual_heat_input_mmbtu = Some(energy_mmbtu);
        rec.fuel_type = Some(fuel.into());
        rec
    }

    #[test]
    fn ocs_sub_units_retained_when_they_fit() {
        // OCS lump worth ~107 MMcf of gas; NEI sub-units imply 30 and 70,
        // which fit inside the lump and are kept unchanged.
        let ocs = ocs_record("g1", "OCS - process units", 110_000.0, "natural gas");

        let input = EngineInput {
            ghgrp: vec![ocs],
            nei: vec![nei_record("n1", "sub_a", 30.0), nei_record("n1", "sub_b", 70.0)],
            secondary_factors: vec![],
            identities: vec![identity("R1", "n1", "g1")],
        };
        let output = run(&config(), &input).unwrap();

        assert_eq!(output.summary.ocs_retained, 1);
        let sub_a = output.inventory.iter().find(|r| r.unit.key.unit_id == "sub_a").unwrap();
        assert_eq!(sub_a.branch, ReconBranch::OcsNeiRetained);
        assert!((sub_a.unit.estimate.energy_mj.unwrap().q2 - mj(30.0)).abs() < 1.0);
    }

    #[test]
    fn ocs_sub_units_scaled_when_oversized() {
        // Lump worth 10 MMcf; sub-units claim 30 and 70, so they scale to
        // 3 and 7 by proportional share.
        let ocs = ocs_record("g1", "Other combustion source", 10_260.0, "natural gas");

        let input = EngineInput {
            ghgrp: vec![ocs],
            nei: vec![nei_record("n1", "sub_a", 30.0), nei_record("n1", "sub_b", 70.0)],
            secondary_factors: vec![],
            identities: vec![identity("R1", "n1", "g1")],
        };
        let output = run(&config(), &input).unwrap();

        assert_eq!(output.summary.ocs_scaled, 1);
        let sub_a = output.inventory.iter().find(|r| r.unit.key.unit_id == "sub_a").unwrap();
        let sub_b = output.inventory.iter().find(|r| r.unit.key.unit_id == "sub_b").unwrap();
        assert_eq!(sub_a.branch, ReconBranch::OcsScaled);
        assert_eq!(sub_a.unit.estimate.source, EstimateSource::Allocated);
        assert!((sub_a.unit.estimate.energy_mj.unwrap().q2 - mj(3.0)).abs() < 1.0);
        assert!((sub_b.unit.estimate.energy_mj.unwrap().q2 - mj(7.0)).abs() < 1.0);
    }

    #[test]
    fn ocs_lump_kept_without_sub_units() {
        // The lump burns coal; the facility's only NEI unit burns gas, so
        // there is nothing to allocate the coal lump onto.
        let ocs = ocs_record("g1", "OCS units", 1000.0, "bituminous coal");

        let input = EngineInput {
            ghgrp: vec![ocs],
            nei: vec![nei_record("n1", "u1", 1.0)],
            secondary_factors: vec![],
            identities: vec![identity("R1", "n1", "g1")],
        };
        let output = run(&config(), &input).unwrap();

        assert_eq!(output.summary.ocs_lumps_kept, 1);
        let lump = output.inventory.iter().find(|r| r.unit.key.unit_id == "OCS units").unwrap();
        assert_eq!(lump.branch, ReconBranch::OcsLumpKept);
        assert_eq!(lump.unit.unit_type, UnitKind::OtherCombustion);
        // The gas unit keeps its independent estimate.
        let gas = output.inventory.iter().find(|r| r.unit.key.unit_id == "u1").unwrap();
        assert_eq!(gas.branch, ReconBranch::NeiOnly);
    }

    #[test]
    fn rerun_is_byte_identical() {
        let input = EngineInput {
            ghgrp: vec![ghgrp_record("g1", "Boiler 1", 100.0)],
            nei: vec![nei_record("n1", "u1", 1.0), nei_record("n2", "u2", 2.0)],
            secondary_factors: vec![],
            identities: vec![identity("R1", "n1", "g1")],
        };
        let first = run(&config(), &input).unwrap();
        let second = run(&config(), &input).unwrap();
        assert_eq!(first.inventory, second.inventory);
        let a = serde_json::to_string(&first.inventory).unwrap();
        let b = serde_json::to_string(&second.inventory).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn all_rows_satisfy_quantile_invariant() {
        let input = EngineInput {
            ghgrp: vec![ghgrp_record("g1", "Boiler 1", 100.0)],
            nei: vec![nei_record("n1", "u1", 1.0), nei_record("n3", "u9", 2.0)],
            secondary_factors: vec![],
            identities: vec![identity("R1", "n1", "g1")],
        };
        let output = run(&config(), &input).unwrap();
        for row in &output.inventory {
            let estimate = &row.unit.estimate;
            for triple in [
                estimate.energy_mj,
                estimate.throughput_tonnes,
                estimate.ghg_tonnes_co2e,
            ]
            .into_iter()
            .flatten()
            {
                assert!(
                    triple.is_ordered(),
                    "row {} violates q0<=q2<=q3",
                    row.unit.key.unit_id
                );
            }
        }
    }
}
