use std::collections::BTreeMap;

use serde::Serialize;

use cinder_core::{Fuel, Pollutant};
use cinder_harmonize::{classify_fuel, HarmonizerConfig};

use crate::fixes::apply_fixes;
use crate::record::{GhgrpRecord, Tier, TierEnergy};

const KG_PER_TONNE: f64 = 1000.0;

/// Convert the inventory's per-tier emission records into energy rows.
///
/// Records resolve their fuel through the three fallback columns, get the
/// documented data-quality fixes applied, then dispatch on which tier field
/// is populated. Records whose tier cannot produce a positive energy value
/// contribute nothing.
pub fn estimate_energy(config: &HarmonizerConfig, records: &[GhgrpRecord]) -> Vec<TierEnergy> {
    let resolved: Vec<(GhgrpRecord, Fuel)> = records
        .iter()
        .map(|r| {
            let fuel = resolve_fuel(config, r);
            (apply_fixes(r, fuel), fuel)
        })
        .collect();

    let ladder = EfLadder::build(&resolved);

    let mut out = Vec::new();
    for (record, fuel) in &resolved {
        let Some(tier) = record.tier() else {
            continue;
        };
        let computed = match tier {
            Tier::Tier1 => tier1(record, *fuel),
            Tier::Tier2 => tier2(record, *fuel, &ladder),
            Tier::Tier3 => tier3(record, *fuel),
            Tier::Tier4 => tier4(record, *fuel),
        };
        let Some((energy_mmbtu, provenance)) = computed else {
            log::debug!(
                "no energy for facility {} unit {} ({tier}, fuel {fuel})",
                record.facility_id,
                record.unit_name
            );
            continue;
        };
        if energy_mmbtu <= 0.0 {
            continue;
        }
        out.push(TierEnergy {
            facility_id: record.facility_id.clone(),
            unit_name: record.unit_name.clone(),
            fuel: *fuel,
            fuel_raw: raw_fuel_text(record),
            reporting_year: record.reporting_year,
            tier,
            energy_mmbtu,
            ghg_tonnes_co2e: ghg_co2e(record),
            provenance,
        });
    }

    log::info!("tier calculator: {} records -> {} energy rows", records.len(), out.len());
    out
}

/// Fuel resolution order: primary fuel type, "other" fuel type, fuel blend.
fn resolve_fuel(config: &HarmonizerConfig, record: &GhgrpRecord) -> Fuel {
    [
        record.fuel_type.as_deref(),
        record.fuel_type_other.as_deref(),
        record.fuel_blend.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(|text| classify_fuel(config, text))
    .unwrap_or(Fuel::Other)
}

/// First populated fuel column, verbatim.
fn raw_fuel_text(record: &GhgrpRecord) -> String {
    [
        record.fuel_type.as_deref(),
        record.fuel_type_other.as_deref(),
        record.fuel_blend.as_deref(),
    ]
    .into_iter()
    .flatten()
    .next()
    .unwrap_or("")
    .to_string()
}

// ---------------------------------------------------------------------------
// Tier methodologies
// ---------------------------------------------------------------------------

fn tier1(record: &GhgrpRecord, fuel: Fuel) -> Option<(f64, String)> {
    let co2_tonnes = record.tier1_co2_tonnes?;
    let ef = fuel.co2_kg_per_mmbtu()?;
    Some((tier1_energy(co2_tonnes, ef), "tier1/standard_ef".into()))
}

/// `energy = CO2 x 1000 / standard_EF`, tonnes CO2 against kg CO2 per MMBtu.
fn tier1_energy(co2_tonnes: f64, ef_kg_per_mmbtu: f64) -> f64 {
    co2_tonnes * KG_PER_TONNE / ef_kg_per_mmbtu
}

fn tier2(record: &GhgrpRecord, fuel: Fuel, ladder: &EfLadder) -> Option<(f64, String)> {
    // Preferred: the facility's own heat-content measurement.
    if let Some(energy) = measured_energy(record) {
        return Some((energy, "tier2/measured_hhv".into()));
    }

    let co2_tonnes = record.tier2_co2_tonnes?;
    let co2_kg = co2_tonnes * KG_PER_TONNE;

    // A facility's own emission intensity for a fuel predicts better than a
    // national constant, so the fleet EF is tried before wider fallbacks.
    if let Some(ef) = ladder.fleet_ef(&record.facility_id, fuel, record.reporting_year) {
        return Some((co2_kg / ef, "tier2/fleet_ef".into()));
    }
    if let Some(ef) = ladder.national_ef(fuel, record.reporting_year) {
        return Some((co2_kg / ef, "tier2/national_ef".into()));
    }
    let ef = fuel.co2_kg_per_mmbtu()?;
    Some((co2_kg / ef, "tier2/standard_ef".into()))
}

fn tier3(record: &GhgrpRecord, fuel: Fuel) -> Option<(f64, String)> {
    // Blast-furnace/process gas reports volume and heat value in separate
    // fields; the direct product is the energy. The same product covers the
    // ordinary measured path.
    if let Some(energy) = measured_energy(record) {
        return Some((energy, "tier3/measured_hhv".into()));
    }
    let quantity = record.fuel_quantity?;
    let uom = record.fuel_quantity_uom?;
    let hhv = fuel.mmbtu_per(uom)?;
    Some((quantity * hhv, "tier3/national_hhv".into()))
}

fn tier4(record: &GhgrpRecord, fuel: Fuel) -> Option<(f64, String)> {
    if let Some(heat_input) = record.annual_heat_input_mmbtu {
        return Some((heat_input, "tier4/heat_input".into()));
    }
    let ch4_tonnes = record.tier4_ch4_tonnes?;
    let ef = fuel.ch4_kg_per_mmbtu()?;
    Some((ch4_tonnes * KG_PER_TONNE / ef, "tier4/ch4_backcalc".into()))
}

/// Reported fuel quantity times facility-measured heat content, when both
/// fields are present.
fn measured_energy(record: &GhgrpRecord) -> Option<f64> {
    let quantity = record.fuel_quantity?;
    let hhv = record.measured_hhv_mmbtu?;
    (quantity > 0.0 && hhv > 0.0).then(|| quantity * hhv)
}

fn ghg_co2e(record: &GhgrpRecord) -> Option<f64> {
    let co2 = record
        .tier1_co2_tonnes
        .or(record.tier2_co2_tonnes)
        .or(record.tier3_co2_tonnes);
    if let Some(co2) = co2 {
        return Some(co2);
    }
    record
        .tier4_ch4_tonnes
        .and_then(|ch4| Pollutant::Ch4.gwp().map(|gwp| ch4 * gwp))
}

// ---------------------------------------------------------------------------
// Custom emission-factor ladder
// ---------------------------------------------------------------------------

/// Tier-2 fallback factors, aggregated from the records that do carry
/// heat-content measurements. Fleet level: one facility's own intensity for
/// a fuel-year. National level: the cross-facility mean for the fuel-year.
struct EfLadder {
    fleet: BTreeMap<(String, Fuel, i32), f64>,
    national: BTreeMap<(Fuel, i32), f64>,
}

impl EfLadder {
    fn build(resolved: &[(GhgrpRecord, Fuel)]) -> EfLadder {
        let mut fleet_sums: BTreeMap<(String, Fuel, i32), (f64, f64)> = BTreeMap::new();
        let mut national_sums: BTreeMap<(Fuel, i32), (f64, f64)> = BTreeMap::new();

        for (record, fuel) in resolved {
            let Some(co2_tonnes) = record.tier2_co2_tonnes else {
                continue;
            };
            let Some(energy) = measured_energy(record) else {
                continue;
            };
            let co2_kg = co2_tonnes * KG_PER_TONNE;

            let fleet_key = (record.facility_id.clone(), *fuel, record.reporting_year);
            let entry = fleet_sums.entry(fleet_key).or_insert((0.0, 0.0));
            entry.0 += co2_kg;
            entry.1 += energy;

            let national_key = (*fuel, record.reporting_year);
            let entry = national_sums.entry(national_key).or_insert((0.0, 0.0));
            entry.0 += co2_kg;
            entry.1 += energy;
        }

        let ratio = |(co2, energy): (f64, f64)| (energy > 0.0).then(|| co2 / energy);

        EfLadder {
            fleet: fleet_sums
                .into_iter()
                .filter_map(|(k, sums)| ratio(sums).map(|ef| (k, ef)))
                .collect(),
            national: national_sums
                .into_iter()
                .filter_map(|(k, sums)| ratio(sums).map(|ef| (k, ef)))
                .collect(),
        }
    }

    fn fleet_ef(&self, facility_id: &str, fuel: Fuel, year: i32) -> Option<f64> {
        self.fleet
            .get(&(facility_id.to_string(), fuel, year))
            .copied()
    }

    fn national_ef(&self, fuel: Fuel, year: i32) -> Option<f64> {
        self.national.get(&(fuel, year)).copied()
    }
}

// ---------------------------------------------------------------------------
// Aggregation to unit granularity
// ---------------------------------------------------------------------------

/// One unit-fuel total across however many tier rows described it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitEnergy {
    pub facility_id: String,
    pub unit_name: String,
    pub fuel: Fuel,
    pub fuel_raw: String,
    pub energy_mj: f64,
    pub ghg_tonnes_co2e: Option<f64>,
    pub provenance: String,
}

/// Sum tier rows to (facility, unit, fuel) granularity. Duplicate rows across
/// tiers are legitimate here and simply add.
pub fn aggregate_units(rows: &[TierEnergy]) -> Vec<UnitEnergy> {
    let mut groups: BTreeMap<(String, String, Fuel), (f64, Option<f64>, Vec<String>, String)> =
        BTreeMap::new();

    for row in rows {
        let key = (row.facility_id.clone(), row.unit_name.clone(), row.fuel);
        let entry = groups
            .entry(key)
            .or_insert_with(|| (0.0, None, Vec::new(), row.fuel_raw.clone()));
        entry.0 += row.energy_mj();
        if let Some(ghg) = row.ghg_tonnes_co2e {
            *entry.1.get_or_insert(0.0) += ghg;
        }
        if !entry.2.contains(&row.provenance) {
            entry.2.push(row.provenance.clone());
        }
    }

    groups
        .into_iter()
        .map(
            |((facility_id, unit_name, fuel), (energy_mj, ghg, provenance, fuel_raw))| UnitEnergy {
                facility_id,
                unit_name,
                fuel,
                fuel_raw,
                energy_mj,
                ghg_tonnes_co2e: ghg,
                provenance: provenance.join("+"),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::Uom;

    fn base(facility: &str, unit: &str, fuel: &str) -> GhgrpRecord {
        GhgrpRecord {
            facility_id: facility.into(),
            reporting_year: 2021,
            unit_name: unit.into(),
            tier1_co2_tonnes: None,
            tier2_co2_tonnes: None,
            tier3_co2_tonnes: None,
            tier4_ch4_tonnes: None,
            fuel_type: Some(fuel.into()),
            fuel_type_other: None,
            fuel_blend: None,
            annual_heat_input_mmbtu: None,
            fuel_quantity: None,
            fuel_quantity_uom: None,
            measured_hhv_mmbtu: None,
        }
    }

    #[test]
    fn tier1_formula_round_trip() {
        // 1000 tonnes at 50 kg/MMBtu -> 1000 * 1000 / 50 = 20000 MMBtu
        assert_eq!(tier1_energy(1000.0, 50.0), 20_000.0);
    }

    #[test]
    fn tier1_uses_standard_ef() {
        let mut rec = base("f1", "u1", "natural gas");
        rec.tier1_co2_tonnes = Some(53.06);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tier, Tier::Tier1);
        assert!((rows[0].energy_mmbtu - 1000.0).abs() < 1e-9);
        assert_eq!(rows[0].ghg_tonnes_co2e, Some(53.06));
    }

    #[test]
    fn fuel_fallback_columns_tried_in_order() {
        let mut rec = base("f1", "u1", "unspecified");
        rec.fuel_type = None;
        rec.fuel_type_other = Some("bituminous coal".into());
        rec.tier1_co2_tonnes = Some(93.28);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert_eq!(rows[0].fuel, Fuel::BituminousCoal);
        assert!((rows[0].energy_mmbtu - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn tier2_prefers_measured_hhv() {
        let mut rec = base("f1", "u1", "natural gas");
        rec.tier2_co2_tonnes = Some(100.0);
        rec.fuel_quantity = Some(2000.0);
        rec.fuel_quantity_uom = Some(Uom::Mcf);
        rec.measured_hhv_mmbtu = Some(1.030);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert_eq!(rows[0].provenance, "tier2/measured_hhv");
        assert!((rows[0].energy_mmbtu - 2060.0).abs() < 1e-9);
    }

    #[test]
    fn tier2_fleet_ef_beats_standard() {
        // Unit A carries a measurement with a deliberately non-standard
        // intensity (60 kg/MMBtu) so the fleet rung is observable on unit B.
        let mut measured = base("f1", "uA", "natural gas");
        measured.tier2_co2_tonnes = Some(120.0);
        measured.fuel_quantity = Some(2000.0);
        measured.fuel_quantity_uom = Some(Uom::Mcf);
        measured.measured_hhv_mmbtu = Some(1.0);

        let mut unmeasured = base("f1", "uB", "natural gas");
        unmeasured.tier2_co2_tonnes = Some(60.0);

        let rows = estimate_energy(&HarmonizerConfig::new(), &[measured, unmeasured]);
        let row_b = rows.iter().find(|r| r.unit_name == "uB").unwrap();
        assert_eq!(row_b.provenance, "tier2/fleet_ef");
        // fleet EF = 120000 kg / 2000 MMBtu = 60 kg/MMBtu; 60000 kg / 60 = 1000
        assert!((row_b.energy_mmbtu - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn tier2_national_ef_when_other_facility_measured() {
        let mut measured = base("f1", "uA", "natural gas");
        measured.tier2_co2_tonnes = Some(120.0);
        measured.fuel_quantity = Some(2000.0);
        measured.fuel_quantity_uom = Some(Uom::Mcf);
        measured.measured_hhv_mmbtu = Some(1.0);

        let mut unmeasured = base("f2", "uB", "natural gas");
        unmeasured.tier2_co2_tonnes = Some(60.0);

        let rows = estimate_energy(&HarmonizerConfig::new(), &[measured, unmeasured]);
        let row_b = rows.iter().find(|r| r.unit_name == "uB").unwrap();
        assert_eq!(row_b.provenance, "tier2/national_ef");
    }

    #[test]
    fn tier2_standard_ef_last_resort() {
        let mut rec = base("f1", "u1", "natural gas");
        rec.tier2_co2_tonnes = Some(53.06);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert_eq!(rows[0].provenance, "tier2/standard_ef");
        assert!((rows[0].energy_mmbtu - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn tier3_direct_product_for_process_gas() {
        let mut rec = base("f1", "u1", "blast furnace gas");
        rec.tier3_co2_tonnes = Some(500.0);
        rec.fuel_quantity = Some(1.0e6);
        rec.fuel_quantity_uom = Some(Uom::Scf);
        rec.measured_hhv_mmbtu = Some(9.2e-5);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert_eq!(rows[0].provenance, "tier3/measured_hhv");
        assert!((rows[0].energy_mmbtu - 92.0).abs() < 1e-9);
    }

    #[test]
    fn tier3_national_hhv_fallback() {
        let mut rec = base("f1", "u1", "natural gas");
        rec.tier3_co2_tonnes = Some(500.0);
        rec.fuel_quantity = Some(1000.0);
        rec.fuel_quantity_uom = Some(Uom::Mcf);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert_eq!(rows[0].provenance, "tier3/national_hhv");
        assert!((rows[0].energy_mmbtu - 1026.0).abs() < 1e-6);
    }

    #[test]
    fn tier4_heat_input_then_ch4() {
        let mut with_heat = base("f1", "u1", "wood");
        with_heat.tier4_ch4_tonnes = Some(1.0);
        with_heat.annual_heat_input_mmbtu = Some(5000.0);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[with_heat]);
        assert_eq!(rows[0].provenance, "tier4/heat_input");
        assert_eq!(rows[0].energy_mmbtu, 5000.0);

        let mut ch4_only = base("f1", "u2", "wood");
        ch4_only.tier4_ch4_tonnes = Some(7.2e-3);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[ch4_only]);
        assert_eq!(rows[0].provenance, "tier4/ch4_backcalc");
        // 7.2 kg CH4 / 7.2e-3 kg/MMBtu = 1000 MMBtu
        assert!((rows[0].energy_mmbtu - 1000.0).abs() < 1e-9);
        // GHG from CH4 at GWP 25
        assert!((rows[0].ghg_tonnes_co2e.unwrap() - 0.18).abs() < 1e-12);
    }

    #[test]
    fn unresolvable_fuel_contributes_nothing() {
        let mut rec = base("f1", "u1", "mystery fuel");
        rec.tier1_co2_tonnes = Some(100.0);
        let rows = estimate_energy(&HarmonizerConfig::new(), &[rec]);
        assert!(rows.is_empty());
    }

    #[test]
    fn aggregate_sums_across_tiers() {
        let row = |tier, energy_mmbtu: f64, provenance: &str| TierEnergy {
            facility_id: "f1".into(),
            unit_name: "u1".into(),
            fuel: Fuel::NaturalGas,
            fuel_raw: "Natural Gas".into(),
            reporting_year: 2021,
            tier,
            energy_mmbtu,
            ghg_tonnes_co2e: Some(10.0),
            provenance: provenance.into(),
        };
        let units = aggregate_units(&[
            row(Tier::Tier1, 100.0, "tier1/standard_ef"),
            row(Tier::Tier2, 200.0, "tier2/fleet_ef"),
        ]);
        assert_eq!(units.len(), 1);
        assert!((units[0].energy_mj - 300.0 * cinder_core::MJ_PER_MMBTU).abs() < 1e-6);
        assert_eq!(units[0].ghg_tonnes_co2e, Some(20.0));
        assert_eq!(units[0].provenance, "tier1/standard_ef+tier2/fleet_ef");
    }
}
