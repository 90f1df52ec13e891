use std::path::Path;

use cinder_core::QuantileTriple;
use cinder_recon::InventoryRow;

use crate::error::IoError;

/// Output header, fixed order. Quantile triples flatten to three columns
/// each; absent values stay blank so "no evidence" never reads as zero.
pub const INVENTORY_HEADER: [&str; 20] = [
    "registry_id",
    "facility_id",
    "unit_id",
    "unit_type_raw",
    "unit_type",
    "fuel_type_raw",
    "fuel",
    "design_capacity",
    "design_capacity_uom",
    "energy_mj_q0",
    "energy_mj_q2",
    "energy_mj_q3",
    "throughput_t_q0",
    "throughput_t_q2",
    "throughput_t_q3",
    "ghg_tco2e_q0",
    "ghg_tco2e_q2",
    "ghg_tco2e_q3",
    "estimate_source",
    "recon_branch",
];

/// Write the compiled inventory. Rows arrive already sorted from the engine;
/// the writer adds nothing nondeterministic.
pub fn write_inventory(path: &Path, rows: &[InventoryRow]) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| IoError::Io(format!("{}: {e}", path.display())))?;

    writer
        .write_record(INVENTORY_HEADER)
        .map_err(|e| IoError::Io(e.to_string()))?;

    for row in rows {
        let unit = &row.unit;
        let estimate = &unit.estimate;
        let record = [
            row.registry_id.clone().unwrap_or_default(),
            unit.key.facility_id.clone(),
            unit.key.unit_id.clone(),
            unit.unit_type_raw.clone(),
            unit.unit_type.to_string(),
            unit.fuel_type_raw.clone(),
            unit.key.fuel.to_string(),
            unit.design_capacity.map(fmt_f64).unwrap_or_default(),
            unit.design_capacity_uom
                .map(|u| u.to_string())
                .unwrap_or_default(),
            triple_cell(&estimate.energy_mj, |t| t.q0),
            triple_cell(&estimate.energy_mj, |t| t.q2),
            triple_cell(&estimate.energy_mj, |t| t.q3),
            triple_cell(&estimate.throughput_tonnes, |t| t.q0),
            triple_cell(&estimate.throughput_tonnes, |t| t.q2),
            triple_cell(&estimate.throughput_tonnes, |t| t.q3),
            triple_cell(&estimate.ghg_tonnes_co2e, |t| t.q0),
            triple_cell(&estimate.ghg_tonnes_co2e, |t| t.q2),
            triple_cell(&estimate.ghg_tonnes_co2e, |t| t.q3),
            estimate.source.to_string(),
            row.branch.to_string(),
        ];
        writer
            .write_record(&record)
            .map_err(|e| IoError::Io(e.to_string()))?;
    }

    writer.flush().map_err(|e| IoError::Io(e.to_string()))?;
    Ok(())
}

fn triple_cell(triple: &Option<QuantileTriple>, pick: impl Fn(&QuantileTriple) -> f64) -> String {
    triple.as_ref().map(|t| fmt_f64(pick(t))).unwrap_or_default()
}

/// Shortest round-trippable float formatting, so re-runs diff clean.
fn fmt_f64(value: f64) -> String {
    format!("{value}")
}
