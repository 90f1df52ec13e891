use std::path::Path;

use cinder_core::{FacilityIdentity, Uom};
use cinder_efactor::{ActionVerb, NeiRecord, SecondaryFactor};
use cinder_tiered::GhgrpRecord;

use crate::error::IoError;

/// Header-position lookup over one CSV file. Missing required columns are
/// hard failures; the inventories' schemas are contracts, not suggestions.
struct Columns {
    file: String,
    headers: Vec<String>,
}

impl Columns {
    fn read(file: &str, reader: &mut csv::Reader<std::fs::File>) -> Result<Columns, IoError> {
        let headers = reader
            .headers()
            .map_err(|e| IoError::Io(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Columns {
            file: file.to_string(),
            headers,
        })
    }

    fn require(&self, name: &str) -> Result<usize, IoError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IoError::MissingColumn {
                file: self.file.clone(),
                column: name.to_string(),
            })
    }
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, IoError> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| IoError::Io(format!("{}: {e}", path.display())))
}

fn cell<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}

fn opt_string(record: &csv::StringRecord, index: usize) -> Option<String> {
    let value = cell(record, index);
    (!value.is_empty()).then(|| value.to_string())
}

/// Blank cells are absent evidence; non-blank cells must parse.
fn opt_f64(
    file: &str,
    column: &str,
    record: &csv::StringRecord,
    index: usize,
) -> Result<Option<f64>, IoError> {
    let value = cell(record, index);
    if value.is_empty() {
        return Ok(None);
    }
    value
        .replace(',', "")
        .parse()
        .map(Some)
        .map_err(|_| IoError::NumberParse {
            file: file.to_string(),
            line: record.position().map(|p| p.line()).unwrap_or(0),
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Unknown units of measure are not schema errors: the row simply carries an
/// unconvertible quantity and contributes no estimate on that axis.
fn opt_uom(record: &csv::StringRecord, index: usize) -> Option<Uom> {
    let value = cell(record, index);
    if value.is_empty() {
        return None;
    }
    let parsed = Uom::parse(value);
    if parsed.is_none() {
        log::debug!("unknown unit of measure '{value}'");
    }
    parsed
}

/// Load the tier-methodology emission records.
pub fn load_ghgrp(path: &Path) -> Result<Vec<GhgrpRecord>, IoError> {
    let file = path.display().to_string();
    let mut reader = open(path)?;
    let columns = Columns::read(&file, &mut reader)?;

    let facility_id = columns.require("facility_id")?;
    let reporting_year = columns.require("reporting_year")?;
    let unit_name = columns.require("unit_name")?;
    let tier1 = columns.require("tier1_co2_t")?;
    let tier2 = columns.require("tier2_co2_t")?;
    let tier3 = columns.require("tier3_co2_t")?;
    let tier4 = columns.require("tier4_ch4_t")?;
    let fuel_type = columns.require("fuel_type")?;
    let fuel_type_other = columns.require("fuel_type_other")?;
    let fuel_blend = columns.require("fuel_blend")?;
    let heat_input = columns.require("annual_heat_input_mmbtu")?;
    let fuel_quantity = columns.require("fuel_quantity")?;
    let fuel_quantity_uom = columns.require("fuel_quantity_uom")?;
    let measured_hhv = columns.require("measured_hhv_mmbtu")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IoError::Io(e.to_string()))?;
        let year = opt_f64(&file, "reporting_year", &record, reporting_year)?
            .map(|y| y as i32)
            .unwrap_or(0);
        rows.push(GhgrpRecord {
            facility_id: cell(&record, facility_id).to_string(),
            reporting_year: year,
            unit_name: cell(&record, unit_name).to_string(),
            tier1_co2_tonnes: opt_f64(&file, "tier1_co2_t", &record, tier1)?,
            tier2_co2_tonnes: opt_f64(&file, "tier2_co2_t", &record, tier2)?,
            tier3_co2_tonnes: opt_f64(&file, "tier3_co2_t", &record, tier3)?,
            tier4_ch4_tonnes: opt_f64(&file, "tier4_ch4_t", &record, tier4)?,
            fuel_type: opt_string(&record, fuel_type),
            fuel_type_other: opt_string(&record, fuel_type_other),
            fuel_blend: opt_string(&record, fuel_blend),
            annual_heat_input_mmbtu: opt_f64(&file, "annual_heat_input_mmbtu", &record, heat_input)?,
            fuel_quantity: opt_f64(&file, "fuel_quantity", &record, fuel_quantity)?,
            fuel_quantity_uom: opt_uom(&record, fuel_quantity_uom),
            measured_hhv_mmbtu: opt_f64(&file, "measured_hhv_mmbtu", &record, measured_hhv)?,
        });
    }
    log::info!("{file}: {} tier-methodology records", rows.len());
    Ok(rows)
}

/// Load the emission-factor (pollutant inventory) records.
pub fn load_nei(path: &Path) -> Result<Vec<NeiRecord>, IoError> {
    let file = path.display().to_string();
    let mut reader = open(path)?;
    let columns = Columns::read(&file, &mut reader)?;

    let facility_id = columns.require("facility_id")?;
    let unit_id = columns.require("unit_id")?;
    let process_id = columns.require("process_id")?;
    let scc = columns.require("scc")?;
    let pollutant = columns.require("pollutant_code")?;
    let total = columns.require("total_emissions")?;
    let total_uom = columns.require("emissions_uom")?;
    let factor = columns.require("emission_factor")?;
    let factor_num = columns.require("ef_numerator_uom")?;
    let factor_denom = columns.require("ef_denominator_uom")?;
    let calc_method = columns.require("calc_method")?;
    let unit_type = columns.require("unit_type")?;
    let unit_description = columns.require("unit_description")?;
    let process_description = columns.require("process_description")?;
    let fuel = columns.require("fuel")?;
    let capacity = columns.require("design_capacity")?;
    let capacity_uom = columns.require("design_capacity_uom")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IoError::Io(e.to_string()))?;
        rows.push(NeiRecord {
            facility_id: cell(&record, facility_id).to_string(),
            unit_id: cell(&record, unit_id).to_string(),
            process_id: cell(&record, process_id).to_string(),
            scc: cell(&record, scc).to_string(),
            pollutant_code: cell(&record, pollutant).to_string(),
            total_emissions: opt_f64(&file, "total_emissions", &record, total)?,
            emissions_uom: opt_uom(&record, total_uom),
            emission_factor: opt_f64(&file, "emission_factor", &record, factor)?,
            ef_numerator_uom: opt_uom(&record, factor_num),
            ef_denominator_uom: opt_uom(&record, factor_denom),
            calc_method: opt_string(&record, calc_method),
            unit_type_raw: cell(&record, unit_type).to_string(),
            unit_description: cell(&record, unit_description).to_string(),
            process_description: cell(&record, process_description).to_string(),
            fuel_hint: opt_string(&record, fuel),
            design_capacity: opt_f64(&file, "design_capacity", &record, capacity)?,
            design_capacity_uom: opt_uom(&record, capacity_uom),
        });
    }
    log::info!("{file}: {} emission-factor records", rows.len());
    Ok(rows)
}

/// Load the crowd-sourced emission-factor table.
pub fn load_secondary_factors(path: &Path) -> Result<Vec<SecondaryFactor>, IoError> {
    let file = path.display().to_string();
    let mut reader = open(path)?;
    let columns = Columns::read(&file, &mut reader)?;

    let scc = columns.require("scc")?;
    let pollutant = columns.require("pollutant_code")?;
    let material = columns.require("material")?;
    let factor = columns.require("factor")?;
    let action = columns.require("action")?;
    let numerator = columns.require("numerator_uom")?;
    let denominator = columns.require("denominator_uom")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IoError::Io(e.to_string()))?;
        let Some(value) = opt_f64(&file, "factor", &record, factor)? else {
            continue;
        };
        // A factor with unusable units cannot back-calculate anything.
        let (Some(numerator_uom), Some(denominator_uom)) =
            (opt_uom(&record, numerator), opt_uom(&record, denominator))
        else {
            continue;
        };
        rows.push(SecondaryFactor {
            scc: cell(&record, scc).to_string(),
            pollutant_code: cell(&record, pollutant).to_string(),
            material: cell(&record, material).to_string(),
            factor: value,
            action: ActionVerb::parse(cell(&record, action)),
            numerator_uom,
            denominator_uom,
        });
    }
    log::info!("{file}: {} secondary factors", rows.len());
    Ok(rows)
}

/// Load the facility identity registry.
pub fn load_registry(path: &Path) -> Result<Vec<FacilityIdentity>, IoError> {
    let file = path.display().to_string();
    let mut reader = open(path)?;
    let columns = Columns::read(&file, &mut reader)?;

    let registry_id = columns.require("registry_id")?;
    let nei_id = columns.require("nei_id")?;
    let ghgrp_id = columns.require("ghgrp_id")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IoError::Io(e.to_string()))?;
        rows.push(FacilityIdentity {
            registry_id: cell(&record, registry_id).to_string(),
            nei_id: opt_string(&record, nei_id),
            ghgrp_id: opt_string(&record, ghgrp_id),
        });
    }
    log::info!("{file}: {} identity rows", rows.len());
    Ok(rows)
}
