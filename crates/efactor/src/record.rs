use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cinder_core::{Pollutant, Uom};

/// One reported pollutant quantity for one unit-process-fuel-year.
/// Immutable input; never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeiRecord {
    pub facility_id: String,
    pub unit_id: String,
    pub process_id: String,
    pub scc: String,
    pub pollutant_code: String,

    pub total_emissions: Option<f64>,
    pub emissions_uom: Option<Uom>,

    /// Reported (unit-specific) emission factor and its units.
    pub emission_factor: Option<f64>,
    pub ef_numerator_uom: Option<Uom>,
    pub ef_denominator_uom: Option<Uom>,

    pub calc_method: Option<String>,

    /// Free-text fields, harmonization fallback and capacity recovery.
    pub unit_type_raw: String,
    pub unit_description: String,
    pub process_description: String,
    pub fuel_hint: Option<String>,

    pub design_capacity: Option<f64>,
    pub design_capacity_uom: Option<Uom>,
}

impl NeiRecord {
    pub fn pollutant(&self) -> Pollutant {
        Pollutant::parse(&self.pollutant_code)
    }
}

/// What the crowd-sourced factor says happens to the material: burned
/// material has no meaningful throughput, only energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionVerb {
    Burned,
    Processed,
    Produced,
    Other,
}

impl ActionVerb {
    pub fn parse(raw: &str) -> ActionVerb {
        match raw.trim().to_ascii_lowercase().as_str() {
            "burned" | "burn" | "combusted" => ActionVerb::Burned,
            "processed" | "process" => ActionVerb::Processed,
            "produced" | "produce" => ActionVerb::Produced,
            _ => ActionVerb::Other,
        }
    }
}

/// One crowd-sourced emission factor for a (classification code, pollutant)
/// process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryFactor {
    pub scc: String,
    pub pollutant_code: String,
    pub material: String,
    pub factor: f64,
    pub action: ActionVerb,
    pub numerator_uom: Uom,
    pub denominator_uom: Uom,
}

/// Secondary factors indexed by (SCC, pollutant). Multiple materials per key
/// are retained; the estimator uses the first for its estimate and the whole
/// set as the distribution the reported factor is checked against.
#[derive(Debug, Clone, Default)]
pub struct SecondaryTable {
    by_key: BTreeMap<(String, Pollutant), Vec<SecondaryFactor>>,
}

impl SecondaryTable {
    pub fn build(factors: &[SecondaryFactor]) -> SecondaryTable {
        let mut by_key: BTreeMap<(String, Pollutant), Vec<SecondaryFactor>> = BTreeMap::new();
        for factor in factors {
            let key = (factor.scc.clone(), Pollutant::parse(&factor.pollutant_code));
            by_key.entry(key).or_default().push(factor.clone());
        }
        SecondaryTable { by_key }
    }

    pub fn lookup(&self, scc: &str, pollutant: Pollutant) -> &[SecondaryFactor] {
        self.by_key
            .get(&(scc.to_string(), pollutant))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
