use serde::{Deserialize, Serialize};

use cinder_core::{Fuel, Uom};

/// Which of the four methodologies a record reports under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
            Tier::Tier4 => "tier4",
        };
        write!(f, "{name}")
    }
}

/// One facility-year-unit-fuel emission record from the tier-methodology
/// inventory. Immutable input; at most one tier emissions field is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhgrpRecord {
    pub facility_id: String,
    pub reporting_year: i32,
    pub unit_name: String,

    /// Tier-specific reported emissions, tonnes of gas. Tiers 1-3 report
    /// CO2; Tier 4 reports CH4 (CO2 there is largely biogenic-exempt).
    pub tier1_co2_tonnes: Option<f64>,
    pub tier2_co2_tonnes: Option<f64>,
    pub tier3_co2_tonnes: Option<f64>,
    pub tier4_ch4_tonnes: Option<f64>,

    /// Fuel fallback columns, tried in order.
    pub fuel_type: Option<String>,
    pub fuel_type_other: Option<String>,
    pub fuel_blend: Option<String>,

    /// Reported annual heat input, MMBtu (Tier 4 preferred path).
    pub annual_heat_input_mmbtu: Option<f64>,

    /// Combusted fuel quantity and its unit (Tiers 2-3).
    pub fuel_quantity: Option<f64>,
    pub fuel_quantity_uom: Option<Uom>,

    /// Facility-measured heat content, MMBtu per `fuel_quantity_uom`.
    pub measured_hhv_mmbtu: Option<f64>,
}

impl GhgrpRecord {
    /// Which tier this record reports under, by populated emissions field.
    /// Field order is the documented precedence for the (malformed) case of
    /// multiple populated fields.
    pub fn tier(&self) -> Option<Tier> {
        if self.tier1_co2_tonnes.is_some() {
            Some(Tier::Tier1)
        } else if self.tier2_co2_tonnes.is_some() {
            Some(Tier::Tier2)
        } else if self.tier3_co2_tonnes.is_some() {
            Some(Tier::Tier3)
        } else if self.tier4_ch4_tonnes.is_some() {
            Some(Tier::Tier4)
        } else {
            None
        }
    }
}

/// One computed energy row. Duplicate unit-fuel rows across tiers are
/// retained here and summed when aggregating to unit granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierEnergy {
    pub facility_id: String,
    pub unit_name: String,
    pub fuel: Fuel,
    /// The source text the fuel resolved from, kept for the output table.
    pub fuel_raw: String,
    pub reporting_year: i32,
    pub tier: Tier,
    pub energy_mmbtu: f64,
    pub ghg_tonnes_co2e: Option<f64>,
    pub provenance: String,
}

impl TierEnergy {
    pub fn energy_mj(&self) -> f64 {
        self.energy_mmbtu * cinder_core::MJ_PER_MMBTU
    }
}
