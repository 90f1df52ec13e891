use serde::{Deserialize, Serialize};

use crate::fuel::Fuel;
use crate::quantile::QuantileTriple;
use crate::uom::Uom;

// ---------------------------------------------------------------------------
// Canonical unit taxonomy
// ---------------------------------------------------------------------------

/// Canonical combustion-unit taxonomy. `OtherCombustion` marks a unit whose
/// description matched more than one kind (ambiguous but definitely
/// combustion); `Other` marks a unit nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Boiler,
    Kiln,
    Furnace,
    Dryer,
    Oven,
    Turbine,
    Engine,
    Heater,
    Incinerator,
    ThermalOxidizer,
    Generator,
    Stove,
    Flare,
    OtherCombustion,
    Other,
}

impl UnitKind {
    /// True when this is a concrete equipment kind rather than one of the
    /// two fallback buckets.
    pub fn is_specific(&self) -> bool {
        !matches!(self, UnitKind::Other | UnitKind::OtherCombustion)
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnitKind::Boiler => "boiler",
            UnitKind::Kiln => "kiln",
            UnitKind::Furnace => "furnace",
            UnitKind::Dryer => "dryer",
            UnitKind::Oven => "oven",
            UnitKind::Turbine => "turbine",
            UnitKind::Engine => "engine",
            UnitKind::Heater => "heater",
            UnitKind::Incinerator => "incinerator",
            UnitKind::ThermalOxidizer => "thermal oxidizer",
            UnitKind::Generator => "generator",
            UnitKind::Stove => "stove",
            UnitKind::Flare => "flare",
            UnitKind::OtherCombustion => "other combustion",
            UnitKind::Other => "other",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Unit identity
// ---------------------------------------------------------------------------

/// Composite key of one physical combustion device burning one fuel. A unit
/// that combusts several fuels legitimately appears once per fuel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub facility_id: String,
    pub unit_id: String,
    pub fuel: Fuel,
}

impl UnitKey {
    pub fn new(facility_id: impl Into<String>, unit_id: impl Into<String>, fuel: Fuel) -> UnitKey {
        UnitKey {
            facility_id: facility_id.into(),
            unit_id: unit_id.into(),
            fuel,
        }
    }
}

// ---------------------------------------------------------------------------
// Estimates
// ---------------------------------------------------------------------------

/// Which estimator (or reconciliation branch) produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    /// Emission-factor back-calculation (pollutant inventory side).
    EmissionFactor,
    /// Tiered methodology (facility emissions inventory side).
    TierMethod,
    /// Regenerated from design capacity after a ceiling violation.
    Capacity,
    /// Disaggregated from an aggregate "other combustion source" lump.
    Allocated,
}

impl std::fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EstimateSource::EmissionFactor => "emission_factor",
            EstimateSource::TierMethod => "tier_method",
            EstimateSource::Capacity => "capacity",
            EstimateSource::Allocated => "allocated",
        };
        write!(f, "{name}")
    }
}

/// One unit-fuel energy estimate: quantile triples for energy and, where
/// meaningful, material throughput and greenhouse-gas emissions.
///
/// Absent axes stay `None`; a triple is only ever built from positive
/// evidence, never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub energy_mj: Option<QuantileTriple>,
    pub throughput_tonnes: Option<QuantileTriple>,
    pub ghg_tonnes_co2e: Option<QuantileTriple>,
    pub source: EstimateSource,
    /// Which emission record(s) or reconciliation branch produced the value.
    pub provenance: String,
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// The central entity: one combustion/process device at one facility, keyed
/// by (facility, unit, fuel), carrying raw and canonical classifications and
/// the surviving energy estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombustionUnit {
    pub key: UnitKey,
    pub unit_type_raw: String,
    pub unit_type: UnitKind,
    pub fuel_type_raw: String,
    pub design_capacity: Option<f64>,
    pub design_capacity_uom: Option<Uom>,
    pub estimate: EnergyEstimate,
}

impl CombustionUnit {
    /// Design capacity in MW, when both the value and a capacity-convertible
    /// UOM are present.
    pub fn capacity_mw(&self) -> Option<f64> {
        let value = self.design_capacity?;
        let per = self.design_capacity_uom?.to_megawatts()?;
        Some(value * per)
    }
}
