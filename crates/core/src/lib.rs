//! `cinder-core` — shared data model for the combustion inventory compiler.
//!
//! Pure value types: canonical fuel/unit taxonomies, units of measure with
//! total conversion functions, quantile triples, emission records, and the
//! facility identity table. No I/O.

pub mod fuel;
pub mod identity;
pub mod model;
pub mod pollutant;
pub mod quantile;
pub mod uom;

pub use fuel::Fuel;
pub use identity::{FacilityIdentity, IdentityTable};
pub use model::{CombustionUnit, EnergyEstimate, EstimateSource, UnitKey, UnitKind};
pub use pollutant::Pollutant;
pub use quantile::QuantileTriple;
pub use uom::Uom;

/// Megajoules per MMBtu.
pub const MJ_PER_MMBTU: f64 = 1055.06;

/// Metric tonnes per pound.
pub const TONNE_PER_LB: f64 = 1.0 / 2204.62;

/// Hours in a reporting year, used when regenerating energy from design
/// capacity under a continuous-operation assumption.
pub const HOURS_PER_YEAR: f64 = 8760.0;
