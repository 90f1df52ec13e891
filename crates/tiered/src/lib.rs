//! `cinder-tiered` — converts the facility emissions inventory's per-tier
//! CO2/CH4 combustion emissions into unit-fuel energy.
//!
//! Each input record populates exactly one of four tier fields; each tier has
//! its own back-calculation, and Tier 2 carries a graduated fallback ladder
//! for units whose heat-content measurements are missing. Known data-quality
//! problems are corrected before any calculation.

pub mod calc;
pub mod fixes;
pub mod record;

pub use calc::{aggregate_units, estimate_energy, UnitEnergy};
pub use record::{GhgrpRecord, Tier, TierEnergy};
