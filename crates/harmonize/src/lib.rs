//! `cinder-harmonize` — classifies free-text unit and fuel descriptions into
//! the canonical taxonomy and reconciles the three independent naming
//! vocabularies (source unit type, SCC-derived type, description-derived
//! type).
//!
//! Classification never fails: anything unmatched resolves to `Other` so
//! every row stays joinable downstream.

pub mod config;
pub mod fuel_type;
pub mod scc;
pub mod select;
pub mod unit_type;

pub use config::HarmonizerConfig;
pub use fuel_type::classify_fuel;
pub use scc::unit_type_from_scc;
pub use select::{select_unit_type, Candidates};
pub use unit_type::classify_unit_type;
