use serde::{Deserialize, Serialize};

use crate::uom::Uom;

/// Canonical fuel taxonomy. Every source-specific fuel vocabulary maps into
/// one of these variants; `Other` keeps the row joinable when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    NaturalGas,
    DistillateOil,
    ResidualOil,
    Propane,
    Kerosene,
    Gasoline,
    Diesel,
    BituminousCoal,
    SubbituminousCoal,
    Lignite,
    CoalCoke,
    PetroleumCoke,
    Wood,
    BlackLiquor,
    LandfillGas,
    BlastFurnaceGas,
    ProcessGas,
    Waste,
    Other,
}

/// Physical state a fuel is metered in. Decides which native unit its heat
/// content is tabulated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelState {
    /// Heat content per standard cubic foot.
    Gas,
    /// Heat content per gallon.
    Liquid,
    /// Heat content per short ton.
    Solid,
}

impl Fuel {
    pub const ALL: [Fuel; 19] = [
        Fuel::NaturalGas,
        Fuel::DistillateOil,
        Fuel::ResidualOil,
        Fuel::Propane,
        Fuel::Kerosene,
        Fuel::Gasoline,
        Fuel::Diesel,
        Fuel::BituminousCoal,
        Fuel::SubbituminousCoal,
        Fuel::Lignite,
        Fuel::CoalCoke,
        Fuel::PetroleumCoke,
        Fuel::Wood,
        Fuel::BlackLiquor,
        Fuel::LandfillGas,
        Fuel::BlastFurnaceGas,
        Fuel::ProcessGas,
        Fuel::Waste,
        Fuel::Other,
    ];

    pub fn state(&self) -> Option<FuelState> {
        match self {
            Fuel::NaturalGas | Fuel::LandfillGas | Fuel::BlastFurnaceGas | Fuel::ProcessGas => {
                Some(FuelState::Gas)
            }
            Fuel::DistillateOil
            | Fuel::ResidualOil
            | Fuel::Propane
            | Fuel::Kerosene
            | Fuel::Gasoline
            | Fuel::Diesel => Some(FuelState::Liquid),
            Fuel::BituminousCoal
            | Fuel::SubbituminousCoal
            | Fuel::Lignite
            | Fuel::CoalCoke
            | Fuel::PetroleumCoke
            | Fuel::Wood
            | Fuel::BlackLiquor
            | Fuel::Waste => Some(FuelState::Solid),
            Fuel::Other => None,
        }
    }

    /// Default higher heating value in MMBtu per native unit
    /// (scf for gases, gallon for liquids, short ton for solids).
    pub fn hhv_mmbtu_per_native(&self) -> Option<f64> {
        let hhv = match self {
            Fuel::NaturalGas => 1.026e-3,
            Fuel::DistillateOil => 0.138,
            Fuel::ResidualOil => 0.150,
            Fuel::Propane => 0.091,
            Fuel::Kerosene => 0.135,
            Fuel::Gasoline => 0.125,
            Fuel::Diesel => 0.138,
            Fuel::BituminousCoal => 24.93,
            Fuel::SubbituminousCoal => 17.25,
            Fuel::Lignite => 14.21,
            Fuel::CoalCoke => 24.80,
            Fuel::PetroleumCoke => 30.00,
            Fuel::Wood => 17.48,
            Fuel::BlackLiquor => 11.76,
            Fuel::LandfillGas => 0.485e-3,
            Fuel::BlastFurnaceGas => 0.092e-3,
            Fuel::ProcessGas => 1.388e-3,
            Fuel::Waste => 9.95,
            Fuel::Other => return None,
        };
        Some(hhv)
    }

    /// Tier-1 standard CO2 emission factor, kg CO2 per MMBtu.
    pub fn co2_kg_per_mmbtu(&self) -> Option<f64> {
        let ef = match self {
            Fuel::NaturalGas => 53.06,
            Fuel::DistillateOil => 73.96,
            Fuel::ResidualOil => 75.10,
            Fuel::Propane => 62.87,
            Fuel::Kerosene => 75.20,
            Fuel::Gasoline => 70.22,
            Fuel::Diesel => 73.96,
            Fuel::BituminousCoal => 93.28,
            Fuel::SubbituminousCoal => 97.17,
            Fuel::Lignite => 97.72,
            Fuel::CoalCoke => 113.67,
            Fuel::PetroleumCoke => 102.41,
            Fuel::Wood => 93.80,
            Fuel::BlackLiquor => 94.40,
            Fuel::LandfillGas => 52.07,
            Fuel::BlastFurnaceGas => 274.32,
            Fuel::ProcessGas => 59.00,
            Fuel::Waste => 90.70,
            Fuel::Other => return None,
        };
        Some(ef)
    }

    /// Standard CH4 emission factor, kg CH4 per MMBtu. Used for the Tier-4
    /// back-calculation and the kraft-liquor revision correction.
    pub fn ch4_kg_per_mmbtu(&self) -> Option<f64> {
        let ef = match self {
            Fuel::NaturalGas => 1.0e-3,
            Fuel::DistillateOil | Fuel::ResidualOil | Fuel::Kerosene => 3.0e-3,
            Fuel::Propane | Fuel::Gasoline | Fuel::Diesel => 3.0e-3,
            Fuel::BituminousCoal | Fuel::SubbituminousCoal | Fuel::Lignite | Fuel::CoalCoke => {
                1.1e-2
            }
            Fuel::PetroleumCoke => 3.0e-3,
            Fuel::Wood => 7.2e-3,
            Fuel::BlackLiquor => 1.96e-3,
            Fuel::LandfillGas => 3.2e-3,
            Fuel::BlastFurnaceGas => 2.2e-5,
            Fuel::ProcessGas => 3.0e-3,
            Fuel::Waste => 3.2e-2,
            Fuel::Other => return None,
        };
        Some(ef)
    }

    /// Heat content in MMBtu for one `uom` of this fuel. Total over the UOM
    /// table; `None` when the pair is unconvertible (no heat content for the
    /// fuel, or the UOM cannot be expressed in the fuel's native unit).
    pub fn mmbtu_per(&self, uom: Uom) -> Option<f64> {
        let hhv = self.hhv_mmbtu_per_native()?;
        let state = self.state()?;
        let native_units = match state {
            FuelState::Gas => uom.to_scf()?,
            FuelState::Liquid => uom.to_gallons()?,
            FuelState::Solid => uom.to_short_tons()?,
        };
        Some(hhv * native_units)
    }

    /// Heat content in MJ for one `uom` of this fuel.
    pub fn mj_per(&self, uom: Uom) -> Option<f64> {
        self.mmbtu_per(uom).map(|v| v * crate::MJ_PER_MMBTU)
    }
}

impl std::fmt::Display for Fuel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Fuel::NaturalGas => "natural_gas",
            Fuel::DistillateOil => "distillate_oil",
            Fuel::ResidualOil => "residual_oil",
            Fuel::Propane => "propane",
            Fuel::Kerosene => "kerosene",
            Fuel::Gasoline => "gasoline",
            Fuel::Diesel => "diesel",
            Fuel::BituminousCoal => "bituminous_coal",
            Fuel::SubbituminousCoal => "subbituminous_coal",
            Fuel::Lignite => "lignite",
            Fuel::CoalCoke => "coal_coke",
            Fuel::PetroleumCoke => "petroleum_coke",
            Fuel::Wood => "wood",
            Fuel::BlackLiquor => "black_liquor",
            Fuel::LandfillGas => "landfill_gas",
            Fuel::BlastFurnaceGas => "blast_furnace_gas",
            Fuel::ProcessGas => "process_gas",
            Fuel::Waste => "waste",
            Fuel::Other => "other",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fuel_but_other_has_co2_factor() {
        for fuel in Fuel::ALL {
            if fuel == Fuel::Other {
                assert!(fuel.co2_kg_per_mmbtu().is_none());
            } else {
                assert!(fuel.co2_kg_per_mmbtu().is_some(), "{fuel} missing CO2 EF");
            }
        }
    }

    #[test]
    fn natural_gas_heat_content_per_mcf() {
        // 1 Mcf = 1000 scf at 1.026e-3 MMBtu/scf
        let mmbtu = Fuel::NaturalGas.mmbtu_per(Uom::Mcf).unwrap();
        assert!((mmbtu - 1.026).abs() < 1e-9);
    }

    #[test]
    fn solid_fuel_rejects_volume_uom() {
        assert!(Fuel::BituminousCoal.mmbtu_per(Uom::Gallon).is_none());
    }

    #[test]
    fn other_fuel_is_unconvertible() {
        assert!(Fuel::Other.mj_per(Uom::Ton).is_none());
    }
}
