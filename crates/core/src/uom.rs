use serde::{Deserialize, Serialize};

use crate::fuel::Fuel;

const LB_PER_SHORT_TON: f64 = 2000.0;
const LB_PER_TONNE: f64 = 2204.62;
const LB_PER_KG: f64 = 2.20462;
const GAL_PER_BARREL: f64 = 42.0;
const GAL_PER_LITER: f64 = 0.264172;
const SCF_PER_M3: f64 = 35.3147;
const MJ_PER_KWH: f64 = 3.6;
const MW_PER_MMBTU_HR: f64 = 0.293071;
const MW_PER_HP: f64 = 7.457e-4;

/// Units of measure reported by the two inventories. Conversion functions are
/// total: `None` means the unit is not convertible on that axis, and callers
/// must treat the affected quantity as absent evidence rather than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uom {
    // Mass
    Lb,
    Ton,
    Tonne,
    Kg,
    Gram,
    // Volume
    Gallon,
    Barrel,
    Liter,
    CubicMeter,
    Scf,
    Mcf,
    MMcf,
    // Energy
    Mj,
    Gj,
    Btu,
    MMBtu,
    Therm,
    Kwh,
    Mwh,
    // Capacity
    Mw,
    Kw,
    MMBtuPerHr,
    Hp,
}

impl Uom {
    /// Parse the unit-of-measure vocabulary the inventories use. Returns
    /// `None` for units outside the table so callers can surface the row.
    pub fn parse(raw: &str) -> Option<Uom> {
        let norm = raw.trim().to_ascii_lowercase();
        let uom = match norm.as_str() {
            "lb" | "lbs" | "pound" | "pounds" => Uom::Lb,
            "ton" | "tons" | "short ton" | "short tons" => Uom::Ton,
            "tonne" | "tonnes" | "metric ton" | "metric tons" | "mt" => Uom::Tonne,
            "kg" | "kilograms" => Uom::Kg,
            "g" | "gram" | "grams" => Uom::Gram,
            "gal" | "gallon" | "gallons" => Uom::Gallon,
            "bbl" | "barrel" | "barrels" => Uom::Barrel,
            "l" | "liter" | "liters" => Uom::Liter,
            "m3" | "cubic meter" | "cubic meters" => Uom::CubicMeter,
            "scf" | "ft3" | "cubic feet" => Uom::Scf,
            "mcf" | "1000 ft3" | "e3ft3" => Uom::Mcf,
            "mmcf" | "million cubic feet" | "e6ft3" => Uom::MMcf,
            "mj" => Uom::Mj,
            "gj" => Uom::Gj,
            "btu" => Uom::Btu,
            "mmbtu" | "million btu" => Uom::MMBtu,
            "therm" | "therms" => Uom::Therm,
            "kwh" => Uom::Kwh,
            "mwh" => Uom::Mwh,
            "mw" => Uom::Mw,
            "kw" => Uom::Kw,
            "mmbtu/hr" | "mmbtu/hour" => Uom::MMBtuPerHr,
            "hp" | "horsepower" => Uom::Hp,
            _ => return None,
        };
        Some(uom)
    }

    /// Mass axis: pounds per one of this unit.
    pub fn to_pounds(&self) -> Option<f64> {
        let lb = match self {
            Uom::Lb => 1.0,
            Uom::Ton => LB_PER_SHORT_TON,
            Uom::Tonne => LB_PER_TONNE,
            Uom::Kg => LB_PER_KG,
            Uom::Gram => LB_PER_KG / 1000.0,
            _ => return None,
        };
        Some(lb)
    }

    /// Liquid-volume axis: gallons per one of this unit.
    pub fn to_gallons(&self) -> Option<f64> {
        let gal = match self {
            Uom::Gallon => 1.0,
            Uom::Barrel => GAL_PER_BARREL,
            Uom::Liter => GAL_PER_LITER,
            Uom::CubicMeter => GAL_PER_LITER * 1000.0,
            _ => return None,
        };
        Some(gal)
    }

    /// Gas-volume axis: standard cubic feet per one of this unit.
    pub fn to_scf(&self) -> Option<f64> {
        let scf = match self {
            Uom::Scf => 1.0,
            Uom::Mcf => 1000.0,
            Uom::MMcf => 1.0e6,
            Uom::CubicMeter => SCF_PER_M3,
            _ => return None,
        };
        Some(scf)
    }

    /// Solid-mass axis: short tons per one of this unit.
    pub fn to_short_tons(&self) -> Option<f64> {
        self.to_pounds().map(|lb| lb / LB_PER_SHORT_TON)
    }

    /// Energy axis. Pure energy units convert directly; volume and mass units
    /// route through the fuel's heat content, so they convert only when a
    /// fuel with a tabulated heat content is supplied.
    pub fn to_mj(&self, fuel: Option<Fuel>) -> Option<f64> {
        let direct = match self {
            Uom::Mj => Some(1.0),
            Uom::Gj => Some(1000.0),
            Uom::Btu => Some(crate::MJ_PER_MMBTU / 1.0e6),
            Uom::MMBtu => Some(crate::MJ_PER_MMBTU),
            Uom::Therm => Some(crate::MJ_PER_MMBTU / 10.0),
            Uom::Kwh => Some(MJ_PER_KWH),
            Uom::Mwh => Some(MJ_PER_KWH * 1000.0),
            _ => None,
        };
        if direct.is_some() {
            return direct;
        }
        fuel?.mj_per(*self)
    }

    /// Capacity axis: megawatts per one of this unit.
    pub fn to_megawatts(&self) -> Option<f64> {
        let mw = match self {
            Uom::Mw => 1.0,
            Uom::Kw => 1.0e-3,
            Uom::MMBtuPerHr => MW_PER_MMBTU_HR,
            Uom::Hp => MW_PER_HP,
            _ => return None,
        };
        Some(mw)
    }

    pub fn is_mass(&self) -> bool {
        self.to_pounds().is_some()
    }

    pub fn is_energy(&self) -> bool {
        matches!(
            self,
            Uom::Mj | Uom::Gj | Uom::Btu | Uom::MMBtu | Uom::Therm | Uom::Kwh | Uom::Mwh
        )
    }

    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Uom::Gallon | Uom::Barrel | Uom::Liter | Uom::CubicMeter | Uom::Scf | Uom::Mcf | Uom::MMcf
        )
    }
}

impl std::fmt::Display for Uom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Uom::Lb => "lb",
            Uom::Ton => "ton",
            Uom::Tonne => "tonne",
            Uom::Kg => "kg",
            Uom::Gram => "g",
            Uom::Gallon => "gal",
            Uom::Barrel => "bbl",
            Uom::Liter => "l",
            Uom::CubicMeter => "m3",
            Uom::Scf => "scf",
            Uom::Mcf => "mcf",
            Uom::MMcf => "mmcf",
            Uom::Mj => "mj",
            Uom::Gj => "gj",
            Uom::Btu => "btu",
            Uom::MMBtu => "mmbtu",
            Uom::Therm => "therm",
            Uom::Kwh => "kwh",
            Uom::Mwh => "mwh",
            Uom::Mw => "mw",
            Uom::Kw => "kw",
            Uom::MMBtuPerHr => "mmbtu/hr",
            Uom::Hp => "hp",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_common_spellings() {
        assert_eq!(Uom::parse("LBS"), Some(Uom::Lb));
        assert_eq!(Uom::parse(" Short Tons "), Some(Uom::Ton));
        assert_eq!(Uom::parse("MMBtu/hr"), Some(Uom::MMBtuPerHr));
        assert_eq!(Uom::parse("furlongs"), None);
    }

    #[test]
    fn mass_conversions() {
        assert_eq!(Uom::Ton.to_pounds(), Some(2000.0));
        assert!((Uom::Tonne.to_pounds().unwrap() - 2204.62).abs() < 1e-9);
        assert!(Uom::Gallon.to_pounds().is_none());
    }

    #[test]
    fn energy_conversions_direct() {
        assert_eq!(Uom::Gj.to_mj(None), Some(1000.0));
        assert!((Uom::MMBtu.to_mj(None).unwrap() - 1055.06).abs() < 1e-9);
        assert!((Uom::Mwh.to_mj(None).unwrap() - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn volume_needs_fuel() {
        assert!(Uom::Mcf.to_mj(None).is_none());
        let mj = Uom::Mcf.to_mj(Some(Fuel::NaturalGas)).unwrap();
        assert!((mj - 1.026 * 1055.06).abs() < 1e-6);
    }

    #[test]
    fn capacity_conversions() {
        assert!((Uom::MMBtuPerHr.to_megawatts().unwrap() - 0.293071).abs() < 1e-9);
        assert_eq!(Uom::Lb.to_megawatts(), None);
    }
}
