use serde::{Deserialize, Serialize};

/// Pollutants the estimators understand. The emission-factor inventory
/// reports many more species; anything outside this set still flows through
/// the estimator (its factor math is pollutant-agnostic) but gets no
/// GHG treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Co2,
    Ch4,
    N2o,
    Co,
    Nox,
    So2,
    Pm,
    Voc,
    Lead,
    Other,
}

impl Pollutant {
    /// Map the inventory's pollutant codes onto the taxonomy.
    pub fn parse(code: &str) -> Pollutant {
        match code.trim().to_ascii_uppercase().as_str() {
            "CO2" | "124-38-9" => Pollutant::Co2,
            "CH4" | "74-82-8" => Pollutant::Ch4,
            "N2O" | "10024-97-2" => Pollutant::N2o,
            "CO" | "630-08-0" => Pollutant::Co,
            "NOX" | "NO2" | "10102-44-0" => Pollutant::Nox,
            "SO2" | "7446-09-5" => Pollutant::So2,
            "PM" | "PM10-PRI" | "PM25-PRI" | "PM-CON" => Pollutant::Pm,
            "VOC" => Pollutant::Voc,
            "7439-92-1" | "PB" => Pollutant::Lead,
            _ => Pollutant::Other,
        }
    }

    /// 100-year global warming potential, tonnes CO2e per tonne. `None` for
    /// non-greenhouse species.
    pub fn gwp(&self) -> Option<f64> {
        match self {
            Pollutant::Co2 => Some(1.0),
            Pollutant::Ch4 => Some(25.0),
            Pollutant::N2o => Some(298.0),
            _ => None,
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Pollutant::Co2 => "co2",
            Pollutant::Ch4 => "ch4",
            Pollutant::N2o => "n2o",
            Pollutant::Co => "co",
            Pollutant::Nox => "nox",
            Pollutant::So2 => "so2",
            Pollutant::Pm => "pm",
            Pollutant::Voc => "voc",
            Pollutant::Lead => "lead",
            Pollutant::Other => "other",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_and_cas_numbers() {
        assert_eq!(Pollutant::parse("CO2"), Pollutant::Co2);
        assert_eq!(Pollutant::parse("124-38-9"), Pollutant::Co2);
        assert_eq!(Pollutant::parse("nox"), Pollutant::Nox);
        assert_eq!(Pollutant::parse("benzene"), Pollutant::Other);
    }

    #[test]
    fn gwp_only_for_greenhouse_species() {
        assert_eq!(Pollutant::Co2.gwp(), Some(1.0));
        assert_eq!(Pollutant::Ch4.gwp(), Some(25.0));
        assert_eq!(Pollutant::Co.gwp(), None);
    }
}
