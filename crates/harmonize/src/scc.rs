use cinder_core::UnitKind;

/// Derive a unit type from a source classification code.
///
/// Covers the code ranges that dominate the industrial combustion inventory:
/// level 1 = 1 is external combustion (boilers), level 1 = 2 is internal
/// combustion split turbine/engine at the detail level, 3-90-xxx covers
/// in-process fuel use (kilns, dryers, ovens, heaters, furnaces), 5-01/5-03
/// covers waste incineration. Codes outside the table resolve to `Other`.
pub fn unit_type_from_scc(scc: &str) -> UnitKind {
    let code = scc.trim();
    if code.len() < 8 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return UnitKind::Other;
    }

    // External combustion: electric generation, industrial, commercial.
    if code.starts_with("101") || code.starts_with("102") || code.starts_with("103") {
        return UnitKind::Boiler;
    }

    // Internal combustion: the detail digits separate turbines from
    // reciprocating engines across the fuel-specific series.
    if code.starts_with("201") || code.starts_with("202") || code.starts_with("203") {
        return match &code[6..8] {
            "01" => UnitKind::Turbine,
            "02" | "03" => UnitKind::Engine,
            _ => UnitKind::OtherCombustion,
        };
    }

    // In-process fuel use.
    if code.starts_with("390") {
        return match &code[3..6] {
            "001" | "002" | "003" => UnitKind::Heater,
            "004" => UnitKind::Kiln,
            "005" => UnitKind::Dryer,
            "006" => UnitKind::Oven,
            "007" => UnitKind::Furnace,
            _ => UnitKind::OtherCombustion,
        };
    }

    // Solid waste disposal, government/commercial/industrial incineration.
    if code.starts_with("501") || code.starts_with("503") {
        return UnitKind::Incinerator;
    }

    UnitKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_combustion_is_boiler() {
        assert_eq!(unit_type_from_scc("10200602"), UnitKind::Boiler);
        assert_eq!(unit_type_from_scc("10100201"), UnitKind::Boiler);
    }

    #[test]
    fn internal_combustion_splits_on_detail() {
        assert_eq!(unit_type_from_scc("20100201"), UnitKind::Turbine);
        assert_eq!(unit_type_from_scc("20100202"), UnitKind::Engine);
    }

    #[test]
    fn in_process_fuel_use() {
        assert_eq!(unit_type_from_scc("39000402"), UnitKind::Kiln);
        assert_eq!(unit_type_from_scc("39000502"), UnitKind::Dryer);
        assert_eq!(unit_type_from_scc("39000799"), UnitKind::Furnace);
    }

    #[test]
    fn unknown_or_malformed_is_other() {
        assert_eq!(unit_type_from_scc("30500101"), UnitKind::Other);
        assert_eq!(unit_type_from_scc("1234"), UnitKind::Other);
        assert_eq!(unit_type_from_scc("abcdefgh"), UnitKind::Other);
    }
}
