use cinder_core::{Fuel, UnitKind};
use regex::Regex;

/// Compiled classification tables, built once per run and passed by
/// reference into every classifier call. Nothing here mutates after
/// construction.
pub struct HarmonizerConfig {
    /// Ordered combustion-unit keyword patterns. Synonyms collapse onto the
    /// canonical kind at this level (calciner -> kiln, RICE -> engine, ...).
    pub unit_patterns: Vec<(Regex, UnitKind)>,
    /// Engine/reciprocating synonyms get their own pattern so the
    /// ambiguity override can test them directly.
    pub engine_pattern: Regex,
    /// Fuel dictionary searched by substring; longest key wins on multiple
    /// hits.
    pub fuel_dict: Vec<(&'static str, Fuel)>,
}

impl HarmonizerConfig {
    pub fn new() -> HarmonizerConfig {
        let pattern = |p: &str| Regex::new(&format!("(?i){p}")).expect("static unit-type pattern");

        let unit_patterns = vec![
            (pattern(r"\bboilers?\b"), UnitKind::Boiler),
            (pattern(r"\bkilns?\b|\bcalciners?\b"), UnitKind::Kiln),
            (pattern(r"\bfurnaces?\b"), UnitKind::Furnace),
            (pattern(r"\bdryers?\b|\bdriers?\b"), UnitKind::Dryer),
            (pattern(r"\bovens?\b"), UnitKind::Oven),
            (pattern(r"\bturbines?\b|\bcombined cycle\b"), UnitKind::Turbine),
            (
                pattern(r"\bengines?\b|\breciprocating\b|\brice\b|\bcompressors?\b"),
                UnitKind::Engine,
            ),
            (pattern(r"\bheaters?\b|\breboilers?\b"), UnitKind::Heater),
            (pattern(r"\bincinerators?\b"), UnitKind::Incinerator),
            (pattern(r"\boxidizers?\b|\brto\b"), UnitKind::ThermalOxidizer),
            (pattern(r"\bgenerators?\b|\bgenset\b"), UnitKind::Generator),
            (pattern(r"\bstoves?\b"), UnitKind::Stove),
            (pattern(r"\bflares?\b"), UnitKind::Flare),
        ];

        let engine_pattern =
            pattern(r"\bengines?\b|\breciprocating\b|\brice\b|\bcompressors?\b");

        // Longer, more specific keys must shadow their substrings, so the
        // lookup prefers the longest matching key.
        let fuel_dict = vec![
            ("natural gas", Fuel::NaturalGas),
            ("pipeline gas", Fuel::NaturalGas),
            ("ng", Fuel::NaturalGas),
            ("distillate", Fuel::DistillateOil),
            ("fuel oil #2", Fuel::DistillateOil),
            ("no. 2 oil", Fuel::DistillateOil),
            ("residual oil", Fuel::ResidualOil),
            ("fuel oil #6", Fuel::ResidualOil),
            ("no. 6 oil", Fuel::ResidualOil),
            ("bunker", Fuel::ResidualOil),
            ("propane", Fuel::Propane),
            ("lpg", Fuel::Propane),
            ("liquefied petroleum", Fuel::Propane),
            ("kerosene", Fuel::Kerosene),
            ("gasoline", Fuel::Gasoline),
            ("diesel", Fuel::Diesel),
            ("bituminous", Fuel::BituminousCoal),
            ("subbituminous", Fuel::SubbituminousCoal),
            ("sub-bituminous", Fuel::SubbituminousCoal),
            ("lignite", Fuel::Lignite),
            ("coal coke", Fuel::CoalCoke),
            ("coke oven gas", Fuel::ProcessGas),
            ("petroleum coke", Fuel::PetroleumCoke),
            ("pet coke", Fuel::PetroleumCoke),
            ("coal", Fuel::BituminousCoal),
            ("wood", Fuel::Wood),
            ("bark", Fuel::Wood),
            ("biomass", Fuel::Wood),
            ("black liquor", Fuel::BlackLiquor),
            ("spent liquor", Fuel::BlackLiquor),
            ("landfill gas", Fuel::LandfillGas),
            ("blast furnace gas", Fuel::BlastFurnaceGas),
            ("process gas", Fuel::ProcessGas),
            ("refinery gas", Fuel::ProcessGas),
            ("fuel gas", Fuel::ProcessGas),
            ("waste", Fuel::Waste),
            ("msw", Fuel::Waste),
        ];

        HarmonizerConfig {
            unit_patterns,
            engine_pattern,
            fuel_dict,
        }
    }
}

impl Default for HarmonizerConfig {
    fn default() -> Self {
        Self::new()
    }
}
