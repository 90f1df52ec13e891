use cinder_core::Fuel;

use crate::config::HarmonizerConfig;

/// Map a free-text fuel description onto the canonical fuel taxonomy by
/// substring search. Multiple dictionary hits on one string are disambiguated
/// by preferring the most specific (longest) key, so "blast furnace gas"
/// beats "gas" and "petroleum coke" beats "coal".
///
/// Returns `None` when nothing in the dictionary matches; callers decide
/// whether a downstream default (e.g. natural gas for CO2 denominators)
/// applies.
pub fn classify_fuel(config: &HarmonizerConfig, text: &str) -> Option<Fuel> {
    let haystack = text.to_ascii_lowercase();
    if haystack.trim().is_empty() {
        return None;
    }

    let mut best: Option<(&str, Fuel)> = None;
    for (key, fuel) in &config.fuel_dict {
        if !haystack.contains(key) {
            continue;
        }
        // Short keys like "ng" need a word boundary to avoid matching inside
        // unrelated words ("cleaning", "heating").
        if key.len() <= 3 && !has_word_boundary(&haystack, key) {
            continue;
        }
        match best {
            Some((best_key, _)) if best_key.len() >= key.len() => {}
            _ => best = Some((key, *fuel)),
        }
    }

    best.map(|(_, fuel)| fuel)
}

fn has_word_boundary(haystack: &str, needle: &str) -> bool {
    haystack.split(|c: char| !c.is_ascii_alphanumeric()).any(|w| w == needle)
}
