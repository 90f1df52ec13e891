use cinder_core::UnitKind;

use crate::config::HarmonizerConfig;

/// Classify a free-text unit type or description against the keyword table.
///
/// Zero matches resolve to `Other`. Exactly one matched kind resolves to that
/// kind. More than one matched kind is ambiguous and resolves to
/// `OtherCombustion`, except that an engine/reciprocating synonym always wins
/// outright; "reciprocating compressor engine" is an engine, not an unknown.
pub fn classify_unit_type(config: &HarmonizerConfig, text: &str) -> UnitKind {
    if text.trim().is_empty() {
        return UnitKind::Other;
    }

    let mut matched: Vec<UnitKind> = Vec::new();
    for (pattern, kind) in &config.unit_patterns {
        if pattern.is_match(text) && !matched.contains(kind) {
            matched.push(*kind);
        }
    }

    match matched.len() {
        0 => UnitKind::Other,
        1 => matched[0],
        _ => {
            if config.engine_pattern.is_match(text) {
                UnitKind::Engine
            } else {
                UnitKind::OtherCombustion
            }
        }
    }
}
