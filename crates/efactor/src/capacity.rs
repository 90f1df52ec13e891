use regex::Regex;

use cinder_core::Uom;

/// Recover a design capacity embedded in a free-text unit description, e.g.
/// "25 MMBtu/hr boiler", "two 10 MW turbines", "300 HP compressor engine".
/// Used only when the structured capacity field is empty.
pub fn capacity_from_text(text: &str) -> Option<(f64, Uom)> {
    // Number followed by a capacity unit suffix. The unit alternatives are
    // ordered longest-first so "mmbtu/hr" is not clipped to a shorter match.
    // Trailing \b keeps "MW" from matching inside "MWh".
    let pattern = Regex::new(
        r"(?i)(\d+(?:,\d{3})*(?:\.\d+)?)\s*(mmbtu\s*/\s*(?:hr|hour)|hp|mw|kw)\b",
    )
    .expect("static capacity pattern");

    let caps = pattern.captures(text)?;
    let value: f64 = caps[1].replace(',', "").parse().ok()?;
    let uom = match caps[2].to_ascii_lowercase().replace(' ', "").as_str() {
        "hp" => Uom::Hp,
        "mw" => Uom::Mw,
        "kw" => Uom::Kw,
        _ => Uom::MMBtuPerHr,
    };
    (value > 0.0).then_some((value, uom))
}
