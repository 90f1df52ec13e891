use cinder_core::Fuel;

use crate::record::GhgrpRecord;

/// Documented facility-specific reporting errors: (facility id, reporting
/// year, multiplier applied to every tier emissions field). These are
/// scale-factor mistakes (kg reported as tonnes and the like) confirmed
/// against the facilities' other reporting years.
const SCALE_FIXES: &[(&str, i32, f64)] = &[
    ("1004377", 2015, 1.0e-3),
    ("1007016", 2017, 1.0e-3),
    ("1001620", 2014, 1.0e3),
];

/// The kraft-pulping liquor CH4 factor was revised downward starting with
/// this reporting year; earlier years reported against the legacy factor.
const KRAFT_CH4_REVISION_YEAR: i32 = 2013;
const KRAFT_CH4_LEGACY_KG_PER_MMBTU: f64 = 2.5e-3;

/// Apply the known data-quality corrections to a record before calculation.
///
/// Scale fixes multiply every tier emissions field for the flagged
/// facility-years. The kraft-liquor revision rescales pre-revision CH4 so
/// all years back-calculate against the current factor.
pub fn apply_fixes(record: &GhgrpRecord, fuel: Fuel) -> GhgrpRecord {
    let mut fixed = record.clone();

    for (facility_id, year, factor) in SCALE_FIXES {
        if fixed.facility_id == *facility_id && fixed.reporting_year == *year {
            log::debug!(
                "scale fix {factor} applied to facility {facility_id} year {year}"
            );
            fixed.tier1_co2_tonnes = fixed.tier1_co2_tonnes.map(|v| v * factor);
            fixed.tier2_co2_tonnes = fixed.tier2_co2_tonnes.map(|v| v * factor);
            fixed.tier3_co2_tonnes = fixed.tier3_co2_tonnes.map(|v| v * factor);
            fixed.tier4_ch4_tonnes = fixed.tier4_ch4_tonnes.map(|v| v * factor);
        }
    }

    if fuel == Fuel::BlackLiquor && fixed.reporting_year < KRAFT_CH4_REVISION_YEAR {
        if let (Some(ch4), Some(current)) = (fixed.tier4_ch4_tonnes, fuel.ch4_kg_per_mmbtu()) {
            let corrected = ch4 * current / KRAFT_CH4_LEGACY_KG_PER_MMBTU;
            log::debug!(
                "kraft liquor CH4 revision applied to facility {} year {}: {ch4} -> {corrected}",
                fixed.facility_id,
                fixed.reporting_year
            );
            fixed.tier4_ch4_tonnes = Some(corrected);
        }
    }

    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(facility: &str, year: i32) -> GhgrpRecord {
        GhgrpRecord {
            facility_id: facility.into(),
            reporting_year: year,
            unit_name: "u1".into(),
            tier1_co2_tonnes: Some(1000.0),
            tier2_co2_tonnes: None,
            tier3_co2_tonnes: None,
            tier4_ch4_tonnes: None,
            fuel_type: Some("natural gas".into()),
            fuel_type_other: None,
            fuel_blend: None,
            annual_heat_input_mmbtu: None,
            fuel_quantity: None,
            fuel_quantity_uom: None,
            measured_hhv_mmbtu: None,
        }
    }

    #[test]
    fn scale_fix_hits_only_flagged_facility_year() {
        let fixed = apply_fixes(&record("1004377", 2015), Fuel::NaturalGas);
        assert_eq!(fixed.tier1_co2_tonnes, Some(1.0));

        let untouched = apply_fixes(&record("1004377", 2016), Fuel::NaturalGas);
        assert_eq!(untouched.tier1_co2_tonnes, Some(1000.0));

        let other = apply_fixes(&record("9999999", 2015), Fuel::NaturalGas);
        assert_eq!(other.tier1_co2_tonnes, Some(1000.0));
    }

    #[test]
    fn kraft_revision_rescales_pre_revision_ch4() {
        let mut rec = record("123", 2011);
        rec.tier1_co2_tonnes = None;
        rec.tier4_ch4_tonnes = Some(10.0);

        let fixed = apply_fixes(&rec, Fuel::BlackLiquor);
        let expected = 10.0 * 1.96e-3 / 2.5e-3;
        assert!((fixed.tier4_ch4_tonnes.unwrap() - expected).abs() < 1e-12);

        // Post-revision years are untouched.
        rec.reporting_year = 2014;
        let fixed = apply_fixes(&rec, Fuel::BlackLiquor);
        assert_eq!(fixed.tier4_ch4_tonnes, Some(10.0));
    }

    #[test]
    fn kraft_revision_only_applies_to_liquor() {
        let mut rec = record("123", 2011);
        rec.tier4_ch4_tonnes = Some(10.0);
        let fixed = apply_fixes(&rec, Fuel::Wood);
        assert_eq!(fixed.tier4_ch4_tonnes, Some(10.0));
    }
}
