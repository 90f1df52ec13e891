use std::collections::BTreeMap;

use serde::Serialize;

use cinder_core::{EstimateSource, Fuel, Pollutant, QuantileTriple, Uom, HOURS_PER_YEAR, TONNE_PER_LB};
use cinder_harmonize::{classify_fuel, HarmonizerConfig};

use crate::capacity::capacity_from_text;
use crate::outlier::{correct_outliers, iqr_fences};
use crate::record::{ActionVerb, NeiRecord, SecondaryTable};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Divergence ratio beyond which a secondary-factor estimate replaces the
/// reported-factor estimate (when the reported factor is also an outlier
/// against the secondary distribution).
const SUBSTITUTION_RATIO: f64 = 2.0;

/// Tunable policy knobs, loaded once per run.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Unit-level annual energy plausibility ceiling, MJ.
    pub max_unit_energy_mj: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            max_unit_energy_mj: crate::MAX_UNIT_ENERGY_MJ,
        }
    }
}

/// One collapsed unit-fuel estimate plus the raw fields downstream
/// harmonization and reconciliation need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfUnitEstimate {
    pub facility_id: String,
    pub unit_id: String,
    pub fuel: Fuel,
    /// The raw fuel hint the classification ran on, kept for the output
    /// table (empty when the inventory supplied none).
    pub fuel_type_raw: String,
    pub unit_type_raw: String,
    pub unit_description: String,
    pub scc: String,
    pub design_capacity: Option<f64>,
    pub design_capacity_uom: Option<Uom>,
    pub energy_mj: Option<QuantileTriple>,
    pub throughput_tonnes: Option<QuantileTriple>,
    pub ghg_tonnes_co2e: Option<QuantileTriple>,
    pub source: EstimateSource,
    pub provenance: String,
}

/// Branch accounting for the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EfStats {
    pub records_in: usize,
    pub records_unconvertible: usize,
    pub outliers_corrected: usize,
    pub secondary_substitutions: usize,
    pub ceiling_hits: usize,
    pub capacity_regenerated: usize,
    pub units_dropped: usize,
}

/// One record's contribution to the melt: a sorted-stable identity plus the
/// estimated quantities.
struct Sample {
    pollutant: Pollutant,
    provenance: String,
    energy_mj: Option<f64>,
    throughput_tonnes: Option<f64>,
    ghg_tonnes_co2e: Option<f64>,
}

/// Estimate throughput and energy for every unit-fuel in the pollutant
/// inventory, collapsing redundant per-record evidence into quantile triples.
pub fn estimate_units(
    config: &EstimatorConfig,
    harmonizer: &HarmonizerConfig,
    records: &[NeiRecord],
    secondary: &SecondaryTable,
) -> (Vec<EfUnitEstimate>, EfStats) {
    let mut stats = EfStats {
        records_in: records.len(),
        ..EfStats::default()
    };

    let fuels: Vec<Option<Fuel>> = records.iter().map(|r| resolve_fuel(harmonizer, r)).collect();
    let corrected = corrected_factors(records, &fuels, &mut stats);

    // Melt: one sample list per unit-fuel, plus the first-seen descriptive
    // fields for the unit.
    let mut melted: BTreeMap<(String, String, Fuel), Vec<Sample>> = BTreeMap::new();
    let mut descriptors: BTreeMap<(String, String, Fuel), &NeiRecord> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let pollutant = record.pollutant();
        let Some(emissions_lb) = reported_emissions_lb(record) else {
            stats.records_unconvertible += 1;
            continue;
        };

        let fuel = fuels[index];
        // CO2 with no resolvable fuel is assumed natural gas for unit
        // conversion only; the unit still files under `Other`.
        let conversion_fuel = fuel.or_else(|| (pollutant == Pollutant::Co2).then_some(Fuel::NaturalGas));
        let key_fuel = fuel.unwrap_or(Fuel::Other);

        let mut samples: Vec<Sample> = Vec::new();

        let primary = reported_estimate(record, emissions_lb, conversion_fuel);
        let secondary_est = secondary_estimate(record, pollutant, emissions_lb, conversion_fuel, secondary);

        // Reported-factor estimate, possibly replaced by the secondary when
        // the two diverge beyond 2x and the reported factor is an outlier
        // against the secondary-factor distribution.
        if let Some(primary) = &primary {
            let substituted = match &secondary_est {
                Some(sec) => {
                    diverges(primary.energy_mj, sec.energy_mj)
                        && reported_factor_is_secondary_outlier(record, pollutant, secondary)
                }
                None => false,
            };
            if substituted {
                stats.secondary_substitutions += 1;
                let sec = secondary_est.as_ref().expect("checked above");
                samples.push(Sample {
                    pollutant,
                    provenance: format!("{pollutant}/secondary_substituted"),
                    energy_mj: sec.energy_mj,
                    throughput_tonnes: sec.throughput_tonnes,
                    ghg_tonnes_co2e: None,
                });
            } else {
                samples.push(Sample {
                    pollutant,
                    provenance: format!("{pollutant}/reported_ef"),
                    energy_mj: primary.energy_mj,
                    throughput_tonnes: primary.throughput_tonnes,
                    ghg_tonnes_co2e: None,
                });
            }
        }

        // Outlier-corrected variant of the reported factor (original kept).
        if let Some(median_factor) = corrected.get(&index) {
            if let Some(est) = factor_estimate(
                emissions_lb,
                *median_factor,
                record.ef_numerator_uom,
                record.ef_denominator_uom,
                conversion_fuel,
                ActionVerb::Other,
            ) {
                samples.push(Sample {
                    pollutant,
                    provenance: format!("{pollutant}/corrected_ef"),
                    energy_mj: est.energy_mj,
                    throughput_tonnes: est.throughput_tonnes,
                    ghg_tonnes_co2e: None,
                });
            }
        }

        // Independent secondary estimate (kept alongside any substitution).
        if let Some(sec) = secondary_est {
            samples.push(Sample {
                pollutant,
                provenance: format!("{pollutant}/secondary_ef"),
                energy_mj: sec.energy_mj,
                throughput_tonnes: sec.throughput_tonnes,
                ghg_tonnes_co2e: None,
            });
        }

        // GHG evidence rides directly on the reported emissions.
        if let Some(gwp) = pollutant.gwp() {
            samples.push(Sample {
                pollutant,
                provenance: format!("{pollutant}/reported_emissions"),
                energy_mj: None,
                throughput_tonnes: None,
                ghg_tonnes_co2e: Some(emissions_lb * TONNE_PER_LB * gwp),
            });
        }

        if samples.is_empty() {
            stats.records_unconvertible += 1;
            continue;
        }

        let key = (record.facility_id.clone(), record.unit_id.clone(), key_fuel);
        melted.entry(key.clone()).or_default().extend(samples);
        descriptors.entry(key).or_insert(record);
    }

    let mut out = Vec::new();
    for (key, mut samples) in melted {
        let record = descriptors[&key];
        // Stable melt order: pollutant, then provenance. Quantiles are
        // value-sorted internally, so this fixes only tie-break behavior.
        samples.sort_by(|a, b| {
            (a.pollutant, a.provenance.as_str()).cmp(&(b.pollutant, b.provenance.as_str()))
        });

        let energy_samples: Vec<f64> = samples.iter().filter_map(|s| s.energy_mj).collect();
        let throughput_samples: Vec<f64> =
            samples.iter().filter_map(|s| s.throughput_tonnes).collect();
        let ghg_samples: Vec<f64> = samples.iter().filter_map(|s| s.ghg_tonnes_co2e).collect();

        let energy = QuantileTriple::from_samples(&energy_samples);
        let throughput = QuantileTriple::from_samples(&throughput_samples);
        let ghg = QuantileTriple::from_samples(&ghg_samples);

        let provenance: Vec<String> = dedup_provenance(&samples);

        let (facility_id, unit_id, fuel) = key;
        match energy {
            Some(energy) if energy.q2 <= config.max_unit_energy_mj => {
                out.push(EfUnitEstimate {
                    facility_id,
                    unit_id,
                    fuel,
                    fuel_type_raw: record.fuel_hint.clone().unwrap_or_default(),
                    unit_type_raw: record.unit_type_raw.clone(),
                    unit_description: record.unit_description.clone(),
                    scc: record.scc.clone(),
                    design_capacity: record.design_capacity,
                    design_capacity_uom: record.design_capacity_uom,
                    energy_mj: Some(energy),
                    throughput_tonnes: throughput,
                    ghg_tonnes_co2e: ghg,
                    source: EstimateSource::EmissionFactor,
                    provenance: provenance.join("+"),
                });
            }
            Some(implausible) => {
                stats.ceiling_hits += 1;
                log::warn!(
                    "unit {facility_id}/{unit_id} energy {:.3e} MJ exceeds ceiling, regenerating from capacity",
                    implausible.q2
                );
                if let Some(energy) = capacity_energy(record) {
                    stats.capacity_regenerated += 1;
                    out.push(EfUnitEstimate {
                        facility_id,
                        unit_id,
                        fuel,
                        fuel_type_raw: record.fuel_hint.clone().unwrap_or_default(),
                    unit_type_raw: record.unit_type_raw.clone(),
                        unit_description: record.unit_description.clone(),
                        scc: record.scc.clone(),
                        design_capacity: record.design_capacity,
                        design_capacity_uom: record.design_capacity_uom,
                        energy_mj: Some(QuantileTriple::scalar(energy)),
                        throughput_tonnes: None,
                        ghg_tonnes_co2e: ghg,
                        source: EstimateSource::Capacity,
                        provenance: "capacity/continuous_8760h".into(),
                    });
                } else {
                    stats.units_dropped += 1;
                }
            }
            None if throughput.is_some() => {
                out.push(EfUnitEstimate {
                    facility_id,
                    unit_id,
                    fuel,
                    fuel_type_raw: record.fuel_hint.clone().unwrap_or_default(),
                    unit_type_raw: record.unit_type_raw.clone(),
                    unit_description: record.unit_description.clone(),
                    scc: record.scc.clone(),
                    design_capacity: record.design_capacity,
                    design_capacity_uom: record.design_capacity_uom,
                    energy_mj: None,
                    throughput_tonnes: throughput,
                    ghg_tonnes_co2e: ghg,
                    source: EstimateSource::EmissionFactor,
                    provenance: provenance.join("+"),
                });
            }
            None => {
                stats.units_dropped += 1;
            }
        }
    }

    log::info!(
        "emission-factor estimator: {} records -> {} unit estimates ({} outliers corrected, {} ceiling hits)",
        stats.records_in,
        out.len(),
        stats.outliers_corrected,
        stats.ceiling_hits
    );
    (out, stats)
}

// ---------------------------------------------------------------------------
// Per-record math
// ---------------------------------------------------------------------------

struct RecordEstimate {
    energy_mj: Option<f64>,
    throughput_tonnes: Option<f64>,
}

/// Fuel resolution order: explicit hint, process description, unit
/// description.
fn resolve_fuel(harmonizer: &HarmonizerConfig, record: &NeiRecord) -> Option<Fuel> {
    record
        .fuel_hint
        .as_deref()
        .and_then(|text| classify_fuel(harmonizer, text))
        .or_else(|| classify_fuel(harmonizer, &record.process_description))
        .or_else(|| classify_fuel(harmonizer, &record.unit_description))
}

/// Reported emissions on the common pounds basis; `None` when absent,
/// non-positive, or in a unit with no mass conversion.
fn reported_emissions_lb(record: &NeiRecord) -> Option<f64> {
    let total = record.total_emissions?;
    let per = record.emissions_uom?.to_pounds()?;
    (total > 0.0).then(|| total * per)
}

fn reported_estimate(
    record: &NeiRecord,
    emissions_lb: f64,
    conversion_fuel: Option<Fuel>,
) -> Option<RecordEstimate> {
    factor_estimate(
        emissions_lb,
        record.emission_factor?,
        record.ef_numerator_uom,
        record.ef_denominator_uom,
        conversion_fuel,
        ActionVerb::Other,
    )
}

fn secondary_estimate(
    record: &NeiRecord,
    pollutant: Pollutant,
    emissions_lb: f64,
    conversion_fuel: Option<Fuel>,
    secondary: &SecondaryTable,
) -> Option<RecordEstimate> {
    let factor = secondary.lookup(&record.scc, pollutant).first()?;
    factor_estimate(
        emissions_lb,
        factor.factor,
        Some(factor.numerator_uom),
        Some(factor.denominator_uom),
        conversion_fuel,
        factor.action,
    )
}

/// Back-calculate the fuel/material input implied by `emissions / factor`,
/// then express it as energy (MJ) and, for non-burned material, throughput
/// (metric tons). `None` when the factor or a required conversion is absent:
/// an unconvertible record contributes no estimate, not a zero.
fn factor_estimate(
    emissions_lb: f64,
    factor: f64,
    numerator_uom: Option<Uom>,
    denominator_uom: Option<Uom>,
    conversion_fuel: Option<Fuel>,
    action: ActionVerb,
) -> Option<RecordEstimate> {
    let factor_lb = factor * numerator_uom?.to_pounds()?;
    if factor_lb <= 0.0 || emissions_lb <= 0.0 {
        return None;
    }
    let denominator = denominator_uom?;
    let quantity = emissions_lb / factor_lb;

    let energy_mj = denominator.to_mj(conversion_fuel).map(|mj| quantity * mj);
    let throughput_tonnes = if action == ActionVerb::Burned {
        None
    } else {
        denominator
            .to_pounds()
            .map(|lb| quantity * lb * TONNE_PER_LB)
    };

    if energy_mj.is_none() && throughput_tonnes.is_none() {
        return None;
    }
    Some(RecordEstimate {
        energy_mj,
        throughput_tonnes,
    })
}

fn diverges(primary: Option<f64>, secondary: Option<f64>) -> bool {
    match (primary, secondary) {
        (Some(p), Some(s)) if p > 0.0 && s > 0.0 => {
            let ratio = if p > s { p / s } else { s / p };
            ratio > SUBSTITUTION_RATIO
        }
        _ => false,
    }
}

/// Is the reported factor an outlier against the crowd-sourced factors for
/// the same (SCC, pollutant)? Requires comparable denominators and enough
/// secondary values for fences.
fn reported_factor_is_secondary_outlier(
    record: &NeiRecord,
    pollutant: Pollutant,
    secondary: &SecondaryTable,
) -> bool {
    let (Some(reported), Some(num_uom), Some(denom_uom)) = (
        record.emission_factor,
        record.ef_numerator_uom,
        record.ef_denominator_uom,
    ) else {
        return false;
    };
    let Some(reported_lb) = num_uom.to_pounds().map(|per| reported * per) else {
        return false;
    };

    let comparable: Vec<f64> = secondary
        .lookup(&record.scc, pollutant)
        .iter()
        .filter(|f| f.denominator_uom == denom_uom)
        .filter_map(|f| f.numerator_uom.to_pounds().map(|per| f.factor * per))
        .collect();

    match iqr_fences(&comparable) {
        Some(fences) => !fences.contains(reported_lb),
        None => false,
    }
}

/// Continuous full-capacity operation for a year, MJ.
fn capacity_energy(record: &NeiRecord) -> Option<f64> {
    let (value, uom) = match (record.design_capacity, record.design_capacity_uom) {
        (Some(value), Some(uom)) => (value, uom),
        _ => capacity_from_text(&record.unit_description)
            .or_else(|| capacity_from_text(&record.process_description))?,
    };
    let mw = value * uom.to_megawatts()?;
    Some(mw * HOURS_PER_YEAR * SECONDS_PER_HOUR)
}

fn dedup_provenance(samples: &[Sample]) -> Vec<String> {
    let mut seen = Vec::new();
    for sample in samples {
        if !seen.contains(&sample.provenance) {
            seen.push(sample.provenance.clone());
        }
    }
    seen
}

/// Group reported factors by (SCC, pollutant, fuel, denominator UOM) and
/// run IQR correction; returns record index -> replacement median factor.
fn corrected_factors(
    records: &[NeiRecord],
    fuels: &[Option<Fuel>],
    stats: &mut EfStats,
) -> BTreeMap<usize, f64> {
    let mut groups: BTreeMap<(String, Pollutant, Fuel, Uom), Vec<(usize, f64)>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        let (Some(factor), Some(denom)) = (record.emission_factor, record.ef_denominator_uom)
        else {
            continue;
        };
        let key = (
            record.scc.clone(),
            record.pollutant(),
            fuels[index].unwrap_or(Fuel::Other),
            denom,
        );
        groups.entry(key).or_default().push((index, factor));
    }

    let mut corrected = BTreeMap::new();
    for (_, members) in groups {
        let values: Vec<f64> = members.iter().map(|(_, v)| *v).collect();
        for fix in correct_outliers(&values) {
            stats.outliers_corrected += 1;
            corrected.insert(members[fix.index].0, fix.corrected);
        }
    }
    corrected
}
