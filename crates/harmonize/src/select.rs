use cinder_core::UnitKind;

/// The three independent classifications of one unit: the source's own unit
/// type field, the classification-code derivation, and the regex match over
/// the free-text description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidates {
    pub source: UnitKind,
    pub scc: UnitKind,
    pub description: UnitKind,
}

/// One row of the selection table: a named predicate and the pick it makes
/// when it fires. Rows are evaluated top to bottom; the first hit wins.
type Rule = (&'static str, fn(&Candidates) -> Option<UnitKind>);

/// Free text is the most specific signal but also the noisiest, so a
/// description match is trusted whenever it is itself unambiguous; after
/// that the structured vocabularies are preferred over the fallback buckets,
/// and the final tie-break order is description, source, code.
const RULES: &[Rule] = &[
    ("specific description wins", |c| {
        c.description.is_specific().then_some(c.description)
    }),
    ("only source is specific", |c| {
        (c.source.is_specific() && !c.scc.is_specific()).then_some(c.source)
    }),
    ("only code is specific", |c| {
        (c.scc.is_specific() && !c.source.is_specific()).then_some(c.scc)
    }),
    ("source and code agree", |c| {
        (c.source.is_specific() && c.source == c.scc).then_some(c.source)
    }),
    ("source and code disagree", |c| {
        (c.source.is_specific() && c.scc.is_specific()).then_some(c.source)
    }),
    ("fallback: description", |c| {
        (c.description != UnitKind::Other).then_some(c.description)
    }),
    ("fallback: source", |c| {
        (c.source != UnitKind::Other).then_some(c.source)
    }),
    ("fallback: code", |c| {
        (c.scc != UnitKind::Other).then_some(c.scc)
    }),
];

/// Resolve the three vocabularies to one canonical unit type by walking the
/// selection table. Total: falls through to `Other` when every candidate is
/// `Other`.
pub fn select_unit_type(candidates: &Candidates) -> UnitKind {
    RULES
        .iter()
        .find_map(|(_, rule)| rule(candidates))
        .unwrap_or(UnitKind::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(source: UnitKind, scc: UnitKind, description: UnitKind) -> UnitKind {
        select_unit_type(&Candidates {
            source,
            scc,
            description,
        })
    }

    use UnitKind::{Boiler, Engine, Kiln, Other, OtherCombustion, Turbine};

    #[test]
    fn specific_description_beats_agreement() {
        assert_eq!(pick(Boiler, Boiler, Kiln), Kiln);
    }

    #[test]
    fn description_wins_when_others_are_other() {
        assert_eq!(pick(Other, Other, Engine), Engine);
    }

    #[test]
    fn structured_vocabularies_fill_in_for_vague_description() {
        assert_eq!(pick(Turbine, Other, Other), Turbine);
        assert_eq!(pick(Other, Boiler, OtherCombustion), Boiler);
    }

    #[test]
    fn agreement_of_source_and_code() {
        assert_eq!(pick(Boiler, Boiler, Other), Boiler);
    }

    #[test]
    fn disagreement_prefers_source() {
        assert_eq!(pick(Boiler, Turbine, Other), Boiler);
    }

    #[test]
    fn ambiguous_description_is_last_resort() {
        assert_eq!(pick(Other, Other, OtherCombustion), OtherCombustion);
        assert_eq!(pick(Other, Other, Other), Other);
    }
}
