//! Tokenized measures → score tree
//!
//! Wraps each measure into Measure → Staff → Layer, inserts a score
//! definition change ahead of any measure that starts with a new key or
//! meter, and records the defaults in force at the start of the incipit.

use crate::import::ImportSettings;
use crate::diagnostics::Diagnostics;
use crate::models::score::{
    Clef, KeySig, Measure, MeterSig, Score, ScoreDef, ScoreDefChange, ScoreMeta, Section, SectionItem, Staff,
    StaffDef, StaffGrp,
};
use crate::parse::incipit::ParsedIncipit;

use super::layer_builder::LayerBuilder;

/// Clef, key and meter in force before the first measure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreDefaults {
    pub clef: Option<Clef>,
    pub key_sig: Option<KeySig>,
    pub meter_sig: Option<MeterSig>,
}

/// Assemble the score for one tokenized incipit
pub fn build_score(
    parsed: &ParsedIncipit,
    defaults: ScoreDefaults,
    meta: ScoreMeta,
    settings: &ImportSettings,
    diags: &mut Diagnostics,
) -> Score {
    let mut section = Section::default();
    let mut layers = LayerBuilder::new(diags);

    for (index, measure) in parsed.measures.iter().enumerate() {
        if measure.key.is_some() || measure.meter.is_some() {
            section.items.push(SectionItem::ScoreDef(ScoreDefChange {
                key_sig: measure.key.clone(),
                meter_sig: measure.meter.clone(),
            }));
        }

        let layer = layers.build_layer(measure, settings.layer_n);
        section.items.push(SectionItem::Measure(Measure {
            n: settings.first_measure_n + index as u32,
            right: measure.bar,
            staff: Staff {
                n: settings.staff_n,
                layer,
            },
        }));
    }

    log::debug!(
        "assembled {} measure(s) from {} section item(s)",
        parsed.measures.len(),
        section.items.len()
    );

    let clef = parsed.default_clef.clone().or(defaults.clef);
    Score {
        meta,
        score_def: ScoreDef {
            staff_grp: StaffGrp {
                staff_defs: vec![StaffDef {
                    n: settings.staff_n,
                    lines: settings.staff_lines,
                    clef,
                }],
            },
            key_sig: defaults.key_sig,
            meter_sig: defaults.meter_sig,
        },
        section,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attributes::BarRendition;
    use crate::parse::incipit::parse_incipit;

    fn score_for(incipit: &str) -> Score {
        let mut diags = Diagnostics::new();
        let parsed = parse_incipit(incipit, Some(Clef::default()), &mut diags);
        build_score(
            &parsed,
            ScoreDefaults::default(),
            ScoreMeta::default(),
            &ImportSettings::default(),
            &mut diags,
        )
    }

    #[test]
    fn test_measures_are_numbered_with_barlines() {
        let score = score_for("4AB/CD://EF");
        let measures: Vec<(u32, BarRendition)> = score.measures().map(|m| (m.n, m.right)).collect();
        assert_eq!(
            measures,
            vec![(1, BarRendition::Single), (2, BarRendition::RptEnd), (3, BarRendition::None)]
        );
    }

    #[test]
    fn test_score_def_change_before_new_meter() {
        let score = score_for("4AB/@3/4CDE/$xF G");
        assert!(matches!(score.section.items[0], SectionItem::Measure(_)));
        let SectionItem::ScoreDef(change) = &score.section.items[1] else {
            panic!("Expected score def before second measure");
        };
        assert_eq!(change.meter_sig.as_ref().and_then(|m| m.unit), Some(4));
        assert!(change.key_sig.is_none());
        assert!(matches!(score.section.items[3], SectionItem::ScoreDef(_)));
        assert_eq!(score.measure_count(), 3);
    }

    #[test]
    fn test_staff_def_defaults() {
        let score = score_for("4C");
        let staff_def = &score.score_def.staff_grp.staff_defs[0];
        assert_eq!((staff_def.n, staff_def.lines), (1, 5));
        assert_eq!(staff_def.clef, Some(Clef::default()));
    }
}
