//! Incipit tokenizer
//!
//! A single left-to-right scan over the `@data` string. Each byte selects
//! one decoder from [`super::tokens`]; the scan then advances past what the
//! decoder consumed. Bar lines close the current measure, and a trailing
//! measure without a bar line is flushed at the end.

use crate::diagnostics::Diagnostics;
use crate::models::score::Clef;

use super::events::{BeamMark, MeasureState, NoteEvent};
use super::tokens::{
    decode_abbreviation, decode_accidental, decode_barline, decode_clef, decode_durations, decode_grace,
    decode_group_end, decode_key, decode_note, decode_octave, decode_time, decode_tuplet_fermata,
    decode_whole_rest,
};

/// Output of the tokenizer: measures in order plus the staff clef
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedIncipit {
    pub measures: Vec<MeasureState>,
    /// Header clef, or the first inline clef when the header had none
    pub default_clef: Option<Clef>,
}

/// Scan state threaded through the decoders
pub struct IncipitParser<'a> {
    src: &'a [u8],
    diags: &'a mut Diagnostics,
    /// Event being decoded; completed by the next pitch or rest
    note: NoteEvent,
    measure: MeasureState,
    beam_depth: u32,
    measures: Vec<MeasureState>,
    default_clef: Option<Clef>,
}

impl<'a> IncipitParser<'a> {
    pub fn new(incipit: &'a str, default_clef: Option<Clef>, diags: &'a mut Diagnostics) -> Self {
        Self {
            src: incipit.as_bytes(),
            diags,
            note: NoteEvent::default(),
            measure: MeasureState::new(),
            beam_depth: 0,
            measures: Vec::new(),
            default_clef,
        }
    }

    pub fn parse(mut self) -> ParsedIncipit {
        let mut i = 0;
        while i < self.src.len() {
            if self.src[i].is_ascii_whitespace() {
                i += 1;
                continue;
            }
            i += 1 + self.step(i);
        }

        if self.measure.has_content() {
            self.measures.push(std::mem::take(&mut self.measure));
        }
        if self.beam_depth > 0 {
            log::debug!("incipit ended with {} open beam(s)", self.beam_depth);
        }

        ParsedIncipit {
            measures: self.measures,
            default_clef: self.default_clef,
        }
    }

    /// Dispatch the token at `i`; returns the extra bytes consumed
    fn step(&mut self, i: usize) -> usize {
        let src = self.src;
        let has_next = i + 1 < src.len();
        match src[i] {
            b'\'' | b',' => {
                let (octave, extra) = decode_octave(src, i);
                self.note.octave = octave;
                extra
            }
            b'0'..=b'9' => {
                let (entries, extra) = decode_durations(src, i, self.diags);
                self.measure.durations.declare(entries);
                extra
            }
            b'n' | b'x' | b'b' => {
                let (accidental, extra) = decode_accidental(src, i);
                self.note.accidental = accidental;
                extra
            }
            b'{' => {
                self.note.beam = BeamMark::Initial;
                self.beam_depth += 1;
                0
            }
            b'}' => {
                if self.beam_depth > 0 {
                    self.close_beam(i);
                }
                0
            }
            b'(' => decode_tuplet_fermata(src, i, &mut self.note, self.diags),
            b';' | b')' => decode_group_end(src, i, &mut self.note),
            b'g' | b'q' => decode_grace(src, i, &mut self.note),
            b'r' => {
                // end of an appoggiatura run
                self.note.appoggiatura = 0;
                0
            }
            b'A'..=b'G' | b'-' => decode_note(src, i, &mut self.note, &mut self.measure, self.diags),
            b'=' => {
                let (count, extra) = decode_whole_rest(src, i);
                self.measure.whole_rest = count;
                extra
            }
            b'!' => decode_abbreviation(src, i, &mut self.measure),
            b'i' => {
                self.repeat_previous_measure();
                0
            }
            b':' | b'/' => {
                let (bar, extra) = decode_barline(src, i);
                self.measure.bar = bar;
                self.measure.abbreviation_start = None;
                self.flush_measure();
                extra
            }
            b'%' if has_next => {
                let (clef, extra) = decode_clef(src, i + 1, self.diags);
                if self.default_clef.is_none() {
                    self.default_clef = Some(clef);
                } else if self.measure.events.is_empty() {
                    self.measure.clef = Some(clef);
                } else {
                    self.note.clef = Some(clef);
                }
                extra
            }
            b'@' if has_next => {
                let (meter, extra) = decode_time(src, i + 1, self.diags);
                if let Some(meter) = meter {
                    if self.measure.events.is_empty() {
                        self.measure.meter = Some(meter);
                    } else {
                        self.note.meter = Some(meter);
                    }
                }
                extra
            }
            b'$' if has_next => {
                let (key, extra) = decode_key(src, i + 1);
                if extra == 0 {
                    self.diags.warn(i, "empty_key_signature", "Key signature change without content");
                } else if self.measure.events.is_empty() {
                    self.measure.key = Some(key);
                } else {
                    self.note.key = Some(key);
                }
                extra
            }
            // slurs, trills and chord marks are picked up by the note look-ahead
            _ => 0,
        }
    }

    fn close_beam(&mut self, i: usize) {
        match self.measure.events.last_mut() {
            Some(last) => last.beam = BeamMark::Terminal,
            None => self
                .diags
                .error(i, "beam_end_without_note", "Beam end with no note in the current measure"),
        }
        self.note.beam = BeamMark::None;
        self.beam_depth -= 1;
    }

    /// `i` copies the previous measure's content into the current one
    fn repeat_previous_measure(&mut self) {
        if let Some(previous) = self.measures.last() {
            self.measure.events = previous.events.clone();
            self.measure.whole_rest = previous.whole_rest;
        }
    }

    fn flush_measure(&mut self) {
        self.measures.push(self.measure.clone());
        self.measure.reset();
    }
}

/// Tokenize one incipit string
pub fn parse_incipit(incipit: &str, default_clef: Option<Clef>, diags: &mut Diagnostics) -> ParsedIncipit {
    IncipitParser::new(incipit, default_clef, diags).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attributes::{Accidental, BarRendition, ClefShape, Duration, PitchName};

    fn parse(incipit: &str) -> (ParsedIncipit, Diagnostics) {
        let mut diags = Diagnostics::new();
        let parsed = parse_incipit(incipit, Some(Clef::default()), &mut diags);
        (parsed, diags)
    }

    #[test]
    fn test_measures_split_on_barlines() {
        let (parsed, _) = parse("4ABC/DEF//:G/");
        assert_eq!(parsed.measures.len(), 3);
        assert_eq!(parsed.measures[0].bar, BarRendition::Single);
        assert_eq!(parsed.measures[1].bar, BarRendition::RptStart);
        assert_eq!(parsed.measures[2].events.len(), 1);
    }

    #[test]
    fn test_trailing_measure_flushed() {
        let (parsed, _) = parse("4AB/CD");
        assert_eq!(parsed.measures.len(), 2);
        assert_eq!(parsed.measures[1].bar, BarRendition::None);
    }

    #[test]
    fn test_duration_cycle_spans_notes_and_barlines() {
        let (parsed, diags) = parse("4.58ABC/D");
        let first = &parsed.measures[0].events;
        assert_eq!((first[0].duration, first[0].dots), (Duration::Quarter, 1));
        assert_eq!((first[1].duration, first[1].dots), (Duration::SixtyFourth, 0));
        assert_eq!((first[2].duration, first[2].dots), (Duration::Eighth, 0));
        let second = &parsed.measures[1].events;
        assert_eq!((second[0].duration, second[0].dots), (Duration::Quarter, 1));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_octave_persists_and_accidental_does_not() {
        let (parsed, _) = parse("''4xCD,E");
        let events = &parsed.measures[0].events;
        assert_eq!(events[0].octave, 5);
        assert!(events[0].accidental.is_some());
        assert_eq!(events[1].octave, 5);
        assert!(events[1].accidental.is_none());
        assert_eq!(events[2].octave, 3);
        assert_eq!(events[2].pitch, Some(PitchName::E));
    }

    #[test]
    fn test_beam_marks() {
        let (parsed, _) = parse("8{ABC}D");
        let beams: Vec<BeamMark> = parsed.measures[0].events.iter().map(|e| e.beam).collect();
        assert_eq!(
            beams,
            vec![BeamMark::Initial, BeamMark::None, BeamMark::Terminal, BeamMark::None]
        );
    }

    #[test]
    fn test_beam_end_in_empty_measure_reported() {
        let (parsed, diags) = parse("8{AB/}C");
        assert!(diags.has_kind("beam_end_without_note"));
        assert_eq!(parsed.measures.len(), 2);
    }

    #[test]
    fn test_tuplet_countdown() {
        let (parsed, _) = parse("(8ABC)D");
        let counts: Vec<(u32, u32)> = parsed.measures[0]
            .events
            .iter()
            .map(|e| (e.tuplet_notes, e.tuplet_note))
            .collect();
        assert_eq!(counts, vec![(3, 3), (0, 2), (0, 1), (0, 0)]);
    }

    #[test]
    fn test_long_form_tuplet_count_not_read_as_duration() {
        let (parsed, _) = parse("8(6ABCDE;5)F");
        let events = &parsed.measures[0].events;
        assert_eq!(events[0].tuplet_notes, 5);
        assert_eq!(events[5].duration, Duration::Sixteenth);
    }

    #[test]
    fn test_appoggiatura_run() {
        let (parsed, _) = parse("8qqABr4C");
        let grace: Vec<u32> = parsed.measures[0].events.iter().map(|e| e.appoggiatura).collect();
        assert_eq!(grace, vec![3, 2, 0]);
    }

    #[test]
    fn test_abbreviation_replay() {
        let (parsed, _) = parse("4!AB!f");
        let pitches: Vec<Option<PitchName>> = parsed.measures[0].events.iter().map(|e| e.pitch).collect();
        assert_eq!(
            pitches,
            vec![Some(PitchName::A), Some(PitchName::B), Some(PitchName::A), Some(PitchName::B)]
        );

        let (parsed, _) = parse("4C!AB!ff");
        assert_eq!(parsed.measures[0].events.len(), 7);
    }

    #[test]
    fn test_whole_rest_and_measure_repeat() {
        let (parsed, _) = parse("=3/4AB/i/");
        assert_eq!(parsed.measures.len(), 3);
        assert_eq!(parsed.measures[0].whole_rest, 3);
        assert!(parsed.measures[0].events.is_empty());
        assert_eq!(parsed.measures[2].events, parsed.measures[1].events);
    }

    #[test]
    fn test_measure_repeat_without_previous_measure_is_ignored() {
        let (parsed, diags) = parse("i4AB/");
        assert_eq!(parsed.measures.len(), 1);
        assert_eq!(parsed.measures[0].events.len(), 2);
        assert_eq!(parsed.measures[0].whole_rest, 0);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_empty_key_change_is_reported_and_skipped() {
        let (parsed, diags) = parse("4A$ B/");
        assert_eq!(diags.count_kind("empty_key_signature"), 1);
        assert!(parsed.measures[0].key.is_none());
        assert!(parsed.measures[0].events.iter().all(|e| e.key.is_none()));
        assert_eq!(parsed.measures[0].events.len(), 2);
    }

    #[test]
    fn test_inline_changes_attach_to_measure_or_note() {
        let (parsed, _) = parse("4AB/@3/4$bB%F-4CD%C-3E");
        let second = &parsed.measures[1];
        assert_eq!(second.meter.as_ref().and_then(|m| m.count), Some(3));
        assert_eq!(second.key.as_ref().map(|k| (k.accid, k.count)), Some((Some(Accidental::Flat), 1)));
        assert_eq!(second.clef.as_ref().and_then(|c| c.shape), Some(ClefShape::F));
        assert!(second.events[0].clef.is_none());
        let clef = second.events[2].clef.as_ref().expect("clef on E");
        assert_eq!((clef.shape, clef.line), (Some(ClefShape::C), 3));
    }

    #[test]
    fn test_first_inline_clef_becomes_default() {
        let mut diags = Diagnostics::new();
        let parsed = parse_incipit("%C-1 4AB", None, &mut diags);
        let clef = parsed.default_clef.expect("default clef");
        assert_eq!((clef.shape, clef.line), (Some(ClefShape::C), 1));
        assert!(parsed.measures[0].clef.is_none());
    }

    #[test]
    fn test_whitespace_is_skipped() {
        let (parsed, diags) = parse(" 4A B  C / D ");
        assert_eq!(parsed.measures.len(), 2);
        assert_eq!(parsed.measures[0].events.len(), 3);
        assert!(diags.is_empty());
    }
}
