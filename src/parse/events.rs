//! Decoded events and per-measure accumulation state

use crate::models::attributes::{Accidental, BarRendition, Duration, PitchName};
use crate::models::score::{Clef, KeySig, MeterSig};

/// Octave used until the first octave mark
pub const BASE_OCTAVE: i8 = 4;

/// Octave range of the score tree
pub const MIN_OCTAVE: i8 = 0;
pub const MAX_OCTAVE: i8 = 9;

/// Beam boundary carried by a note event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeamMark {
    #[default]
    None,
    /// First note after `{`
    Initial,
    /// Last note before `}`
    Terminal,
}

/// One decoded musical event (note or rest)
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// `None` for a rest
    pub pitch: Option<PitchName>,
    pub octave: i8,
    pub duration: Duration,
    pub dots: u8,
    pub accidental: Option<Accidental>,
    pub tie: bool,
    pub fermata: bool,
    pub trill: bool,
    pub acciaccatura: bool,
    /// Number of appoggiaturas still to come, this note included
    pub appoggiatura: u32,
    pub chord: bool,
    pub beam: BeamMark,
    /// Size of the tuplet; only set on its first note
    pub tuplet_notes: u32,
    /// Countdown inside a tuplet: `tuplet_notes` on the first note, 1 on the last
    pub tuplet_note: u32,
    pub clef: Option<Clef>,
    pub meter: Option<MeterSig>,
    pub key: Option<KeySig>,
    /// Byte offset of the pitch letter in the incipit
    pub col: usize,
}

impl Default for NoteEvent {
    fn default() -> Self {
        Self {
            pitch: None,
            octave: BASE_OCTAVE,
            duration: Duration::Quarter,
            dots: 0,
            accidental: None,
            tie: false,
            fermata: false,
            trill: false,
            acciaccatura: false,
            appoggiatura: 0,
            chord: false,
            beam: BeamMark::None,
            tuplet_notes: 0,
            tuplet_note: 0,
            clef: None,
            meter: None,
            key: None,
            col: 0,
        }
    }
}

impl NoteEvent {
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    /// Fresh event to decode after this one was appended to its measure
    ///
    /// Only the octave and the tuplet and appoggiatura countdowns carry over.
    pub fn successor(&self) -> NoteEvent {
        NoteEvent {
            octave: self.octave,
            tuplet_note: self.tuplet_note.saturating_sub(1),
            appoggiatura: self.appoggiatura.saturating_sub(1),
            ..NoteEvent::default()
        }
    }

    /// True for the first note of a counted tuplet
    pub fn opens_tuplet(&self) -> bool {
        self.tuplet_note > 0 && self.tuplet_note == self.tuplet_notes
    }

    /// True for the last note of a counted tuplet
    pub fn closes_tuplet(&self) -> bool {
        self.tuplet_note == 1
    }
}

/// Round-robin list of durations declared by the last duration token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationCycle {
    entries: Vec<(Duration, u8)>,
    offset: usize,
}

impl DurationCycle {
    /// Replace the list and restart the cycle
    pub fn declare(&mut self, entries: Vec<(Duration, u8)>) {
        self.entries = entries;
        self.offset = 0;
    }

    /// Duration for the next note, without advancing
    pub fn current(&self) -> Option<(Duration, u8)> {
        self.entries.get(self.offset).copied()
    }

    /// Move to the next entry, wrapping around
    pub fn advance(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.offset += 1;
        if self.offset >= self.entries.len() {
            self.offset = 0;
        }
    }
}

/// Events and pending changes of the measure being decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureState {
    pub events: Vec<NoteEvent>,
    /// Survives [`MeasureState::reset`]: a declared duration list applies
    /// across bar lines until the next duration token
    pub durations: DurationCycle,
    pub clef: Option<Clef>,
    pub meter: Option<MeterSig>,
    pub key: Option<KeySig>,
    pub bar: BarRendition,
    /// Event index where an open `!` abbreviation block started
    pub abbreviation_start: Option<usize>,
    /// Number of whole-measure rests
    pub whole_rest: u32,
}

impl MeasureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything but the duration cycle
    pub fn reset(&mut self) {
        self.events.clear();
        self.clef = None;
        self.meter = None;
        self.key = None;
        self.bar = BarRendition::None;
        self.abbreviation_start = None;
        self.whole_rest = 0;
    }

    /// Whether the measure has content worth flushing at end of input
    pub fn has_content(&self) -> bool {
        !self.events.is_empty() || self.whole_rest > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_keeps_only_carry_over_fields() {
        let event = NoteEvent {
            pitch: Some(PitchName::A),
            octave: 6,
            duration: Duration::Half,
            dots: 1,
            accidental: Some(Accidental::Sharp),
            tie: true,
            fermata: true,
            trill: true,
            acciaccatura: true,
            appoggiatura: 3,
            chord: true,
            beam: BeamMark::Initial,
            tuplet_notes: 3,
            tuplet_note: 3,
            clef: Some(Clef::default()),
            ..NoteEvent::default()
        };

        let next = event.successor();
        assert_eq!(next.octave, 6);
        assert_eq!(next.tuplet_note, 2);
        assert_eq!(next.tuplet_notes, 0);
        assert_eq!(next.appoggiatura, 2);
        assert!(next.pitch.is_none());
        assert!(!next.tie && !next.fermata && !next.trill && !next.chord && !next.acciaccatura);
        assert_eq!(next.beam, BeamMark::None);
        assert!(next.accidental.is_none());
        assert!(next.clef.is_none());
    }

    #[test]
    fn test_duration_cycle_wraps() {
        let mut cycle = DurationCycle::default();
        assert_eq!(cycle.current(), None);
        cycle.advance();
        assert_eq!(cycle.current(), None);

        cycle.declare(vec![(Duration::Quarter, 1), (Duration::Eighth, 0)]);
        assert_eq!(cycle.current(), Some((Duration::Quarter, 1)));
        cycle.advance();
        assert_eq!(cycle.current(), Some((Duration::Eighth, 0)));
        cycle.advance();
        assert_eq!(cycle.current(), Some((Duration::Quarter, 1)));
    }

    #[test]
    fn test_measure_reset_keeps_durations() {
        let mut measure = MeasureState::new();
        measure.durations.declare(vec![(Duration::Half, 0)]);
        measure.events.push(NoteEvent::default());
        measure.whole_rest = 2;
        measure.abbreviation_start = Some(0);
        measure.bar = BarRendition::Dbl;

        measure.reset();
        assert!(!measure.has_content());
        assert_eq!(measure.bar, BarRendition::None);
        assert_eq!(measure.abbreviation_start, None);
        assert_eq!(measure.durations.current(), Some((Duration::Half, 0)));
    }
}
