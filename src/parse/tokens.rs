//! Token decoders
//!
//! Each decoder starts at `index` (the byte that selected it) and returns
//! how many bytes it consumed beyond that one, so the driver advances by
//! `1 + extra`. Decoders never fail: anomalies are reported to
//! [`Diagnostics`] and a best-effort value is produced.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::diagnostics::{DiagnosticMark, DiagnosticSeverity, Diagnostics};
use crate::models::attributes::{Accidental, BarRendition, ClefShape, Duration, MeterSign, PitchName, Place};
use crate::models::score::{Clef, KeySig, MeterSig};

use super::events::{MeasureState, NoteEvent, BASE_OCTAVE, MAX_OCTAVE, MIN_OCTAVE};

// Look-ahead patterns applied right after a pitch letter. They are byte
// oriented so a stray non-ASCII byte never breaks the scan.
static TRILL_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^[^A-G]*t").expect("valid regex"));
static TIE_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^[A-G]*\+").expect("valid regex"));
static CHORD_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^[^A-G]*\^").expect("valid regex"));

/// At least two pitches or rests before the group closes
static TUPLET_AHEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^[^);]*[A-G\-][^);]*[A-G\-]").expect("valid regex"));

// Meter tokens are decoded to text first
static METER_FRACTION: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^(\d+)/(\d+)$").expect("valid regex"));
static METER_COUNT: Lazy<regex::Regex> = Lazy::new(|| regex::Regex::new(r"^\d+$").expect("valid regex"));

fn byte_at(src: &[u8], index: usize) -> Option<u8> {
    src.get(index).copied()
}

pub fn is_pitch_letter(c: u8) -> bool {
    (b'A'..=b'G').contains(&c)
}

// ============================================================================
// OCTAVE, DURATION, ACCIDENTAL
// ============================================================================

/// `'` marks start at octave 4 and raise by one per extra mark;
/// `,` marks start at octave 3 and lower by one per extra mark
///
/// The result is clamped to `MIN_OCTAVE..=MAX_OCTAVE`; the whole run is
/// still consumed.
pub fn decode_octave(src: &[u8], index: usize) -> (i8, usize) {
    let Some(mark) = byte_at(src, index) else {
        return (BASE_OCTAVE, 0);
    };
    let run = src[index + 1..].iter().take_while(|&&c| c == mark).count();
    let steps = i8::try_from(run).unwrap_or(i8::MAX);
    let octave = match mark {
        b',' => (BASE_OCTAVE - 1).saturating_sub(steps),
        _ => BASE_OCTAVE.saturating_add(steps),
    };
    (octave.clamp(MIN_OCTAVE, MAX_OCTAVE), run)
}

/// One duration digit followed by up to two dots
pub fn decode_duration(src: &[u8], index: usize, diags: &mut Diagnostics) -> ((Duration, u8), usize) {
    let mut duration = byte_at(src, index)
        .and_then(Duration::from_pae_digit)
        .unwrap_or(Duration::Quarter);

    let mut dots = 0u8;
    let mut i = index;
    while dots < 2 && byte_at(src, i + 1) == Some(b'.') {
        dots += 1;
        i += 1;
    }

    if dots == 1 && duration == Duration::OneHundredTwentyEighth {
        // `7.` is the neumatic-notation convention, not a dotted 128th
        duration = Duration::Breve;
        dots = 0;
        diags.warn(
            index,
            "neumatic_duration",
            "Found a note in neumatic notation (7.), using breve instead",
        );
    }

    ((duration, dots), i - index)
}

/// A run of durations such as `4.58`, declaring the duration cycle
pub fn decode_durations(src: &[u8], index: usize, diags: &mut Diagnostics) -> (Vec<(Duration, u8)>, usize) {
    let mut entries = Vec::new();
    let mut i = index;
    loop {
        let (entry, extra) = decode_duration(src, i, diags);
        entries.push(entry);
        i += extra;
        match byte_at(src, i + 1) {
            Some(c) if c.is_ascii_digit() => i += 1,
            _ => break,
        }
    }
    (entries, i - index)
}

/// `n`, `x`, `xx`, `b`, `bb`
pub fn decode_accidental(src: &[u8], index: usize) -> (Option<Accidental>, usize) {
    let doubled = byte_at(src, index + 1) == byte_at(src, index);
    match byte_at(src, index) {
        Some(b'n') => (Some(Accidental::Natural), 0),
        Some(b'x') if doubled => (Some(Accidental::DoubleSharp), 1),
        Some(b'x') => (Some(Accidental::Sharp), 0),
        Some(b'b') if doubled => (Some(Accidental::DoubleFlat), 1),
        Some(b'b') => (Some(Accidental::Flat), 0),
        _ => (None, 0),
    }
}

// ============================================================================
// TUPLETS, FERMATAS, GRACE NOTES
// ============================================================================

/// `(` opens either a tuplet or a fermata
///
/// It is a tuplet when at least two pitches or rests follow before the
/// group closes. `(ABC)` is a triplet; when a duration digit or dot
/// precedes the `(` the long form `4(6ABC;5)` gives the note count after `;`.
///
/// Any digit before `(` forces the long form, so `8(ABC)` has no count and
/// is reported as `tuplet_paren_before_semicolon`; write `(8ABC)` instead.
pub fn decode_tuplet_fermata(src: &[u8], index: usize, note: &mut NoteEvent, diags: &mut Diagnostics) -> usize {
    if !TUPLET_AHEAD.is_match(&src[index..]) {
        if note.tuplet_note > 0 {
            diags.warn(index, "fermata_in_tuplet", "Fermata within a tuplet won't be handled correctly");
        }
        note.fermata = true;
        return 0;
    }

    let long_form = index > 0 && matches!(src[index - 1], b'0'..=b'9' | b'.');
    let count = if long_form {
        match long_form_tuplet_count(src, index, diags) {
            Some(count) => count,
            None => return 0,
        }
    } else {
        3
    };

    note.tuplet_notes = count;
    note.tuplet_note = count;
    0
}

fn long_form_tuplet_count(src: &[u8], index: usize, diags: &mut Diagnostics) -> Option<u32> {
    let mut t = index;
    while t < src.len() && src[t] != b';' {
        if src[t] == b')' {
            diags.error(t, "tuplet_paren_before_semicolon", "Found ')' before ';' in a tuplet");
            return None;
        }
        t += 1;
    }

    let digits_start = t + 1;
    let mut end = digits_start;
    while end < src.len() && src[end] != b')' {
        if !src[end].is_ascii_digit() {
            diags.error(end, "tuplet_count_not_numeric", "Found a non-number in a tuplet number");
            return None;
        }
        end += 1;
    }

    let digits = src.get(digits_start..end).unwrap_or_default();
    let count = std::str::from_utf8(digits).ok().and_then(|s| s.parse::<u32>().ok());
    match count {
        Some(count) if count > 0 => Some(count),
        _ => {
            diags.error(index, "tuplet_count_not_numeric", "Tuplet has no note count");
            None
        }
    }
}

/// `;` or `)` closes a tuplet/fermata group
///
/// The fermata flag never outlives its group. After `;` the long-form
/// note count is skipped so it is not read again as a duration.
pub fn decode_group_end(src: &[u8], index: usize, note: &mut NoteEvent) -> usize {
    note.fermata = false;
    if src[index] == b';' {
        return src[index + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
    }
    0
}

/// `g` acciaccatura, `q` appoggiatura, `qq...r` a run of appoggiaturas
pub fn decode_grace(src: &[u8], index: usize, note: &mut NoteEvent) -> usize {
    match src[index] {
        b'g' => {
            note.acciaccatura = true;
            0
        }
        b'q' => {
            note.appoggiatura = 1;
            if byte_at(src, index + 1) != Some(b'q') {
                return 0;
            }
            let run = src[index + 1..]
                .iter()
                .take_while(|&&c| c != b'r')
                .filter(|&&c| is_pitch_letter(c))
                .count();
            note.appoggiatura += run as u32;
            1
        }
        _ => 0,
    }
}

// ============================================================================
// NOTES AND RESTS
// ============================================================================

/// A pitch letter or `-` completes the in-progress event
///
/// The event receives its duration (fixed eighth for an acciaccatura, the
/// next entry of the duration cycle otherwise), looks ahead for a trill,
/// tie or chord mark, is appended to the measure and replaced by its
/// successor.
pub fn decode_note(
    src: &[u8],
    index: usize,
    note: &mut NoteEvent,
    measure: &mut MeasureState,
    diags: &mut Diagnostics,
) -> usize {
    if note.acciaccatura {
        note.duration = Duration::Eighth;
        note.dots = 0;
    } else if let Some((duration, dots)) = measure.durations.current() {
        note.duration = duration;
        note.dots = dots;
    } else {
        note.duration = Duration::Quarter;
        note.dots = 0;
        diags.warn(index, "missing_duration", "Got a note before a duration was specified");
    }

    note.pitch = PitchName::from_pae(src[index]);
    note.col = index;

    let ahead = &src[index + 1..];
    if TRILL_AHEAD.is_match(ahead) {
        note.trill = true;
    }
    if TIE_AHEAD.is_match(ahead) {
        note.tie = true;
    }
    if CHORD_AHEAD.is_match(ahead) {
        note.chord = true;
    }

    let next = note.successor();
    measure.events.push(std::mem::replace(note, next));
    measure.durations.advance();
    0
}

/// `=` optionally followed by the number of whole-measure rests
pub fn decode_whole_rest(src: &[u8], index: usize) -> (u32, usize) {
    let digits = src[index + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return (1, 0);
    }
    let count = std::str::from_utf8(&src[index + 1..index + 1 + digits])
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(1);
    (count, digits)
}

/// `!` opens an abbreviation block; the closing `!` followed by `f`s
/// repeats the block once per `f`
pub fn decode_abbreviation(src: &[u8], index: usize, measure: &mut MeasureState) -> usize {
    let Some(start) = measure.abbreviation_start.take() else {
        measure.abbreviation_start = Some(measure.events.len());
        return 0;
    };

    let stop = measure.events.len();
    let start = start.min(stop);
    let repeats = src[index + 1..].iter().take_while(|&&c| c == b'f').count();
    for _ in 0..repeats {
        measure.events.extend_from_within(start..stop);
    }
    repeats
}

// ============================================================================
// BAR LINES
// ============================================================================

/// Bar lines, most specific first: `://:`, `://`, `//:`, `//`, `/` or `:`
pub fn decode_barline(src: &[u8], index: usize) -> (BarRendition, usize) {
    let rest = &src[index..];
    if rest.starts_with(b"://:") {
        (BarRendition::RptBoth, 3)
    } else if rest.starts_with(b"//:") {
        (BarRendition::RptStart, 2)
    } else if rest.starts_with(b"://") {
        (BarRendition::RptEnd, 2)
    } else if rest.starts_with(b"//") {
        (BarRendition::Dbl, 1)
    } else {
        (BarRendition::Single, 0)
    }
}

// ============================================================================
// CLEF, KEY AND METER (header values and inline changes)
// ============================================================================

/// Clef such as `G-2`, `C-1`, `F-4` or `g-2` (treble clef, octave below)
///
/// At most three bytes are read: shape letter, separator, line number.
/// Returns the number of bytes read.
pub fn decode_clef(src: &[u8], index: usize, diags: &mut Diagnostics) -> (Clef, usize) {
    let len = src.len().saturating_sub(index).min(3);
    let letter = byte_at(src, index).unwrap_or(b'G');
    let line = match src.get(index + 2) {
        Some(c) if len == 3 && c.is_ascii_digit() => c - b'0',
        _ => 2,
    };

    let mut clef = Clef {
        shape: None,
        line,
        dis: None,
        dis_place: None,
    };
    match letter {
        b'C' | b'c' => clef.shape = Some(ClefShape::C),
        b'G' => clef.shape = Some(ClefShape::G),
        b'g' => {
            clef.shape = Some(ClefShape::G);
            clef.dis = Some(8);
            clef.dis_place = Some(Place::Below);
        }
        b'F' | b'f' => clef.shape = Some(ClefShape::F),
        other => diags.debug(index, "undefined_clef", format!("Clef {} is undefined", other as char)),
    }
    (clef, len)
}

/// Key signature such as `bBEA` or `xFC`; returns the number of bytes read
pub fn decode_key(src: &[u8], index: usize) -> (KeySig, usize) {
    let mut key = KeySig::default();
    let mut count = 0u8;
    let mut i = index;
    while let Some(c) = byte_at(src, i) {
        match c {
            b'b' => key.accid = Some(Accidental::Flat),
            b'x' => key.accid = Some(Accidental::Sharp),
            b'n' => key.accid = Some(Accidental::Natural),
            b'[' => {}
            b'F' | b'C' | b'G' | b'D' | b'A' | b'E' | b'B' => count = count.saturating_add(1),
            _ => break,
        }
        i += 1;
    }
    if key.accid != Some(Accidental::Natural) {
        key.count = count;
    }
    (key, i - index)
}

/// Time signature such as `3/4`, `6`, `c`, `c/`, `c3`, `c3/2`
///
/// Returns `None` (with a warning) for an unrecognized signature. The
/// second value is the number of bytes read, 0 when nothing looks like a
/// time signature.
pub fn decode_time(src: &[u8], index: usize, diags: &mut Diagnostics) -> (Option<MeterSig>, usize) {
    match byte_at(src, index) {
        Some(c) if c.is_ascii_digit() || c == b'c' || c == b'o' => {}
        _ => return (None, 0),
    }

    let mut end = index + 1;
    while let Some(c) = byte_at(src, end) {
        if !(c.is_ascii_digit() || c == b'/' || c == b'.') {
            break;
        }
        end += 1;
    }
    let token = String::from_utf8_lossy(&src[index..end]);

    let mut meter = MeterSig::default();
    if let Some(caps) = METER_FRACTION.captures(&token) {
        meter.count = caps[1].parse().ok();
        meter.unit = caps[2].parse().ok();
    } else if METER_COUNT.is_match(&token) {
        meter.count = token.parse().ok();
    } else {
        match &*token {
            "c" => meter.sym = Some(MeterSign::Common),
            "c/" => meter.sym = Some(MeterSign::Cut),
            "c3" => {
                meter.sym = Some(MeterSign::Common);
                meter.count = Some(3);
            }
            "c3/2" => {
                meter.sym = Some(MeterSign::Common);
                meter.count = Some(3);
                meter.unit = Some(2);
            }
            _ => {
                diags.add(
                    DiagnosticMark::new(
                        index,
                        DiagnosticSeverity::Warning,
                        "unknown_time_signature",
                        format!("Unknown time signature: {}", token),
                    )
                    .with_len(end - index),
                );
                return (None, end - index);
            }
        }
    }
    (Some(meter), end - index)
}
