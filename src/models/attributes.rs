//! Attribute value types shared by the decoders and the score tree
//!
//! These mirror the MEI data types the layout engine expects
//! (`data.PITCHNAME`, `data.DURATION`, `data.ACCIDENTAL.EXPLICIT`, ...),
//! reduced to the values a Plaine & Easie incipit can produce.

use serde::{Deserialize, Serialize};

/// Diatonic pitch class
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PitchName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl PitchName {
    /// Map an incipit pitch letter (`A`..`G`) to its pitch class
    pub fn from_pae(c: u8) -> Option<Self> {
        match c {
            b'A' => Some(PitchName::A),
            b'B' => Some(PitchName::B),
            b'C' => Some(PitchName::C),
            b'D' => Some(PitchName::D),
            b'E' => Some(PitchName::E),
            b'F' => Some(PitchName::F),
            b'G' => Some(PitchName::G),
            _ => None,
        }
    }
}

/// Written duration
///
/// Ordered from longest to shortest.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Duration {
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "breve")]
    Breve,
    #[serde(rename = "1")]
    Whole,
    #[serde(rename = "2")]
    Half,
    #[serde(rename = "4")]
    Quarter,
    #[serde(rename = "8")]
    Eighth,
    #[serde(rename = "16")]
    Sixteenth,
    #[serde(rename = "32")]
    ThirtySecond,
    #[serde(rename = "64")]
    SixtyFourth,
    #[serde(rename = "128")]
    OneHundredTwentyEighth,
}

impl Duration {
    /// Decode a single incipit duration digit
    ///
    /// The digit table is fixed by the encoding and is not ordered by length:
    /// `0`=long, `1`=whole, `2`=half, `3`=32nd, `4`=quarter, `5`=64th,
    /// `6`=16th, `7`=128th, `8`=eighth, `9`=breve.
    pub fn from_pae_digit(c: u8) -> Option<Self> {
        match c {
            b'0' => Some(Duration::Long),
            b'1' => Some(Duration::Whole),
            b'2' => Some(Duration::Half),
            b'3' => Some(Duration::ThirtySecond),
            b'4' => Some(Duration::Quarter),
            b'5' => Some(Duration::SixtyFourth),
            b'6' => Some(Duration::Sixteenth),
            b'7' => Some(Duration::OneHundredTwentyEighth),
            b'8' => Some(Duration::Eighth),
            b'9' => Some(Duration::Breve),
            _ => None,
        }
    }
}

/// Explicit accidental written in front of a note or used as key signature type
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accidental {
    #[serde(rename = "n")]
    Natural,
    #[serde(rename = "s")]
    Sharp,
    #[serde(rename = "ss")]
    DoubleSharp,
    #[serde(rename = "f")]
    Flat,
    #[serde(rename = "ff")]
    DoubleFlat,
}

/// Right bar line rendition of a measure
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BarRendition {
    /// Unterminated measure (end of incipit without bar line)
    #[default]
    None,
    Single,
    Dbl,
    RptStart,
    RptEnd,
    RptBoth,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClefShape {
    C,
    F,
    G,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Place {
    Above,
    Below,
}

/// Mensuration / meter symbol
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MeterSign {
    Common,
    Cut,
}

/// Position of a note within a tie chain
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TieKind {
    #[serde(rename = "i")]
    Initial,
    #[serde(rename = "m")]
    Medial,
    #[serde(rename = "t")]
    Terminal,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GraceKind {
    /// Acciaccatura (slashed)
    Acc,
    /// Appoggiatura
    Unacc,
}

/// Grace notes are always drawn stem up
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
}
