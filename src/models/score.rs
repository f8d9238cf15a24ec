//! Score tree produced by the importer
//!
//! ```text
//! Score
//! ├── ScoreDef            (staffGrp/staffDef + default key/meter)
//! └── Section
//!     ├── ScoreDefChange  (only ahead of a measure introducing a key/meter)
//!     └── Measure
//!         └── Staff
//!             └── Layer
//!                 └── Vec<LayerElement>   (Note, Rest, Beam, Tuplet, Chord, ...)
//! ```
//!
//! Every node is owned by its parent. Containers (`Beam`, `Tuplet`, `Chord`)
//! keep their children in musical order.

use serde::{Deserialize, Serialize};

use super::attributes::{
    Accidental, BarRendition, ClefShape, Duration, GraceKind, MeterSign, PitchName, Place,
    StemDirection, TieKind,
};

// ============================================================================
// LEAF ELEMENTS
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Clef {
    /// `None` when the incipit named a clef letter we do not know
    pub shape: Option<ClefShape>,
    pub line: u8,
    /// Octave displacement (8 for the tenor `g` clef)
    pub dis: Option<u8>,
    pub dis_place: Option<Place>,
}

impl Default for Clef {
    fn default() -> Self {
        Self {
            shape: Some(ClefShape::G),
            line: 2,
            dis: None,
            dis_place: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct KeySig {
    /// Alteration type; `Natural` cancels the previous signature
    pub accid: Option<Accidental>,
    pub count: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct MeterSig {
    pub count: Option<u32>,
    pub unit: Option<u32>,
    pub sym: Option<MeterSign>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Note {
    pub pname: PitchName,
    pub oct: i8,
    pub accid: Option<Accidental>,
    /// `None` for chord members, which take the duration of their chord
    pub dur: Option<Duration>,
    pub dots: u8,
    pub tie: Option<TieKind>,
    pub fermata: Option<Place>,
    pub trill: bool,
    pub grace: Option<GraceKind>,
    pub stem_dir: Option<StemDirection>,
}

impl Note {
    pub fn new(pname: PitchName, oct: i8, dur: Duration, dots: u8) -> Self {
        Self {
            pname,
            oct,
            accid: None,
            dur: Some(dur),
            dots,
            tie: None,
            fermata: None,
            trill: false,
            grace: None,
            stem_dir: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Rest {
    pub dur: Duration,
    pub dots: u8,
    pub fermata: Option<Place>,
}

/// Run of whole-measure rests
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MultiRest {
    pub num: u32,
}

// ============================================================================
// CONTAINERS
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Beam {
    pub children: Vec<LayerElement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tuplet {
    pub num: u32,
    pub numbase: u32,
    pub children: Vec<LayerElement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Chord {
    pub dur: Option<Duration>,
    pub dots: u8,
    pub children: Vec<LayerElement>,
}

/// Anything that owns an ordered list of layer elements
pub trait ElementContainer {
    fn add_child(&mut self, element: LayerElement);
    fn children(&self) -> &[LayerElement];
}

macro_rules! impl_element_container {
    ($($ty:ty),*) => {
        $(
            impl ElementContainer for $ty {
                fn add_child(&mut self, element: LayerElement) {
                    self.children.push(element);
                }

                fn children(&self) -> &[LayerElement] {
                    &self.children
                }
            }
        )*
    };
}

impl_element_container!(Beam, Tuplet, Chord, Layer);

/// One node of a layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerElement {
    Clef(Clef),
    KeySig(KeySig),
    MeterSig(MeterSig),
    Note(Note),
    Rest(Rest),
    MultiRest(MultiRest),
    Beam(Beam),
    Tuplet(Tuplet),
    Chord(Chord),
}

impl LayerElement {
    /// Children of a container element, `None` for leaves
    pub fn children(&self) -> Option<&[LayerElement]> {
        match self {
            LayerElement::Beam(beam) => Some(&beam.children),
            LayerElement::Tuplet(tuplet) => Some(&tuplet.children),
            LayerElement::Chord(chord) => Some(&chord.children),
            _ => None,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            LayerElement::Note(note) => Some(note),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.children().is_some()
    }
}

// ============================================================================
// MEASURE STRUCTURE
// ============================================================================

/// A voice
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Layer {
    pub n: u32,
    pub children: Vec<LayerElement>,
}

impl Layer {
    pub fn new(n: u32) -> Self {
        Self {
            n,
            children: Vec::new(),
        }
    }

    /// Depth-first walk over every element, containers before their children
    pub fn walk(&self) -> Vec<&LayerElement> {
        fn visit<'a>(elements: &'a [LayerElement], out: &mut Vec<&'a LayerElement>) {
            for element in elements {
                out.push(element);
                if let Some(children) = element.children() {
                    visit(children, out);
                }
            }
        }
        let mut out = Vec::new();
        visit(&self.children, &mut out);
        out
    }

    /// All notes of the layer, including those nested in containers
    pub fn notes(&self) -> Vec<&Note> {
        self.walk().into_iter().filter_map(LayerElement::as_note).collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Staff {
    pub n: u32,
    pub layer: Layer,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Measure {
    pub n: u32,
    pub right: BarRendition,
    pub staff: Staff,
}

/// Key/meter change ahead of a measure
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ScoreDefChange {
    pub key_sig: Option<KeySig>,
    pub meter_sig: Option<MeterSig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SectionItem {
    ScoreDef(ScoreDefChange),
    Measure(Measure),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Section {
    pub items: Vec<SectionItem>,
}

impl Section {
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.items.iter().filter_map(|item| match item {
            SectionItem::Measure(measure) => Some(measure),
            SectionItem::ScoreDef(_) => None,
        })
    }
}

// ============================================================================
// SCORE
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StaffDef {
    pub n: u32,
    pub lines: u8,
    pub clef: Option<Clef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct StaffGrp {
    pub staff_defs: Vec<StaffDef>,
}

/// Score-level defaults in force at the start of the incipit
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ScoreDef {
    pub staff_grp: StaffGrp,
    pub key_sig: Option<KeySig>,
    pub meter_sig: Option<MeterSig>,
}

/// Header values carried through without interpretation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ScoreMeta {
    pub key: Option<String>,
    pub alt_timesig: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Score {
    pub meta: ScoreMeta,
    pub score_def: ScoreDef,
    pub section: Section,
}

impl Score {
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.section.measures()
    }

    pub fn measure_count(&self) -> usize {
        self.measures().count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_walk_includes_nested_notes() {
        let mut tuplet = Tuplet {
            num: 3,
            numbase: 3,
            children: Vec::new(),
        };
        for pname in [PitchName::A, PitchName::B, PitchName::C] {
            tuplet.add_child(LayerElement::Note(Note::new(pname, 4, Duration::Eighth, 0)));
        }
        let mut layer = Layer::new(1);
        layer.add_child(LayerElement::Tuplet(tuplet));
        layer.add_child(LayerElement::Rest(Rest {
            dur: Duration::Quarter,
            dots: 0,
            fermata: None,
        }));

        assert_eq!(layer.walk().len(), 5);
        assert_eq!(layer.notes().len(), 3);
        assert!(layer.children()[0].is_container());
    }

    #[test]
    fn test_layer_element_json_is_tagged() {
        let element = LayerElement::MultiRest(MultiRest { num: 4 });
        let json = serde_json::to_string(&element).unwrap();
        assert_eq!(json, r#"{"type":"multiRest","num":4}"#);
    }
}
