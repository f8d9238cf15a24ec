//! Measure events → layer tree
//!
//! Walks the flat event list of one measure and nests notes into beams,
//! tuplets and chords using a stack of open containers:
//!
//! ```text
//! events:  {A  (B  C  D)  E}          stack after each event
//!          ^beam ^tuplet   ^end
//! A  push Beam, add A                 [Beam]
//! B  push Tuplet, add B               [Beam, Tuplet]
//! C  add C                            [Beam, Tuplet]
//! D  add D, pop Tuplet                [Beam]
//! E  add E, pop Beam                  []
//! ```
//!
//! An open container is owned by the stack and handed to its parent when
//! popped, so the tree is only ever built bottom-up.

use crate::diagnostics::Diagnostics;
use crate::models::attributes::{GraceKind, Place, StemDirection, TieKind};
use crate::models::score::{
    Beam, Chord, ElementContainer, Layer, LayerElement, MultiRest, Note, Rest, Tuplet,
};
use crate::parse::events::{BeamMark, MeasureState, NoteEvent};

/// A container still accepting children
#[derive(Debug, Clone, PartialEq)]
enum OpenContainer {
    Beam(Beam),
    Tuplet(Tuplet),
    Chord(Chord),
}

impl OpenContainer {
    fn add_child(&mut self, element: LayerElement) {
        match self {
            OpenContainer::Beam(beam) => beam.add_child(element),
            OpenContainer::Tuplet(tuplet) => tuplet.add_child(element),
            OpenContainer::Chord(chord) => chord.add_child(element),
        }
    }

    fn into_element(self) -> LayerElement {
        match self {
            OpenContainer::Beam(beam) => LayerElement::Beam(beam),
            OpenContainer::Tuplet(tuplet) => LayerElement::Tuplet(tuplet),
            OpenContainer::Chord(chord) => LayerElement::Chord(chord),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OpenContainer::Beam(_) => "beam",
            OpenContainer::Tuplet(_) => "tuplet",
            OpenContainer::Chord(_) => "chord",
        }
    }
}

/// Builds one layer per measure
///
/// The container stack is local to a measure. The tie state is not: a tie
/// may cross a bar line. Because the incipit is a single voice, the tie
/// partner is always the next note, so a flag stands in for a reference
/// to the last tied note.
pub struct LayerBuilder<'d> {
    diags: &'d mut Diagnostics,
    stack: Vec<OpenContainer>,
    chord_open: bool,
    tie_pending: bool,
}

impl<'d> LayerBuilder<'d> {
    pub fn new(diags: &'d mut Diagnostics) -> Self {
        Self {
            diags,
            stack: Vec::new(),
            chord_open: false,
            tie_pending: false,
        }
    }

    /// Current nesting depth; 0 between measures
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Build the layer for one measure
    pub fn build_layer(&mut self, measure: &MeasureState, layer_n: u32) -> Layer {
        let mut layer = Layer::new(layer_n);
        self.stack.clear();
        self.chord_open = false;

        if let Some(clef) = &measure.clef {
            layer.add_child(LayerElement::Clef(clef.clone()));
        }
        if measure.whole_rest > 0 {
            layer.add_child(LayerElement::MultiRest(MultiRest {
                num: measure.whole_rest,
            }));
        }

        for event in &measure.events {
            self.add_event(&mut layer, event);
        }

        self.close_abandoned(&mut layer);
        layer
    }

    fn add_event(&mut self, layer: &mut Layer, event: &NoteEvent) {
        let mut element = self.leaf_for(event);

        // a rest ends an open chord before it is placed, chord mark or not
        if self.chord_open && event.is_rest() {
            self.chord_open = false;
            self.pop(layer, event.col);
        }

        if let Some(clef) = &event.clef {
            self.attach(layer, LayerElement::Clef(clef.clone()));
        }
        if let Some(meter) = &event.meter {
            self.attach(layer, LayerElement::MeterSig(meter.clone()));
        }
        if let Some(key) = &event.key {
            self.attach(layer, LayerElement::KeySig(key.clone()));
        }

        if event.beam == BeamMark::Initial {
            self.stack.push(OpenContainer::Beam(Beam::default()));
        }

        if event.opens_tuplet() {
            self.stack.push(OpenContainer::Tuplet(Tuplet {
                num: event.tuplet_notes,
                numbase: event.tuplet_notes,
                children: Vec::new(),
            }));
        }

        if event.chord {
            match &mut element {
                LayerElement::Note(note) => {
                    if !self.chord_open {
                        self.stack.push(OpenContainer::Chord(Chord {
                            dur: note.dur,
                            dots: note.dots,
                            children: Vec::new(),
                        }));
                        self.chord_open = true;
                    }
                    note.dur = None;
                    note.dots = 0;
                }
                _ => self
                    .diags
                    .warn(event.col, "chord_member_rest", "A rest cannot be part of a chord"),
            }
        }

        let last_chord_member = self.chord_open && !event.chord;
        if last_chord_member {
            if let LayerElement::Note(note) = &mut element {
                note.dur = None;
                note.dots = 0;
            }
        }

        self.attach(layer, element);

        if event.closes_tuplet() {
            self.pop(layer, event.col);
        }
        if event.beam == BeamMark::Terminal {
            self.pop(layer, event.col);
        }
        if last_chord_member {
            self.chord_open = false;
            self.pop(layer, event.col);
        }
    }

    /// Note or rest for an event, with grace, fermata, trill and tie applied
    fn leaf_for(&mut self, event: &NoteEvent) -> LayerElement {
        let fermata = event.fermata.then_some(Place::Above);
        let Some(pname) = event.pitch else {
            return LayerElement::Rest(Rest {
                dur: event.duration,
                dots: event.dots,
                fermata,
            });
        };

        let mut note = Note::new(pname, event.octave, event.duration, event.dots);
        note.accid = event.accidental;
        note.fermata = fermata;
        note.trill = event.trill;

        if event.acciaccatura {
            note.grace = Some(GraceKind::Acc);
            note.stem_dir = Some(StemDirection::Up);
        } else if event.appoggiatura > 0 {
            note.grace = Some(GraceKind::Unacc);
            note.stem_dir = Some(StemDirection::Up);
        }

        if self.tie_pending {
            note.tie = Some(TieKind::Terminal);
            self.tie_pending = false;
        }
        if event.tie {
            note.tie = match note.tie {
                Some(TieKind::Terminal) => Some(TieKind::Medial),
                _ => Some(TieKind::Initial),
            };
            self.tie_pending = true;
        }

        LayerElement::Note(note)
    }

    /// Add to the innermost open container, or to the layer
    fn attach(&mut self, layer: &mut Layer, element: LayerElement) {
        match self.stack.last_mut() {
            Some(container) => container.add_child(element),
            None => layer.add_child(element),
        }
    }

    fn pop(&mut self, layer: &mut Layer, col: usize) {
        match self.stack.pop() {
            Some(container) => {
                let element = container.into_element();
                self.attach(layer, element);
            }
            None => self.diags.error(
                col,
                "empty_container_stack",
                "Tried to pop from an empty container stack; cross-measure beams and tuplets are not supported",
            ),
        }
    }

    /// Containers still open at the end of the measure keep their children
    /// and are closed here
    fn close_abandoned(&mut self, layer: &mut Layer) {
        while let Some(container) = self.stack.pop() {
            self.diags.warn(
                0,
                "abandoned_container",
                format!("A {} was left open at the end of the measure", container.name()),
            );
            let element = container.into_element();
            self.attach(layer, element);
        }
        self.chord_open = false;
    }
}
