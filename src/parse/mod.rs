//! Parsing module for the PAE importer
//!
//! Header records, the incipit tokenizer and the token decoders it uses.

pub mod header;
pub mod events;
pub mod tokens;
pub mod incipit;

// Re-export commonly used types
pub use header::Header;
pub use events::{BeamMark, DurationCycle, MeasureState, NoteEvent};
pub use incipit::{parse_incipit, IncipitParser, ParsedIncipit};
