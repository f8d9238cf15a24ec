//! Models module for the PAE importer
//!
//! Attribute enums and the score tree produced by an import.

pub mod attributes;
pub mod score;

// Re-export commonly used types
pub use attributes::*;
pub use score::*;
