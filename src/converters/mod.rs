//! Tree builders
//!
//! Turn tokenized measures into layers and the final score.

pub mod layer_builder;
pub mod score_builder;

// Re-export for convenience
pub use layer_builder::LayerBuilder;
pub use score_builder::{build_score, ScoreDefaults};
