//! Error types for incipit import
//!
//! Decoding itself never fails; the only errors are failing to read the
//! input source and rejecting an invalid settings document.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file could not be opened or read
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings document is not valid JSON/YAML for [`super::ImportSettings`]
    #[error("Invalid import settings: {0}")]
    Settings(String),
}
