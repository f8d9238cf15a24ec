//! PAE importer WASM API
//!
//! JavaScript-facing functions for importing incipits.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, error handling, and logging
//! - `import`: Incipit import entry points

pub mod helpers;
pub mod import;

pub use import::{import_pae, import_pae_tree, pae_diagnostics, parse_import_settings};
