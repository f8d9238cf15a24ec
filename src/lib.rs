//! Plaine & Easie Incipit Importer WASM Module
//!
//! Decodes Plaine & Easie Code incipits (the notation used by RISM for
//! cataloguing musical sources) into a hierarchical score tree:
//! Score → Section → Measure → Staff → Layer → elements.

pub mod models;
pub mod diagnostics;
pub mod parse;
pub mod converters;
pub mod import;
pub mod api;

// Re-export commonly used types
pub use diagnostics::{DiagnosticMark, DiagnosticSeverity, Diagnostics};
pub use import::{import_pae_str, ImportError, ImportResult, ImportSettings, PaeInput};
pub use models::score::Score;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // a logger may already be installed by the host page
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("PAE importer WASM module initialized");
}
