//! Incipit import for the WASM API
//!
//! - `importPae`: record set → score JSON string
//! - `importPaeTree`: record set → score as a JavaScript object
//! - `paeDiagnostics`: record set → diagnostics only
//! - `parseImportSettings`: YAML/JSON settings → settings object

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, serialize, to_json};
use crate::import::{ImportResult, ImportSettings, PaeInput};
use crate::{wasm_info, wasm_log};

/// Settings from JavaScript; `undefined`/`null` selects the defaults
fn settings_from_js(settings_js: JsValue) -> Result<ImportSettings, JsValue> {
    if settings_js.is_undefined() || settings_js.is_null() {
        return Ok(ImportSettings::default());
    }
    deserialize(settings_js, "Settings deserialization error")
}

fn run_import(text: &str, settings_js: JsValue) -> Result<ImportResult, JsValue> {
    let settings = settings_from_js(settings_js)?;
    let result = PaeInput::with_settings(settings).import_string(text);
    wasm_log!(
        "  {} measure(s), {} diagnostic(s)",
        result.score.measure_count(),
        result.diagnostics.marks.len()
    );
    Ok(result)
}

/// Import a PAE record set and return the score as JSON
///
/// # Parameters
/// * `text` - `@key:value` records, one per line
/// * `settings_js` - optional `ImportSettings` object
#[wasm_bindgen(js_name = importPae)]
pub fn import_pae(text: &str, settings_js: JsValue) -> Result<String, JsValue> {
    wasm_info!("importPae called ({} bytes)", text.len());
    let result = run_import(text, settings_js)?;
    to_json(&result.score, "Score serialization error")
}

/// Import a PAE record set and return `{ score, diagnostics }` as an object
#[wasm_bindgen(js_name = importPaeTree)]
pub fn import_pae_tree(text: &str, settings_js: JsValue) -> Result<JsValue, JsValue> {
    wasm_info!("importPaeTree called ({} bytes)", text.len());
    let result = run_import(text, settings_js)?;
    serialize(&result, "Import result serialization error")
}

/// Decode a PAE record set and return only its diagnostics
#[wasm_bindgen(js_name = paeDiagnostics)]
pub fn pae_diagnostics(text: &str) -> Result<JsValue, JsValue> {
    let result = PaeInput::new().import_string(text);
    serialize(&result.diagnostics.marks, "Diagnostics serialization error")
}

/// Parse a YAML (or JSON) settings document into an `ImportSettings` object
#[wasm_bindgen(js_name = parseImportSettings)]
pub fn parse_import_settings(text: &str) -> Result<JsValue, JsValue> {
    let settings = ImportSettings::from_yaml(text)?;
    serialize(&settings, "Settings serialization error")
}
