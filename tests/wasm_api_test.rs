//! WASM API test
//!
//! Exercises the JavaScript-facing entry points; run with `wasm-pack test`.

#![cfg(target_arch = "wasm32")]

use pae_wasm::api::{import_pae, import_pae_tree, pae_diagnostics, parse_import_settings};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_import_pae_returns_json() {
    let json = import_pae("@clef:G-2\n@data:4CDE/\n", JsValue::UNDEFINED).unwrap();
    assert!(json.contains("\"type\":\"measure\""));
}

#[wasm_bindgen_test]
fn test_import_pae_tree() {
    let tree = import_pae_tree("@data:4CDE/\n", JsValue::NULL).unwrap();
    assert!(tree.is_object());
}

#[wasm_bindgen_test]
fn test_pae_diagnostics() {
    let marks = pae_diagnostics("@data:CDE/\n").unwrap();
    assert!(marks.is_object());
}

#[wasm_bindgen_test]
fn test_parse_import_settings_rejects_bad_document() {
    assert!(parse_import_settings("staff_lines: [1, 2]").is_err());
    assert!(parse_import_settings("staff_lines: 4").is_ok());
}
