//! WASM bindings for browser-based enforcement.
//!
//! This module exposes the enforcement pass to JavaScript via
//! wasm-bindgen, for hosts that want to style server-rendered HTML text
//! before injecting it into the page.

use wasm_bindgen::prelude::*;

use crate::dom::parse_html;
use crate::enforce::StyleEnforcer;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Run one enforcement pass over HTML text.
///
/// Takes raw HTML and returns the same document with the declared style
/// written onto every eligible quiz action button.
#[wasm_bindgen]
pub fn enforce(html: &str) -> Result<String, JsValue> {
    let mut doc = parse_html(html);
    let enforcer = StyleEnforcer::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
    enforcer.apply_pass(&mut doc);
    Ok(doc.to_html())
}
