/// Gemini Web Companion - send the current page to Gemini from a Chrome extension popup
/// Built with Rust + WASM + Yew

mod bridge;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod gemini;
pub mod orchestrator;
pub mod records;
pub mod storage;
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

// Answer markup requests from the popup; runs in the page context
#[wasm_bindgen]
pub fn start_content_script() {
    let handler = Closure::<dyn Fn(JsValue) -> JsValue>::new(|request: JsValue| {
        let message: serde_json::Value =
            serde_wasm_bindgen::from_value(request).unwrap_or(serde_json::Value::Null);

        content::respond(&message, || content::document_markup().unwrap_or_default())
            .and_then(|response| serde_wasm_bindgen::to_value(&response).ok())
            .unwrap_or(JsValue::UNDEFINED)
    });

    bridge::addMessageListener(handler.as_ref().unchecked_ref());
    handler.forget();
    log::debug!("Content script listening for getSourceCode");
}
