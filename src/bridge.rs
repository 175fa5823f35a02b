/// chrome.* bindings behind the storage and browser traits
use crate::content::{ContentRequest, SourceCodeResponse};
use crate::error::ExtensionError;
use crate::orchestrator::{ActiveTab, Browser};
use crate::storage::StorageArea;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(key: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn captureVisibleTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn downloadBytes(bytes: &[u8], filename: &str) -> Result<(), JsValue>;

    pub fn addMessageListener(handler: &js_sys::Function);
}

/// Best-effort message from a rejected promise or thrown value
pub fn js_error(value: JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{:?}", value),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ExtensionError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ExtensionError::Browser(format!("Failed to serialize: {:?}", e)))
}

/// chrome.storage.local
pub struct ChromeStorage;

#[async_trait(?Send)]
impl StorageArea for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, ExtensionError> {
        let value = getStorage(key)
            .await
            .map_err(|e| ExtensionError::Browser(js_error(e)))?;

        if value.is_null() || value.is_undefined() {
            Ok(None)
        } else {
            serde_wasm_bindgen::from_value(value)
                .map(Some)
                .map_err(|e| ExtensionError::Browser(format!("Failed to parse storage: {:?}", e)))
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ExtensionError> {
        setStorage(key, to_js(&value)?)
            .await
            .map_err(|e| ExtensionError::Browser(js_error(e)))
    }

    async fn remove(&self, key: &str) -> Result<(), ExtensionError> {
        removeStorage(key)
            .await
            .map_err(|e| ExtensionError::Browser(js_error(e)))
    }
}

/// chrome.tabs plus an anchor-click download
pub struct ChromeBrowser;

#[async_trait(?Send)]
impl Browser for ChromeBrowser {
    async fn active_tab(&self) -> Result<ActiveTab, ExtensionError> {
        let tab = queryActiveTab()
            .await
            .map_err(|e| ExtensionError::Browser(js_error(e)))?;
        serde_wasm_bindgen::from_value(tab)
            .map_err(|e| ExtensionError::Browser(format!("Failed to parse tab: {:?}", e)))
    }

    async fn request_markup(&self, tab_id: i32) -> Result<String, ExtensionError> {
        let response = sendTabMessage(tab_id, to_js(&ContentRequest::get_source_code())?)
            .await
            .map_err(|e| ExtensionError::Messaging(js_error(e)))?;
        let response: SourceCodeResponse = serde_wasm_bindgen::from_value(response)
            .map_err(|e| ExtensionError::Messaging(format!("{:?}", e)))?;
        Ok(response.source_code)
    }

    async fn capture_screenshot(&self) -> Result<String, ExtensionError> {
        captureVisibleTab()
            .await
            .map_err(|e| ExtensionError::Browser(js_error(e)))?
            .as_string()
            .ok_or_else(|| ExtensionError::Browser("Screenshot was not a data URL".to_string()))
    }

    async fn download(&self, filename: &str, bytes: &[u8]) -> Result<(), ExtensionError> {
        downloadBytes(bytes, filename).map_err(|e| ExtensionError::Browser(js_error(e)))
    }
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Resolve after `ms` milliseconds on the page's timer queue
pub async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
