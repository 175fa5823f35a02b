/// In-memory stand-ins for the extension host, used by unit tests
use crate::error::ExtensionError;
use crate::gemini::{HttpClient, HttpResponse};
use crate::orchestrator::{ActiveTab, Browser};
use crate::storage::StorageArea;
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, Value>>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write
    pub fn insert(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

#[async_trait(?Send)]
impl StorageArea for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, ExtensionError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ExtensionError> {
        self.writes.set(self.writes.get() + 1);
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ExtensionError> {
        self.writes.set(self.writes.get() + 1);
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

pub struct FakeBrowser {
    markup: RefCell<Result<String, String>>,
    markup_requests: Cell<usize>,
    downloads: RefCell<Vec<(String, Vec<u8>)>>,
}

impl FakeBrowser {
    pub fn new(markup: &str) -> Self {
        FakeBrowser {
            markup: RefCell::new(Ok(markup.to_string())),
            markup_requests: Cell::new(0),
            downloads: RefCell::new(Vec::new()),
        }
    }

    /// Make the content script unreachable
    pub fn fail_markup(&self, message: &str) {
        *self.markup.borrow_mut() = Err(message.to_string());
    }

    pub fn markup_requests(&self) -> usize {
        self.markup_requests.get()
    }

    pub fn downloads(&self) -> Vec<(String, Vec<u8>)> {
        self.downloads.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Browser for FakeBrowser {
    async fn active_tab(&self) -> Result<ActiveTab, ExtensionError> {
        Ok(ActiveTab {
            id: 1,
            url: Some("https://example.com/".to_string()),
        })
    }

    async fn request_markup(&self, _tab_id: i32) -> Result<String, ExtensionError> {
        self.markup_requests.set(self.markup_requests.get() + 1);
        self.markup
            .borrow()
            .clone()
            .map_err(ExtensionError::Messaging)
    }

    async fn capture_screenshot(&self) -> Result<String, ExtensionError> {
        // 1x1 transparent PNG
        Ok("data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=".to_string())
    }

    async fn download(&self, filename: &str, bytes: &[u8]) -> Result<(), ExtensionError> {
        self.downloads
            .borrow_mut()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Option<Value>,
}

/// Scripted HTTP: the most recently registered response whose pattern occurs
/// in the URL wins; unmatched URLs fail like a rejected fetch
#[derive(Default)]
pub struct MockHttp {
    routes: RefCell<Vec<(String, HttpResponse)>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, pattern: &str, status: u16, body: Value) {
        self.routes.borrow_mut().push((
            pattern.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        ));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    fn route(&self, url: &str, body: Option<Value>) -> Result<HttpResponse, ExtensionError> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_string(),
            body,
        });
        self.routes
            .borrow()
            .iter()
            .rev()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| ExtensionError::Network(format!("Unhandled fetch request: {}", url)))
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, ExtensionError> {
        self.route(url, None)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, ExtensionError> {
        self.route(url, Some(body.clone()))
    }
}
