/// Popup controller: session state, page processing and export
use crate::config::ApiConfig;
use crate::error::ExtensionError;
use crate::export::{ArchiveInput, archive_filename, build_archive};
use crate::gemini::{GeminiClient, HttpClient, ModelDescriptor};
use crate::records::{Credential, Prompt};
use crate::storage::{CredentialStore, PromptStore, StorageArea};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use serde::Deserialize;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

pub const PROCESSING_MESSAGE: &str = "Processing...";
pub const NO_RESPONSE_MESSAGE: &str = "No response from Gemini.";
pub const MODELS_UNAVAILABLE_MESSAGE: &str = "Error fetching models. Is your API key valid?";

/// The tab the popup was opened over
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActiveTab {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
}

/// Tab, capture and download services provided by the extension host
#[async_trait(?Send)]
pub trait Browser {
    async fn active_tab(&self) -> Result<ActiveTab, ExtensionError>;

    /// Ask the tab's content script for the page markup
    async fn request_markup(&self, tab_id: i32) -> Result<String, ExtensionError>;

    /// PNG data URL of the visible part of the active tab
    async fn capture_screenshot(&self) -> Result<String, ExtensionError>;

    async fn download(&self, filename: &str, bytes: &[u8]) -> Result<(), ExtensionError>;
}

/// In-memory state for one popup lifetime
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub credential: Option<Credential>,
    pub model: Option<String>,
    pub prompt_index: Option<usize>,
    pub markup: Option<String>,
    pub screenshot: Option<String>,
    pub output: String,
}

/// Held for the duration of a page run; the flag is cleared on every exit path
struct BusyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(BusyGuard { flag })
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct Orchestrator {
    credentials: CredentialStore,
    prompts: PromptStore,
    browser: Rc<dyn Browser>,
    gemini: GeminiClient,
    session: RefCell<SessionState>,
    busy: Cell<bool>,
}

impl Orchestrator {
    pub fn new(storage: Rc<dyn StorageArea>, browser: Rc<dyn Browser>, gemini: GeminiClient) -> Self {
        Orchestrator {
            credentials: CredentialStore::new(Rc::clone(&storage)),
            prompts: PromptStore::new(storage),
            browser,
            gemini,
            session: RefCell::new(SessionState::default()),
            busy: Cell::new(false),
        }
    }

    pub fn with_http(
        storage: Rc<dyn StorageArea>,
        browser: Rc<dyn Browser>,
        http: Rc<dyn HttpClient>,
        config: ApiConfig,
    ) -> Self {
        Self::new(storage, browser, GeminiClient::new(http, config))
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    pub fn session(&self) -> Ref<'_, SessionState> {
        self.session.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn set_output(&self, text: &str) {
        self.session.borrow_mut().output = text.to_string();
    }

    /// Load stored credentials and select the first one, if any
    pub async fn load_credentials(&self) -> Result<Vec<Credential>, ExtensionError> {
        let credentials = self.credentials.list().await?;
        self.session.borrow_mut().credential = credentials.first().cloned();
        Ok(credentials)
    }

    /// Select a credential and refresh the model catalog for it.
    /// On failure the output area shows the catalog error and no model is selected.
    pub async fn select_credential(
        &self,
        credential: Credential,
    ) -> Result<Vec<ModelDescriptor>, ExtensionError> {
        {
            let mut session = self.session.borrow_mut();
            session.credential = Some(credential.clone());
            session.model = None;
        }

        match self.gemini.list_models(&credential.key).await {
            Ok(models) => {
                self.session.borrow_mut().model = models.first().map(|m| m.name.clone());
                Ok(models)
            }
            Err(e) => {
                error!("Error fetching models: {}", e);
                self.set_output(MODELS_UNAVAILABLE_MESSAGE);
                Err(e)
            }
        }
    }

    pub fn select_model(&self, model: Option<String>) {
        self.session.borrow_mut().model = model;
    }

    pub fn select_prompt(&self, index: Option<usize>) {
        self.session.borrow_mut().prompt_index = index;
    }

    /// Re-read prompts, keeping the selection if it still points at an entry
    /// and falling back to the first prompt otherwise
    pub async fn reload_prompts(&self) -> Result<Vec<Prompt>, ExtensionError> {
        let prompts = self.prompts.list().await?;
        let mut session = self.session.borrow_mut();
        session.prompt_index = match session.prompt_index {
            Some(index) if index < prompts.len() => Some(index),
            _ if prompts.is_empty() => None,
            _ => Some(0),
        };
        Ok(prompts)
    }

    /// Extract the active page, send it with the selected prompt, and return
    /// the text now shown in the output area
    pub async fn process_page(&self) -> String {
        let text = match self.generate().await {
            Ok(Some(text)) => text,
            Ok(None) => NO_RESPONSE_MESSAGE.to_string(),
            Err(ExtensionError::Busy) => {
                warn!("Page is already being processed");
                return self.session().output.clone();
            }
            Err(e) => {
                if !e.is_precondition() {
                    error!("Error processing page: {}", e);
                }
                e.user_message()
            }
        };
        self.set_output(&text);
        text
    }

    async fn generate(&self) -> Result<Option<String>, ExtensionError> {
        let (credential, model, prompt_index) = {
            let session = self.session.borrow();
            (
                session.credential.clone(),
                session.model.clone(),
                session.prompt_index,
            )
        };
        let credential = credential.ok_or(ExtensionError::MissingCredential)?;
        let prompt_index = prompt_index.ok_or(ExtensionError::MissingPrompt)?;
        let model = model.ok_or(ExtensionError::MissingModel)?;

        let _busy = BusyGuard::acquire(&self.busy).ok_or(ExtensionError::Busy)?;
        self.set_output(PROCESSING_MESSAGE);

        let markup = self.extract_markup().await.map_err(|e| match e {
            ExtensionError::Messaging(_) => e,
            other => ExtensionError::Messaging(other.to_string()),
        })?;
        self.session.borrow_mut().markup = Some(markup.clone());

        let prompt = self.prompts.get(prompt_index).await?;
        self.gemini
            .generate_content(&credential.key, &model, &prompt.text, &markup)
            .await
    }

    async fn extract_markup(&self) -> Result<String, ExtensionError> {
        let tab = self.browser.active_tab().await?;
        self.browser.request_markup(tab.id).await
    }

    pub async fn capture_screenshot(&self) -> Result<(), ExtensionError> {
        let data_url = self.browser.capture_screenshot().await?;
        self.session.borrow_mut().screenshot = Some(data_url);
        info!("Screenshot captured");
        Ok(())
    }

    /// Package the session into an archive and hand it to the browser for download.
    /// Returns the download filename.
    pub async fn export(&self) -> Result<String, ExtensionError> {
        if self.session().markup.is_none() {
            return Err(ExtensionError::NothingToExport);
        }

        let tab = self.browser.active_tab().await?;
        let source_url = tab.url.unwrap_or_default();
        let bytes = {
            let session = self.session();
            build_archive(&ArchiveInput {
                markup: session.markup.as_deref(),
                output: &session.output,
                screenshot: session.screenshot.as_deref(),
                source_url: &source_url,
                timestamp: Utc::now(),
            })?
        };

        let filename = archive_filename();
        self.browser.download(&filename, &bytes).await?;
        info!("Exported {} ({} bytes)", filename, bytes.len());
        Ok(filename)
    }
}
