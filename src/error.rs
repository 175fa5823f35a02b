/// Error type shared by the stores, the API client and the popup controller
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("API key not set. Please set it in the options page.")]
    MissingCredential,

    #[error("Please select a model.")]
    MissingModel,

    #[error("Please select a prompt.")]
    MissingPrompt,

    #[error("Please process the page first to get the source code.")]
    NothingToExport,

    #[error("Page is already being processed")]
    Busy,

    #[error("Could not get source code from the page. Try reloading the page.")]
    Messaging(String),

    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("HTTP error! status: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No entry at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid screenshot data URL")]
    InvalidDataUrl,

    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Browser API error: {0}")]
    Browser(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtensionError {
    /// Missing-precondition errors: recoverable guidance, no state changed
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExtensionError::MissingCredential
                | ExtensionError::MissingModel
                | ExtensionError::MissingPrompt
                | ExtensionError::NothingToExport
        )
    }

    /// Text rendered into the popup's output area
    pub fn user_message(&self) -> String {
        if self.is_precondition() {
            self.to_string()
        } else {
            format!("Error: {}", self)
        }
    }
}
