/// Constants and API configuration for Gemini Web Companion
use serde::{Deserialize, Serialize};

/// chrome.storage.local key holding the named credential list
pub const CREDENTIALS_KEY: &str = "geminiApiKeys";

/// Pre-1.0 storage key holding a single bare API key string
pub const LEGACY_CREDENTIAL_KEY: &str = "geminiApiKey";

/// chrome.storage.local key holding the prompt list
pub const PROMPTS_KEY: &str = "prompts";

/// Name given to a credential migrated from the legacy record
pub const MIGRATED_CREDENTIAL_NAME: &str = "Default";

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Capability a model must advertise to be offered in the popup
pub const GENERATE_CONTENT_METHOD: &str = "generateContent";

// Archive members
pub const SOURCE_MEMBER: &str = "source.html";
pub const OUTPUT_MEMBER: &str = "output.txt";
pub const SCREENSHOT_MEMBER: &str = "screenshot.png";
pub const METADATA_MEMBER: &str = "metadata.txt";

pub const ARCHIVE_PREFIX: &str = "gemini-results-";

/// How long the options page keeps a status line visible
pub const STATUS_DISPLAY_MS: i32 = 2000;

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
