/// Data structures persisted by Gemini Web Companion
use crate::config::{CREDENTIALS_KEY, PROMPTS_KEY};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// An entry kept as one element of an ordered list under a single storage key.
/// Identity is the element's position in that list.
pub trait Record: Clone + Serialize + DeserializeOwned {
    const STORAGE_KEY: &'static str;

    /// Label shown in lists and selects
    fn label(&self) -> &str;
}

/// A named API key for the generative language API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub name: String,
    pub key: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Credential {
        Credential {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Key as displayed on the options page: "..." followed by the last four characters
    pub fn masked_key(&self) -> String {
        let count = self.key.chars().count();
        let tail: String = self.key.chars().skip(count.saturating_sub(4)).collect();
        format!("...{}", tail)
    }
}

impl Record for Credential {
    const STORAGE_KEY: &'static str = CREDENTIALS_KEY;

    fn label(&self) -> &str {
        &self.name
    }
}

/// A named, reusable instruction sent ahead of the page markup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prompt {
    pub name: String,
    pub text: String,
}

impl Prompt {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Prompt {
        Prompt {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl Record for Prompt {
    const STORAGE_KEY: &'static str = PROMPTS_KEY;

    fn label(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key() {
        let credential = Credential::new("work", "AIzaSyABCDEF1234");
        assert_eq!(credential.masked_key(), "...1234");
    }

    #[test]
    fn test_masked_key_short() {
        assert_eq!(Credential::new("a", "xy").masked_key(), "...xy");
        assert_eq!(Credential::new("a", "").masked_key(), "...");
    }

    #[test]
    fn test_credential_wire_format() {
        let json = serde_json::to_value(Credential::new("test", "test-api-key")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "test", "key": "test-api-key"}));
    }

    #[test]
    fn test_prompt_deserialization() {
        let prompt: Prompt =
            serde_json::from_str(r#"{"name":"Test Prompt","text":"Summarize this page"}"#).unwrap();

        assert_eq!(prompt.label(), "Test Prompt");
        assert_eq!(prompt.text, "Summarize this page");
    }
}
