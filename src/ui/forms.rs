/// Form drafts for the prompt editor and the credential editor.
/// `index` is `Some` when editing an existing entry, `None` when adding.
use crate::records::{Credential, Prompt};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptDraft {
    pub index: Option<usize>,
    pub name: String,
    pub text: String,
}

impl PromptDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(index: usize, prompt: &Prompt) -> Self {
        PromptDraft {
            index: Some(index),
            name: prompt.name.clone(),
            text: prompt.text.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.text.is_empty()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.index.is_some() {
            "Update Prompt"
        } else {
            "Save Prompt"
        }
    }

    pub fn to_prompt(&self) -> Prompt {
        Prompt::new(self.name.clone(), self.text.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialDraft {
    pub index: Option<usize>,
    pub name: String,
    pub key: String,
}

impl CredentialDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing(index: usize, credential: &Credential) -> Self {
        CredentialDraft {
            index: Some(index),
            name: credential.name.clone(),
            key: credential.key.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.key.is_empty()
    }

    pub fn title(&self) -> &'static str {
        if self.index.is_some() {
            "Edit API Key"
        } else {
            "Add API Key"
        }
    }

    pub fn to_credential(&self) -> Credential {
        Credential::new(self.name.clone(), self.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_draft_labels() {
        assert_eq!(PromptDraft::new().submit_label(), "Save Prompt");

        let draft = PromptDraft::editing(2, &Prompt::new("Summary", "Summarize"));
        assert_eq!(draft.submit_label(), "Update Prompt");
        assert_eq!(draft.index, Some(2));
        assert_eq!(draft.to_prompt(), Prompt::new("Summary", "Summarize"));
    }

    #[test]
    fn test_prompt_draft_requires_both_fields() {
        let mut draft = PromptDraft::new();
        draft.name = "Name only".to_string();
        assert!(!draft.is_complete());

        draft.text = "Body".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn test_credential_draft() {
        let draft = CredentialDraft::new();
        assert_eq!(draft.title(), "Add API Key");
        assert!(!draft.is_complete());

        let draft = CredentialDraft::editing(0, &Credential::new("work", "key-1"));
        assert_eq!(draft.title(), "Edit API Key");
        assert!(draft.is_complete());
        assert_eq!(draft.to_credential(), Credential::new("work", "key-1"));
    }
}
