/// Content script message contract: `{action: "getSourceCode"}` -> `{sourceCode}`
use serde::{Deserialize, Serialize};

pub const GET_SOURCE_CODE: &str = "getSourceCode";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub action: String,
}

impl ContentRequest {
    pub fn get_source_code() -> Self {
        ContentRequest {
            action: GET_SOURCE_CODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCodeResponse {
    pub source_code: String,
}

/// Answer a runtime message. Only markup-extraction requests get a response;
/// `markup` is read lazily so other messages never touch the DOM.
pub fn respond<F>(message: &serde_json::Value, markup: F) -> Option<SourceCodeResponse>
where
    F: FnOnce() -> String,
{
    let request: ContentRequest = serde_json::from_value(message.clone()).ok()?;
    if request.action != GET_SOURCE_CODE {
        return None;
    }
    Some(SourceCodeResponse {
        source_code: markup(),
    })
}

/// Full serialized HTML of the current document, outer `<html>` element included
pub fn document_markup() -> Option<String> {
    let document = web_sys::window()?.document()?;
    Some(document.document_element()?.outer_html())
}
