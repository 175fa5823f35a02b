//! Generative Language API client: model catalog and content generation.

use crate::config::{ApiConfig, GENERATE_CONTENT_METHOD};
use crate::error::ExtensionError;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use url::Url;

/// Status and raw body of an HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by [`GeminiClient`]
#[async_trait(?Send)]
pub trait HttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ExtensionError>;

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, ExtensionError>;
}

/// `reqwest` transport; on wasm32 this goes through the page's `fetch`
#[derive(Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, ExtensionError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExtensionError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ExtensionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtensionError::Network(e.to_string()))?;
        Self::read(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, ExtensionError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ExtensionError::Network(e.to_string()))?;
        Self::read(response).await
    }
}

/// One entry of the model catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Endpoint id, e.g. `models/gemini-1.5-flash`
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<TextPart>,
}

/// Request envelope: the prompt followed by the page markup, as two parts of one content entry
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, markup: &str) -> Self {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    TextPart {
                        text: Some(prompt.to_string()),
                    },
                    TextPart {
                        text: Some(markup.to_string()),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate; `Ok(None)` when there are no candidates
    pub fn first_text(&self) -> Result<Option<String>, ExtensionError> {
        let Some(candidate) = self.candidates.first() else {
            return Ok(None);
        };
        candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.clone())
            .map(Some)
            .ok_or_else(|| ExtensionError::MalformedResponse("candidate has no text part".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Client for the two endpoints the popup uses. Credentials travel as the
/// `key` query parameter on both.
#[derive(Clone)]
pub struct GeminiClient {
    http: Rc<dyn HttpClient>,
    config: ApiConfig,
}

impl GeminiClient {
    pub fn new(http: Rc<dyn HttpClient>, config: ApiConfig) -> Self {
        GeminiClient { http, config }
    }

    fn endpoint(&self, path: &str, api_key: &str) -> Result<Url, ExtensionError> {
        let mut url = Url::parse(&format!("{}/{}", self.config.base_url, path))?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    /// Models usable for content generation, in catalog order. Not cached.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<ModelDescriptor>, ExtensionError> {
        let url = self.endpoint("models", api_key)?;
        debug!("Fetching model catalog");

        let response = self.http.get(url.as_str()).await?;
        if !response.is_success() {
            return Err(ExtensionError::HttpStatus(response.status));
        }

        let list: ModelList = serde_json::from_str(&response.body)?;
        Ok(list
            .models
            .into_iter()
            .filter(|model| model.supports(GENERATE_CONTENT_METHOD))
            .collect())
    }

    /// Send `prompt` and `markup` to `model`; `Ok(None)` when the API returned no candidates
    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        markup: &str,
    ) -> Result<Option<String>, ExtensionError> {
        let url = self.endpoint(&format!("{}:{}", model, GENERATE_CONTENT_METHOD), api_key)?;
        let body = serde_json::to_value(GenerateContentRequest::new(prompt, markup))?;
        debug!("generateContent: model={} markup_len={}", model, markup.len());

        let response = self.http.post_json(url.as_str(), &body).await?;
        if !response.is_success() {
            let message = match serde_json::from_str::<ErrorEnvelope>(&response.body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => response.body.clone(),
            };
            warn!("API error {}: {}", response.status, message);
            return Err(ExtensionError::Api {
                status: response.status,
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response.body)?;
        parsed.first_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHttp;
    use futures::executor::block_on;
    use serde_json::json;

    fn client(http: &Rc<MockHttp>) -> GeminiClient {
        GeminiClient::new(http.clone(), ApiConfig::default())
    }

    #[test]
    fn test_list_models_filters_generation_capable() {
        let http = Rc::new(MockHttp::new());
        http.respond(
            "/models?",
            200,
            json!({"models": [
                {"name": "models/embedding-001", "displayName": "Embedding", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-pro", "displayName": "Gemini Pro", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/gemini-flash", "displayName": "Gemini Flash", "supportedGenerationMethods": ["generateContent"]}
            ]}),
        );

        let models = block_on(client(&http).list_models("test-api-key")).unwrap();

        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["models/gemini-pro", "models/gemini-flash"]);
        assert!(http.requests()[0].url.contains("models?key=test-api-key"));
    }

    #[test]
    fn test_list_models_http_failure() {
        let http = Rc::new(MockHttp::new());
        http.respond("/models?", 403, json!({"error": {"message": "denied"}}));

        let err = block_on(client(&http).list_models("bad")).unwrap_err();

        assert!(matches!(err, ExtensionError::HttpStatus(403)));
    }

    #[test]
    fn test_list_models_body_without_models_is_an_error() {
        let http = Rc::new(MockHttp::new());
        http.respond("/models?", 200, json!({}));

        let err = block_on(client(&http).list_models("k")).unwrap_err();

        assert!(matches!(err, ExtensionError::Json(_)));
    }

    #[test]
    fn test_list_models_network_failure() {
        let http = Rc::new(MockHttp::new());

        let err = block_on(client(&http).list_models("k")).unwrap_err();

        assert!(matches!(err, ExtensionError::Network(_)));
    }

    #[test]
    fn test_generate_content_request_shape() {
        let http = Rc::new(MockHttp::new());
        http.respond(
            ":generateContent",
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "Gemini Response"}]}}]}),
        );

        let text = block_on(client(&http).generate_content(
            "test-api-key",
            "models/gemini-pro",
            "Summarize this page",
            "<html></html>",
        ))
        .unwrap();

        assert_eq!(text.as_deref(), Some("Gemini Response"));
        let request = &http.requests()[0];
        assert_eq!(
            request.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent?key=test-api-key"
        );
        assert_eq!(
            request.body,
            Some(json!({"contents": [{"parts": [
                {"text": "Summarize this page"},
                {"text": "<html></html>"}
            ]}]}))
        );
    }

    #[test]
    fn test_generate_content_no_candidates() {
        let http = Rc::new(MockHttp::new());
        http.respond(":generateContent", 200, json!({}));

        let text = block_on(client(&http).generate_content("k", "models/m", "p", "m")).unwrap();

        assert_eq!(text, None);
    }

    #[test]
    fn test_generate_content_api_error_message() {
        let http = Rc::new(MockHttp::new());
        http.respond(
            ":generateContent",
            400,
            json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}),
        );

        let err = block_on(client(&http).generate_content("k", "models/m", "p", "m")).unwrap_err();

        assert_eq!(err.to_string(), "HTTP error! status: 400 - API key not valid");
    }

    #[test]
    fn test_first_text_without_parts_is_malformed() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": []}}]})).unwrap();

        assert!(matches!(
            response.first_text(),
            Err(ExtensionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_api_key_is_query_encoded() {
        let http = Rc::new(MockHttp::new());
        http.respond("/models?", 200, json!({"models": []}));

        block_on(client(&http).list_models("a&b")).unwrap();

        assert!(http.requests()[0].url.ends_with("models?key=a%26b"));
    }
}
