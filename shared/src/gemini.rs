//! Client for the upstream Gemini `generateContent` API.
//!
//! This is the only layer that touches the credential. Callers receive a
//! [`ModelCall`] bound to a key for the duration of one request and get back the
//! model's raw text, unparsed.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::Config;

/// Header carrying the credential. Keeping it out of the URL keeps it out of
/// transport error messages too.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Fixed sampling parameters for one kind of call. Not caller-configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Failure talking to the upstream model.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Upstream reply contained no text output")]
    EmptyReply,

    #[error("Upstream reply envelope was malformed: {0}")]
    MalformedEnvelope(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first non-empty output segment of the first candidate.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .find(|text| !text.trim().is_empty())
    }
}

/// HTTP client for the upstream model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a client from a shared connection pool and the gateway config.
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            timeout: config.upstream_timeout,
        }
    }

    /// Get the model being used by this client
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    fn transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            warn!("Upstream model timed out after {:?}", self.timeout);
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(e)
        }
    }

    /// Send one prompt and return the model's raw reply text.
    ///
    /// One outbound call, no retry, no caching. The whole exchange, body included, is
    /// bounded by the configured timeout.
    pub async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, UpstreamError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        info!(
            "Calling upstream model: model={}, max_output_tokens={}",
            self.model, params.max_output_tokens
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream model returned status {}", status.as_u16());
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let envelope: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::MalformedEnvelope(e.to_string()))?;

        envelope.into_text().ok_or(UpstreamError::EmptyReply)
    }
}

/// A model client bound to one request's credential.
///
/// Operations hold this instead of the key itself.
pub struct ModelCall<'a> {
    client: &'a GeminiClient,
    api_key: String,
}

impl<'a> ModelCall<'a> {
    pub fn new(client: &'a GeminiClient, api_key: String) -> Self {
        Self { client, api_key }
    }

    /// Send one prompt with the bound credential.
    pub async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, UpstreamError> {
        self.client.generate(&self.api_key, prompt, params).await
    }
}

impl std::fmt::Debug for ModelCall<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCall")
            .field("model", &self.client.model())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PARAMS: GenerationParams = GenerationParams {
        temperature: 0.2,
        max_output_tokens: 64,
    };

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = Config {
            api_key_var: "UNUSED".to_string(),
            model: "test-model".to_string(),
            api_base: server.uri(),
            upstream_timeout: Duration::from_millis(500),
        };
        GeminiClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_returns_first_text_segment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "secret-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "hello"}]}],
                "generationConfig": {"maxOutputTokens": 64}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "  "}, {"text": "Hi there"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client.generate("secret-key", "hello", PARAMS).await.unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("secret-key", "hello", PARAMS)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Status(429)));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_hung_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"candidates": []}))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("secret-key", "hello", PARAMS)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_missing_candidates_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("secret-key", "hello", PARAMS)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::EmptyReply));
    }

    #[tokio::test]
    async fn test_garbage_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("secret-key", "hello", PARAMS)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config {
            api_key_var: "UNUSED".to_string(),
            model: "test-model".to_string(),
            api_base: "http://localhost".to_string(),
            upstream_timeout: Duration::from_secs(1),
        };
        let client = GeminiClient::new(Client::new(), &config);
        let call = ModelCall::new(&client, "super-secret".to_string());
        assert!(!format!("{:?}", call).contains("super-secret"));
    }
}
