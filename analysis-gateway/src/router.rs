//! Request routing: CORS preflight, introspection, path-to-operation dispatch.

use std::sync::Arc;

use lambda_http::http::Method;
use lambda_http::{Body, Error, Request, Response};
use serde::Serialize;
use shared::http::{error_response, json_response, preflight_response};
use shared::{Config, GeminiClient, ModelCall};
use tracing::{error, info, warn};

use crate::operations::{AnalysisResult, Operation};

/// Paths (after stripping the leading `/`) answered with the endpoint listing.
pub const INTROSPECTION_PATHS: [&str; 2] = ["", "health"];

/// Body of the introspection response.
#[derive(Debug, Serialize)]
pub struct Introspection {
    pub status: &'static str,
    pub service: &'static str,
    pub endpoints: Vec<&'static str>,
}

impl Introspection {
    pub fn current() -> Self {
        Self {
            status: "ok",
            service: "analysis-gateway",
            endpoints: Operation::names(),
        }
    }
}

/// Per-process handles. Holds no request data between invocations.
pub struct Gateway {
    config: Config,
    model: GeminiClient,
}

impl Gateway {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        let model = GeminiClient::new(http, &config);
        Self { config, model }
    }

    pub fn from_env() -> Self {
        Self::new(Config::from_env(), reqwest::Client::new())
    }

    /// Answer one HTTP request.
    pub async fn handle(&self, event: Request) -> Result<Response<Body>, Error> {
        let method = event.method().clone();
        let raw_path = event.uri().path();
        let path = raw_path.strip_prefix('/').unwrap_or(raw_path);

        info!("Received request: method={}, path={}", method, raw_path);

        if method == Method::OPTIONS {
            return preflight_response();
        }

        if INTROSPECTION_PATHS.contains(&path) {
            return json_response(200, &Introspection::current());
        }

        match self.dispatch(&method, path, event.body().as_ref()).await {
            Ok(result) => json_response(200, &result),
            Err(e) => {
                let status = e.status_code();
                if status >= 500 {
                    error!("Request to '{}' failed: {}", path, e);
                } else {
                    warn!("Rejected request to '{}': {}", path, e);
                }
                error_response(status, e.to_string())
            }
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> shared::Result<AnalysisResult> {
        let op = Operation::from_path(path)
            .ok_or_else(|| shared::Error::NotFound(format!("Unknown endpoint '{}'", path)))?;

        if *method != Method::POST {
            return Err(shared::Error::MethodNotAllowed(format!(
                "'{}' only accepts POST, got {}",
                op.name(),
                method
            )));
        }

        let request = op.decode(body)?;
        let api_key = self.config.api_key()?;
        let model = ModelCall::new(&self.model, api_key);

        Ok(request.run(&model).await)
    }
}

/// Lambda entry point.
pub async fn handler(gateway: Arc<Gateway>, event: Request) -> Result<Response<Body>, Error> {
    gateway.handle(event).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http;

    fn gateway() -> Gateway {
        Gateway::new(
            Config {
                api_key_var: "ROUTER_TEST_UNSET_KEY".to_string(),
                model: "test-model".to_string(),
                // nothing listens here; these tests never reach the model
                api_base: "http://127.0.0.1:9".to_string(),
                upstream_timeout: std::time::Duration::from_secs(1),
            },
            reqwest::Client::new(),
        )
    }

    fn request(method: &str, path: &str, body: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(format!("https://gateway.example{}", path))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_introspection_on_any_method() {
        for (method, path) in [("GET", "/"), ("POST", "/health"), ("DELETE", "/health")] {
            let response = gateway().handle(request(method, path, "")).await.unwrap();
            assert_eq!(response.status(), 200);
            let body = json(&response);
            assert_eq!(body["status"], "ok");
            assert_eq!(body["endpoints"].as_array().unwrap().len(), Operation::ALL.len());
        }
    }

    #[tokio::test]
    async fn test_missing_credential_is_500_without_leaking() {
        let response = gateway()
            .handle(request("POST", "/quick-triage", r#"{"text":"leak"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(
            json(&response)["error"],
            "Configuration error: ROUTER_TEST_UNSET_KEY is not configured"
        );
    }

    #[tokio::test]
    async fn test_bad_body_reported_before_credential() {
        let response = gateway()
            .handle(request("POST", "/full-analyze", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let message = json(&response)["error"].as_str().unwrap().to_string();
        assert!(message.starts_with("Validation error: Invalid request body"), "{}", message);
    }
}
