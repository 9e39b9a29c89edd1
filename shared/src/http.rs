//! HTTP helpers for the gateway Lambda.
//!
//! Every response leaving the gateway, including preflight and error responses,
//! carries the same permissive cross-origin headers and a JSON content type.

use lambda_http::{Body, Response};
use serde::Serialize;

/// Cross-origin headers attached to every response.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// Error body returned for every non-200 response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn builder(status: u16) -> lambda_http::http::response::Builder {
    CORS_HEADERS.iter().fold(
        Response::builder()
            .status(status)
            .header("Content-Type", "application/json"),
        |builder, (name, value)| builder.header(*name, *value),
    )
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    let json = serde_json::to_string(data)?;
    Ok(builder(status).body(Body::from(json))?)
}

/// Create an `{error}` response with the given status code and message.
pub fn error_response(
    status: u16,
    message: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorBody {
            error: message.into(),
        },
    )
}

/// Answer a cross-origin preflight: 200, headers only, no body.
pub fn preflight_response() -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(200).body(Body::Empty)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cors(response: &Response<Body>) {
        for (name, value) in CORS_HEADERS {
            assert_eq!(response.headers()[name], value);
        }
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_error_response_shape() {
        let response = error_response(404, "Not found: nope").unwrap();
        assert_eq!(response.status(), 404);
        assert_cors(&response);

        let body: serde_json::Value = serde_json::from_slice(response.body().as_ref()).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Not found: nope"}));
    }

    #[test]
    fn test_preflight_has_no_body() {
        let response = preflight_response().unwrap();
        assert_eq!(response.status(), 200);
        assert_cors(&response);
        assert!(response.body().is_empty());
    }
}
