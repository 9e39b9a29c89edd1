//! Configuration management for the gateway Lambda.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Environment variable holding the upstream credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Default upstream model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Default upstream API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default upstream timeout. Keep it below the Lambda function timeout so a hung
/// call still ends in the operation's fallback.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Application configuration loaded from environment variables.
///
/// Only the *name* of the credential variable is held here; the secret itself is
/// read fresh for every request through [`Config::api_key`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the environment variable carrying the upstream API key
    pub api_key_var: String,
    /// Upstream model name
    pub model: String,
    /// Upstream API base URL (no trailing slash)
    pub api_base: String,
    /// Upper bound on one upstream call, connect through body
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key_var: API_KEY_VAR.to_string(),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_base: env::var("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            upstream_timeout: Duration::from_secs(
                env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|secs| secs.trim().parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    /// Read the upstream credential for the current request.
    ///
    /// A missing or blank value is a configuration error. The error message names the
    /// variable, never its value.
    pub fn api_key(&self) -> Result<String> {
        match env::var(&self.api_key_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::Config(format!(
                "{} is not configured",
                self.api_key_var
            ))),
        }
    }
}
