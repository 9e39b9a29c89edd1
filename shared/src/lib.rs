//! Shared library for the complaint analysis gateway.
//!
//! This crate provides the error taxonomy, configuration, HTTP helpers, the upstream
//! language-model client and the untrusted-output parsing used by the gateway Lambda.

pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod http;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::{extract_json_object, Fields};
pub use gemini::{GeminiClient, GenerationParams, ModelCall, UpstreamError};
pub use models::ComplaintSnapshot;
