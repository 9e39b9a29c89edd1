//! The analysis operations exposed by the gateway.
//!
//! [`Operation`] is the closed registry of operation names. Each operation decodes
//! its own request shape, builds a prompt, calls the model once, and maps the reply
//! onto its own result shape, substituting that operation's named fallback for
//! anything the model fails to provide.

pub mod admin_insights;
pub mod full_analyze;
pub mod generate_email;
pub mod generate_reminder;
pub mod personal_report;
pub mod quick_triage;
pub mod status_explain;
pub mod user_chat;

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::{extract_json_object, Error, Fields, GenerationParams, ModelCall, Result};
use tracing::warn;

use crate::router::INTROSPECTION_PATHS;

/// Every operation the gateway routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    QuickTriage,
    FullAnalyze,
    StatusExplain,
    GenerateEmail,
    UserChat,
    PersonalReport,
    AdminInsights,
    GenerateReminder,
}

impl Operation {
    /// Registry order, as listed by the introspection endpoint.
    pub const ALL: [Operation; 8] = [
        Operation::QuickTriage,
        Operation::FullAnalyze,
        Operation::StatusExplain,
        Operation::GenerateEmail,
        Operation::UserChat,
        Operation::PersonalReport,
        Operation::AdminInsights,
        Operation::GenerateReminder,
    ];

    /// Path segment the operation is served under.
    pub fn name(self) -> &'static str {
        match self {
            Operation::QuickTriage => "quick-triage",
            Operation::FullAnalyze => "full-analyze",
            Operation::StatusExplain => "status-explain",
            Operation::GenerateEmail => "generate-email",
            Operation::UserChat => "user-chat",
            Operation::PersonalReport => "personal-report",
            Operation::AdminInsights => "admin-insights",
            Operation::GenerateReminder => "generate-reminder",
        }
    }

    /// Look up an operation by its exact path segment.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == path)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.name()).collect()
    }

    pub fn params(self) -> GenerationParams {
        match self {
            Operation::QuickTriage => quick_triage::PARAMS,
            Operation::FullAnalyze => full_analyze::PARAMS,
            Operation::StatusExplain => status_explain::PARAMS,
            Operation::GenerateEmail => generate_email::PARAMS,
            Operation::UserChat => user_chat::PARAMS,
            Operation::PersonalReport => personal_report::PARAMS,
            Operation::AdminInsights => admin_insights::PARAMS,
            Operation::GenerateReminder => generate_reminder::PARAMS,
        }
    }

    /// Check the registry at startup: names are unique, round-trip through
    /// [`Operation::from_path`], and do not shadow an introspection path.
    pub fn validate_registry() -> Result<()> {
        let mut seen = HashSet::new();
        for op in Self::ALL {
            let name = op.name();
            if !seen.insert(name) {
                return Err(Error::Internal(format!("Duplicate operation name '{}'", name)));
            }
            if INTROSPECTION_PATHS.contains(&name) {
                return Err(Error::Internal(format!(
                    "Operation '{}' shadows an introspection path",
                    name
                )));
            }
            if Self::from_path(name) != Some(op) {
                return Err(Error::Internal(format!(
                    "Operation '{}' does not resolve to itself",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Decode a POST body into this operation's request shape.
    pub fn decode(self, body: &[u8]) -> Result<AnalysisRequest> {
        Ok(match self {
            Operation::QuickTriage => AnalysisRequest::QuickTriage(parse_body(body)?),
            Operation::FullAnalyze => AnalysisRequest::FullAnalyze(parse_body(body)?),
            Operation::StatusExplain => AnalysisRequest::StatusExplain(parse_body(body)?),
            Operation::GenerateEmail => AnalysisRequest::GenerateEmail(parse_body(body)?),
            Operation::UserChat => AnalysisRequest::UserChat(parse_body(body)?),
            Operation::PersonalReport => AnalysisRequest::PersonalReport(parse_body(body)?),
            Operation::AdminInsights => AnalysisRequest::AdminInsights(parse_body(body)?),
            Operation::GenerateReminder => AnalysisRequest::GenerateReminder(parse_body(body)?),
        })
    }
}

/// A decoded request, one variant per operation.
#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    QuickTriage(quick_triage::TriageRequest),
    FullAnalyze(full_analyze::AnalyzeRequest),
    StatusExplain(status_explain::StatusExplainRequest),
    GenerateEmail(generate_email::EmailRequest),
    UserChat(user_chat::ChatRequest),
    PersonalReport(personal_report::ReportRequest),
    AdminInsights(admin_insights::InsightsRequest),
    GenerateReminder(generate_reminder::ReminderRequest),
}

impl AnalysisRequest {
    /// Run the operation. Never fails: every upstream or parsing failure has
    /// already been replaced by the operation's fallback.
    pub async fn run(self, model: &ModelCall<'_>) -> AnalysisResult {
        match self {
            AnalysisRequest::QuickTriage(req) => {
                AnalysisResult::QuickTriage(quick_triage::run(req, model).await)
            }
            AnalysisRequest::FullAnalyze(req) => {
                AnalysisResult::FullAnalyze(full_analyze::run(req, model).await)
            }
            AnalysisRequest::StatusExplain(req) => {
                AnalysisResult::StatusExplain(status_explain::run(req, model).await)
            }
            AnalysisRequest::GenerateEmail(req) => {
                AnalysisResult::GenerateEmail(generate_email::run(req, model).await)
            }
            AnalysisRequest::UserChat(req) => {
                AnalysisResult::UserChat(user_chat::run(req, model).await)
            }
            AnalysisRequest::PersonalReport(req) => {
                AnalysisResult::PersonalReport(personal_report::run(req, model).await)
            }
            AnalysisRequest::AdminInsights(req) => {
                AnalysisResult::AdminInsights(admin_insights::run(req, model).await)
            }
            AnalysisRequest::GenerateReminder(req) => {
                AnalysisResult::GenerateReminder(generate_reminder::run(req, model).await)
            }
        }
    }
}

/// A result, one variant per operation. Serializes as the bare variant body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    QuickTriage(quick_triage::Triage),
    FullAnalyze(full_analyze::Analysis),
    StatusExplain(status_explain::StatusExplanation),
    GenerateEmail(generate_email::EmailDraft),
    UserChat(user_chat::ChatReply),
    PersonalReport(personal_report::PersonalReport),
    AdminInsights(admin_insights::AdminInsights),
    GenerateReminder(generate_reminder::Reminder),
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))?;
    if !value.is_object() {
        return Err(Error::Validation(
            "Invalid request body: expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))
}

/// Call the model and recover a JSON object from its reply.
///
/// `None` covers both an upstream failure and an unusable reply; callers treat
/// them the same.
async fn generate_fields(op: Operation, model: &ModelCall<'_>, prompt: &str) -> Option<Fields> {
    match model.generate(prompt, op.params()).await {
        Ok(raw) => {
            let fields = extract_json_object(&raw);
            if fields.is_none() {
                warn!("{}: model reply had no usable JSON object, using fallback", op.name());
            }
            fields
        }
        Err(e) => {
            warn!("{}: {}, using fallback", op.name(), e);
            None
        }
    }
}

/// Call the model for a plain-text answer. Blank text counts as a failure.
async fn generate_text(op: Operation, model: &ModelCall<'_>, prompt: &str) -> Option<String> {
    match model.generate(prompt, op.params()).await {
        Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        Ok(_) => {
            warn!("{}: model reply was blank, using fallback", op.name());
            None
        }
        Err(e) => {
            warn!("{}: {}, using fallback", op.name(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_valid() {
        Operation::validate_registry().unwrap();
    }

    #[test]
    fn test_from_path_is_exact() {
        assert_eq!(Operation::from_path("full-analyze"), Some(Operation::FullAnalyze));
        assert_eq!(Operation::from_path("generate-reminder"), Some(Operation::GenerateReminder));
        assert_eq!(Operation::from_path("/full-analyze"), None);
        assert_eq!(Operation::from_path("Full-Analyze"), None);
        assert_eq!(Operation::from_path("full-analyze/"), None);
        assert_eq!(Operation::from_path(""), None);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        let bodies: [&[u8]; 5] = [b"", b"not json", b"[1,2]", b"\"text\"", b"null"];
        for body in bodies {
            let err = Operation::QuickTriage.decode(body).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "body {:?}", body);
        }
    }

    #[test]
    fn test_decode_accepts_empty_object() {
        for op in Operation::ALL {
            assert!(op.decode(b"{}").is_ok(), "{} should accept {{}}", op.name());
        }
    }

    #[test]
    fn test_decode_tolerates_mistyped_fields() {
        let body = br#"{
            "text": null,
            "description": 7,
            "imageUrl": 42,
            "status": 3,
            "type": ["strict"],
            "userId": false,
            "query": {},
            "complaint": "abc",
            "complaints": [{"status": "Resolved"}, "oops", null]
        }"#;
        for op in Operation::ALL {
            assert!(op.decode(body).is_ok(), "{} rejected mistyped fields", op.name());
        }
        let bad_list: &[u8] = br#"{"complaints": "abc"}"#;
        assert!(Operation::PersonalReport.decode(bad_list).is_ok());
    }

    #[test]
    fn test_params_are_bounded() {
        for op in Operation::ALL {
            let params = op.params();
            assert!((0.0..=1.0).contains(&params.temperature), "{}", op.name());
            assert!(params.max_output_tokens <= 1024, "{}", op.name());
        }
    }
}
