//! `status-explain`: tell a resident, in plain words, what a status change means.

use serde::{Deserialize, Serialize};
use shared::models::{lenient_snapshot, lenient_text};
use shared::{ComplaintSnapshot, GenerationParams, ModelCall};

use super::{generate_text, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.7,
    max_output_tokens: 256,
};

pub const PENDING_EXPLANATION: &str =
    "Your complaint has been received and is waiting to be reviewed by our team.";
pub const IN_PROGRESS_EXPLANATION: &str =
    "Good news! Our team is actively working on resolving your complaint.";
pub const RESOLVED_EXPLANATION: &str = "Great news! Your complaint has been successfully resolved.";
pub const REJECTED_EXPLANATION: &str =
    "Unfortunately, your complaint could not be processed. Please contact support for more details.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusExplainRequest {
    #[serde(default, deserialize_with = "lenient_snapshot")]
    pub complaint: Option<ComplaintSnapshot>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusExplanation {
    pub explanation: String,
}

/// Canned explanation for a target status. Unknown statuses read as pending.
pub fn fallback_explanation(status: &str) -> &'static str {
    match status.trim().to_ascii_lowercase().as_str() {
        "in progress" | "in-progress" | "in_progress" => IN_PROGRESS_EXPLANATION,
        "resolved" => RESOLVED_EXPLANATION,
        "rejected" => REJECTED_EXPLANATION,
        _ => PENDING_EXPLANATION,
    }
}

pub fn prompt(complaint: &ComplaintSnapshot, status: &str) -> String {
    format!(
        r#"You are a friendly support assistant. A resident's complaint has just moved to the status "{status}".

Complaint details:
{details}

In 2-3 sentences of plain text, explain to the resident what this status means for them and what they can expect next. Do not use JSON, markdown, or a greeting line."#,
        details = complaint.describe(),
    )
}

pub async fn run(request: StatusExplainRequest, model: &ModelCall<'_>) -> StatusExplanation {
    let complaint = request.complaint.unwrap_or_default();
    let status = request.status.unwrap_or_default();
    let explanation = generate_text(Operation::StatusExplain, model, &prompt(&complaint, &status))
        .await
        .unwrap_or_else(|| fallback_explanation(&status).to_string());
    StatusExplanation { explanation }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_by_status() {
        assert_eq!(fallback_explanation("Resolved"), RESOLVED_EXPLANATION);
        assert_eq!(fallback_explanation("resolved "), RESOLVED_EXPLANATION);
        assert_eq!(fallback_explanation("In Progress"), IN_PROGRESS_EXPLANATION);
        assert_eq!(fallback_explanation("Rejected"), REJECTED_EXPLANATION);
        assert_eq!(fallback_explanation("Pending"), PENDING_EXPLANATION);
        assert_eq!(fallback_explanation("Escalated"), PENDING_EXPLANATION);
        assert_eq!(fallback_explanation(""), PENDING_EXPLANATION);
    }

    #[test]
    fn test_prompt_includes_status_and_details() {
        let complaint = ComplaintSnapshot {
            description: Some("Lift stuck on floor 3".to_string()),
            ..Default::default()
        };
        let text = prompt(&complaint, "In Progress");
        assert!(text.contains("\"In Progress\""));
        assert!(text.contains("Lift stuck on floor 3"));
    }
}
