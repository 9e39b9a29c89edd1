//! `generate-email`: draft a follow-up email about a complaint in a chosen tone.

use serde::{Deserialize, Serialize};
use shared::models::{lenient_snapshot, lenient_text};
use shared::{ComplaintSnapshot, GenerationParams, ModelCall};

use super::{generate_text, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.7,
    max_output_tokens: 1024,
};

/// Tone selector for the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTone {
    Strict,
    Friendly,
    Report,
}

impl EmailTone {
    /// Unknown or missing selectors read as friendly.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("strict") | Some("formal") => EmailTone::Strict,
            Some("report") | Some("report-style") | Some("report_style") => EmailTone::Report,
            _ => EmailTone::Friendly,
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            EmailTone::Strict => "firm, formal and direct; insist on a prompt resolution and a timeline",
            EmailTone::Friendly => "warm, polite and appreciative while still asking for an update",
            EmailTone::Report => "neutral and factual, structured like an incident report with clear headings",
        }
    }

    fn greeting(self) -> &'static str {
        match self {
            EmailTone::Strict => "Dear Sir/Madam,",
            EmailTone::Friendly => "Hello,",
            EmailTone::Report => "To the Complaints Review Team,",
        }
    }

    fn closing(self) -> &'static str {
        match self {
            EmailTone::Strict => "I expect this matter to be addressed without further delay and would appreciate a written timeline for its resolution.",
            EmailTone::Friendly => "Thank you so much for your help. I look forward to hearing from you.",
            EmailTone::Report => "Please record the details above and advise on the next steps.",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    #[serde(default, deserialize_with = "lenient_snapshot")]
    pub complaint: Option<ComplaintSnapshot>,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDraft {
    pub email: String,
}

/// Minimal templated email built straight from the snapshot.
pub fn fallback_email(complaint: &ComplaintSnapshot, tone: EmailTone) -> String {
    let mut email = format!(
        "Subject: Follow-up on complaint: {category}\n\n{greeting}\n\nI am writing regarding my complaint filed on {filed}:\n\n\"{description}\"\n\nCategory: {category}\nCurrent status: {status}\n\n{closing}\n\nSincerely,\nA Concerned Resident",
        category = complaint.category_or_default(),
        greeting = tone.greeting(),
        filed = complaint.filed_on(),
        description = complaint.description_or_default(),
        status = complaint.status_or_default(),
        closing = tone.closing(),
    );
    if let Some(id) = &complaint.id {
        email.push_str(&format!("\nComplaint reference: {}", id));
    }
    email
}

pub fn prompt(complaint: &ComplaintSnapshot, tone: EmailTone) -> String {
    format!(
        r#"Write an email from a resident to the facilities administration about the complaint below. The tone should be {instructions}.

Complaint details:
{details}

Include a subject line (starting with "Subject:"), a greeting, a body of 2-3 short paragraphs, and a sign-off with signature "A Concerned Resident". Return plain text only, no JSON or markdown."#,
        instructions = tone.instructions(),
        details = complaint.describe(),
    )
}

pub async fn run(request: EmailRequest, model: &ModelCall<'_>) -> EmailDraft {
    let complaint = request.complaint.unwrap_or_default();
    let tone = EmailTone::from_label(request.tone.as_deref());
    let email = generate_text(Operation::GenerateEmail, model, &prompt(&complaint, tone))
        .await
        .unwrap_or_else(|| fallback_email(&complaint, tone));
    EmailDraft { email }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_labels() {
        assert_eq!(EmailTone::from_label(Some("strict")), EmailTone::Strict);
        assert_eq!(EmailTone::from_label(Some("Report")), EmailTone::Report);
        assert_eq!(EmailTone::from_label(Some("friendly")), EmailTone::Friendly);
        assert_eq!(EmailTone::from_label(Some("sarcastic")), EmailTone::Friendly);
        assert_eq!(EmailTone::from_label(None), EmailTone::Friendly);
    }

    #[test]
    fn test_fallback_uses_snapshot_fields() {
        let complaint: ComplaintSnapshot = serde_json::from_str(
            r#"{"id":"c-42","description":"No hot water since Monday","category":"Plumbing",
                "status":"Pending","createdAt":"2024-05-02T08:00:00Z"}"#,
        )
        .unwrap();
        let email = fallback_email(&complaint, EmailTone::Strict);

        assert!(email.starts_with("Subject: Follow-up on complaint: Plumbing"));
        assert!(email.contains("Dear Sir/Madam,"));
        assert!(email.contains("\"No hot water since Monday\""));
        assert!(email.contains("filed on 2024-05-02"));
        assert!(email.contains("Current status: Pending"));
        assert!(email.contains("Sincerely,\nA Concerned Resident"));
        assert!(email.ends_with("Complaint reference: c-42"));
    }

    #[test]
    fn test_fallback_with_empty_snapshot() {
        let email = fallback_email(&ComplaintSnapshot::default(), EmailTone::Friendly);
        assert!(email.contains("Subject: Follow-up on complaint: Not specified"));
        assert!(email.contains("Hello,"));
        assert!(!email.contains("Complaint reference"));
    }
}
