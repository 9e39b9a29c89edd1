//! `generate-reminder`: a short nudge about a complaint that is still open.

use serde::{Deserialize, Serialize};
use shared::models::lenient_snapshot;
use shared::{ComplaintSnapshot, GenerationParams, ModelCall};

use super::{generate_text, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.7,
    max_output_tokens: 256,
};

pub const FALLBACK_REMINDER: &str =
    "Friendly reminder: your complaint is still being tracked. We'll notify you as soon as there is an update.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderRequest {
    #[serde(default, deserialize_with = "lenient_snapshot")]
    pub complaint: Option<ComplaintSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub reminder: String,
}

pub fn prompt(complaint: &ComplaintSnapshot) -> String {
    format!(
        r#"Write a short, polite reminder (2 sentences, plain text, no JSON) for a resident about their open complaint. Mention what the complaint is about and reassure them it is being tracked.

Complaint details:
{}"#,
        complaint.describe()
    )
}

pub async fn run(request: ReminderRequest, model: &ModelCall<'_>) -> Reminder {
    let complaint = request.complaint.unwrap_or_default();
    let reminder = generate_text(Operation::GenerateReminder, model, &prompt(&complaint))
        .await
        .unwrap_or_else(|| FALLBACK_REMINDER.to_string());
    Reminder { reminder }
}
