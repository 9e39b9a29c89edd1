//! `user-chat`: conversational answers about a resident's own complaints.

use serde::{Deserialize, Serialize};
use shared::models::{lenient_snapshots, lenient_text};
use shared::{ComplaintSnapshot, GenerationParams, ModelCall};

use super::{generate_text, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.7,
    max_output_tokens: 400,
};

/// Complaints included as context, from the front of the supplied list.
pub const CONTEXT_LIMIT: usize = 5;

pub const FALLBACK_RESPONSE: &str =
    "I'm sorry, I'm having trouble answering right now. Please try again in a moment.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient_snapshots")]
    pub complaints: Vec<ComplaintSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
}

pub fn prompt(query: &str, complaints: &[ComplaintSnapshot]) -> String {
    let context = if complaints.is_empty() {
        "The resident has no complaints on record.".to_string()
    } else {
        complaints
            .iter()
            .take(CONTEXT_LIMIT)
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c.one_line()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are a helpful assistant for a complaint management portal. Answer the resident's question using their recent complaints as context.

Recent complaints:
{context}

Resident's question: "{query}"

Reply in 2-4 sentences of plain, friendly text. Do not invent complaints that are not listed."#
    )
}

pub async fn run(request: ChatRequest, model: &ModelCall<'_>) -> ChatReply {
    let query = request.query.unwrap_or_default();
    let prompt = prompt(&query, &request.complaints);
    let response = generate_text(Operation::UserChat, model, &prompt)
        .await
        .unwrap_or_else(|| FALLBACK_RESPONSE.to_string());
    ChatReply { response }
}
