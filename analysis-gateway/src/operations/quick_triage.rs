//! `quick-triage`: classify a complaint while the user is still typing it.

use serde::{Deserialize, Serialize};
use shared::models::lenient_text;
use shared::{Fields, GenerationParams, ModelCall};

use super::{generate_fields, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.2,
    max_output_tokens: 256,
};

pub const FALLBACK_CATEGORY: &str = "General";
pub const FALLBACK_PRIORITY: &str = "Medium";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Triage {
    pub category: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_suggestion: Option<String>,
}

impl Triage {
    pub fn fallback() -> Self {
        Self {
            category: FALLBACK_CATEGORY.to_string(),
            priority: FALLBACK_PRIORITY.to_string(),
            image_suggestion: None,
        }
    }

    fn from_fields(fields: Option<Fields>) -> Self {
        let Some(fields) = fields else {
            return Self::fallback();
        };
        Self {
            category: fields
                .text("category")
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            priority: fields
                .level("priority")
                .unwrap_or(FALLBACK_PRIORITY)
                .to_string(),
            image_suggestion: fields.text("imageSuggestion"),
        }
    }
}

pub fn prompt(text: &str) -> String {
    format!(
        r#"You are triaging a complaint that a resident is still typing. Based on the partial text below, guess the most likely category and priority.

Partial complaint: "{text}"

Categories: Plumbing, Electrical, Sanitation, Roads, Water Supply, Security, Noise, General.
Priority must be one of: Low, Medium, High, Critical.
If a photo would help staff understand the problem, suggest in one short sentence what the resident should photograph; otherwise omit imageSuggestion.

Respond ONLY with JSON in this format:
{{"category": "...", "priority": "...", "imageSuggestion": "..."}}"#
    )
}

pub async fn run(request: TriageRequest, model: &ModelCall<'_>) -> Triage {
    let Some(text) = request.text else {
        return Triage::fallback();
    };
    let fields = generate_fields(Operation::QuickTriage, model, &prompt(&text)).await;
    Triage::from_fields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared::extract_json_object;

    #[test]
    fn test_fields_pass_through() {
        let fields = extract_json_object(
            r#"{"category":"Electrical","priority":"high","imageSuggestion":"Photograph the sparking socket"}"#,
        );
        assert_eq!(
            Triage::from_fields(fields),
            Triage {
                category: "Electrical".to_string(),
                priority: "High".to_string(),
                image_suggestion: Some("Photograph the sparking socket".to_string()),
            }
        );
    }

    #[test]
    fn test_bad_priority_takes_default_only_for_that_field() {
        let fields = extract_json_object(r#"{"category":"Roads","priority":"urgent-ish"}"#);
        let triage = Triage::from_fields(fields);
        assert_eq!(triage.category, "Roads");
        assert_eq!(triage.priority, FALLBACK_PRIORITY);
        assert_eq!(triage.image_suggestion, None);
    }

    #[test]
    fn test_fallback_omits_image_suggestion() {
        let json = serde_json::to_value(Triage::fallback()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"category": "General", "priority": "Medium"})
        );
    }

    #[test]
    fn test_prompt_embeds_text() {
        assert!(prompt("pipe burst in").contains("\"pipe burst in\""));
    }
}
