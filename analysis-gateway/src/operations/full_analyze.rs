//! `full-analyze`: complete classification and prioritization of a submitted complaint.

use serde::{Deserialize, Serialize};
use shared::models::lenient_text;
use shared::{Fields, GenerationParams, ModelCall};

use super::{generate_fields, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.3,
    max_output_tokens: 1024,
};

pub const FALLBACK_CATEGORY: &str = "General";
pub const FALLBACK_URGENCY: &str = "Medium";
pub const FALLBACK_PRIORITY_SCORE: u8 = 50;
pub const FALLBACK_REASONS: [&str; 1] =
    ["Automated analysis unavailable; default priority assigned"];
pub const FALLBACK_ASSIGNEE: &str = "General Maintenance";
pub const FALLBACK_STATUS_EXPLANATION: &str =
    "Your complaint has been received and will be reviewed by our team shortly.";
pub const EMPTY_DESCRIPTION_SUMMARY: &str = "No description provided";

/// Characters of the description kept by the fallback summary.
pub const SUMMARY_CHARS: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub category: String,
    pub urgency: String,
    /// Integer in `[0, 100]`.
    pub priority_score: u8,
    pub reasons: Vec<String>,
    pub summary: String,
    pub suggested_assignee: String,
    pub status_explanation: String,
    pub detected_objects: Vec<String>,
}

/// First [`SUMMARY_CHARS`] characters of the description, with an ellipsis if cut.
pub fn truncated_summary(description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        return EMPTY_DESCRIPTION_SUMMARY.to_string();
    }
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(SUMMARY_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

impl Analysis {
    pub fn fallback(description: &str) -> Self {
        Self {
            category: FALLBACK_CATEGORY.to_string(),
            urgency: FALLBACK_URGENCY.to_string(),
            priority_score: FALLBACK_PRIORITY_SCORE,
            reasons: FALLBACK_REASONS.iter().map(|r| r.to_string()).collect(),
            summary: truncated_summary(description),
            suggested_assignee: FALLBACK_ASSIGNEE.to_string(),
            status_explanation: FALLBACK_STATUS_EXPLANATION.to_string(),
            detected_objects: Vec::new(),
        }
    }

    fn from_fields(fields: Option<Fields>, description: &str) -> Self {
        let fallback = Self::fallback(description);
        let Some(fields) = fields else {
            return fallback;
        };
        Self {
            category: fields.text("category").unwrap_or(fallback.category),
            urgency: fields
                .level("urgency")
                .map(String::from)
                .unwrap_or(fallback.urgency),
            priority_score: fields
                .score("priorityScore")
                .unwrap_or(fallback.priority_score),
            reasons: fields.list("reasons").unwrap_or(fallback.reasons),
            summary: fields.text("summary").unwrap_or(fallback.summary),
            suggested_assignee: fields
                .text("suggestedAssignee")
                .unwrap_or(fallback.suggested_assignee),
            status_explanation: fields
                .text("statusExplanation")
                .unwrap_or(fallback.status_explanation),
            detected_objects: fields.list("detectedObjects").unwrap_or_default(),
        }
    }
}

pub fn prompt(description: &str, image_url: Option<&str>) -> String {
    let image_note = match image_url {
        Some(url) => format!(
            "The resident attached a photo ({url}). List any objects relevant to the problem that such a photo would likely show in detectedObjects."
        ),
        None => "No photo was attached; return an empty detectedObjects list.".to_string(),
    };

    format!(
        r#"You are an expert complaint analyst for a residential facilities team. Analyze the complaint below.

Complaint: "{description}"
{image_note}

Assign a priorityScore from 0 to 100. Weigh factors in this order:
1. Safety hazards (fire, electrical, structural, health risks) score highest.
2. Utility outages (water, power, gas, internet).
3. Impact on multiple people or shared areas.
4. Urgent language from the resident.
5. Signs the problem is recurring.

Categories: Plumbing, Electrical, Sanitation, Roads, Water Supply, Security, Noise, General.
Urgency must be one of: Low, Medium, High, Critical.
Suggested assignee should be a team such as Plumbing Team, Electrical Team, Sanitation Department, Road Maintenance, Water Department, Security Office, General Maintenance.
statusExplanation is one friendly sentence telling the resident what happens next.

Respond ONLY with JSON in this format:
{{
  "category": "...",
  "urgency": "...",
  "priorityScore": 0,
  "reasons": ["..."],
  "summary": "one short sentence",
  "suggestedAssignee": "...",
  "statusExplanation": "...",
  "detectedObjects": ["..."]
}}"#
    )
}

pub async fn run(request: AnalyzeRequest, model: &ModelCall<'_>) -> Analysis {
    let description = request.description.unwrap_or_default();
    let prompt = prompt(&description, request.image_url.as_deref());
    let fields = generate_fields(Operation::FullAnalyze, model, &prompt).await;
    Analysis::from_fields(fields, &description)
}
