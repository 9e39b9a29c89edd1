//! `personal-report`: a resident's summary of everything they have filed.
//!
//! The counts in `stats` are computed here from the supplied list and are
//! authoritative; the model only writes the prose around them.

use serde::{Deserialize, Serialize};
use shared::models::{lenient_snapshots, lenient_text};
use shared::{ComplaintSnapshot, Fields, GenerationParams, ModelCall};

use super::{generate_fields, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.5,
    max_output_tokens: 800,
};

pub const FALLBACK_SUMMARY: &str =
    "Your personalized report is temporarily unavailable. Your complaint statistics are shown below.";
pub const FALLBACK_INSIGHTS: [&str; 1] =
    ["Keep tracking your complaints to see progress over time."];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_snapshots")]
    pub complaints: Vec<ComplaintSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplaintStats {
    pub total: usize,
    pub resolved: usize,
    /// Everything neither resolved nor rejected, including complaints with no status.
    pub pending: usize,
}

impl ComplaintStats {
    pub fn from_complaints(complaints: &[ComplaintSnapshot]) -> Self {
        let resolved = complaints.iter().filter(|c| c.has_status("Resolved")).count();
        let rejected = complaints.iter().filter(|c| c.has_status("Rejected")).count();
        Self {
            total: complaints.len(),
            resolved,
            pending: complaints.len() - resolved - rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalReport {
    pub summary: String,
    pub stats: ComplaintStats,
    pub insights: Vec<String>,
}

impl PersonalReport {
    pub fn fallback(stats: ComplaintStats) -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            stats,
            insights: FALLBACK_INSIGHTS.iter().map(|i| i.to_string()).collect(),
        }
    }

    fn from_fields(fields: Option<Fields>, stats: ComplaintStats) -> Self {
        let fallback = Self::fallback(stats);
        let Some(fields) = fields else {
            return fallback;
        };
        Self {
            summary: fields.text("summary").unwrap_or(fallback.summary),
            stats,
            insights: fields.list("insights").unwrap_or(fallback.insights),
        }
    }
}

pub fn prompt(complaints: &[ComplaintSnapshot], stats: ComplaintStats) -> String {
    let listing = if complaints.is_empty() {
        "(none)".to_string()
    } else {
        complaints
            .iter()
            .map(|c| format!("- {}", c.one_line()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are preparing a personal complaint report for a resident.

Totals: {total} complaints, {resolved} resolved, {pending} still pending.

Complaints:
{listing}

Write a friendly 2-3 sentence summary of their complaint history and 2-4 short, practical insights (patterns, recurring issues, or tips).

Respond ONLY with JSON in this format:
{{"summary": "...", "insights": ["...", "..."]}}"#,
        total = stats.total,
        resolved = stats.resolved,
        pending = stats.pending,
    )
}

pub async fn run(request: ReportRequest, model: &ModelCall<'_>) -> PersonalReport {
    let complaints = request.complaints;
    let stats = ComplaintStats::from_complaints(&complaints);
    let prompt = prompt(&complaints, stats);
    let fields = generate_fields(Operation::PersonalReport, model, &prompt).await;
    PersonalReport::from_fields(fields, stats)
}
