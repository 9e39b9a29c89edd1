//! `admin-insights`: aggregate view across all complaints for administrators.
//!
//! `mostCommonIssue` is always the locally counted top category; a value echoed
//! by the model is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::models::lenient_snapshots;
use shared::{ComplaintSnapshot, Fields, GenerationParams, ModelCall};

use super::{generate_fields, Operation};

pub const PARAMS: GenerationParams = GenerationParams {
    temperature: 0.4,
    max_output_tokens: 800,
};

pub const UNCATEGORIZED: &str = "General";
pub const NO_COMPLAINTS: &str = "No complaints yet";
pub const FALLBACK_HOTSPOT: &str = "Not enough data";
pub const FALLBACK_TRENDS: &str = "Trend analysis is temporarily unavailable.";

/// Rows of each frequency table shown to the model.
const TABLE_ROWS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsRequest {
    #[serde(default, deserialize_with = "lenient_snapshots")]
    pub complaints: Vec<ComplaintSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInsights {
    pub most_common_issue: String,
    pub hotspot_area: String,
    pub trends: String,
}

/// Count occurrences, most frequent first; ties keep first-seen order.
pub fn tally<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, index)).0 += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (a_count, a_first)), (_, (b_count, b_first))| {
        b_count.cmp(a_count).then(a_first.cmp(b_first))
    });
    ranked
        .into_iter()
        .map(|(value, (count, _))| (value, count))
        .collect()
}

pub fn category_counts(complaints: &[ComplaintSnapshot]) -> Vec<(&str, usize)> {
    tally(
        complaints
            .iter()
            .map(|c| c.category.as_deref().unwrap_or(UNCATEGORIZED)),
    )
}

pub fn most_common_issue(complaints: &[ComplaintSnapshot]) -> String {
    category_counts(complaints)
        .first()
        .map(|(category, _)| category.to_string())
        .unwrap_or_else(|| NO_COMPLAINTS.to_string())
}

impl AdminInsights {
    pub fn fallback(most_common_issue: String) -> Self {
        Self {
            most_common_issue,
            hotspot_area: FALLBACK_HOTSPOT.to_string(),
            trends: FALLBACK_TRENDS.to_string(),
        }
    }

    fn from_fields(fields: Option<Fields>, most_common_issue: String) -> Self {
        let fallback = Self::fallback(most_common_issue);
        let Some(fields) = fields else {
            return fallback;
        };
        Self {
            most_common_issue: fallback.most_common_issue,
            hotspot_area: fields.text("hotspotArea").unwrap_or(fallback.hotspot_area),
            trends: fields.text("trends").unwrap_or(fallback.trends),
        }
    }
}

fn table(rows: &[(&str, usize)]) -> String {
    if rows.is_empty() {
        return "(none)".to_string();
    }
    rows.iter()
        .take(TABLE_ROWS)
        .map(|(name, count)| format!("- {}: {}", name, count))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn prompt(complaints: &[ComplaintSnapshot]) -> String {
    let categories = category_counts(complaints);
    let locations = tally(complaints.iter().filter_map(|c| c.location.as_deref()));
    let listing = complaints
        .iter()
        .map(|c| {
            format!(
                "- {} @ {}",
                c.one_line(),
                c.location.as_deref().unwrap_or("unknown location")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an analyst for a facilities administration team. Review all {total} complaints below.

Complaints by category:
{category_table}

Complaints by location:
{location_table}

All complaints:
{listing}

Identify the area with the most problems (hotspotArea) and describe the main trends in 2-3 sentences (trends). If there is no location data, say so in hotspotArea.

Respond ONLY with JSON in this format:
{{"mostCommonIssue": "...", "hotspotArea": "...", "trends": "..."}}"#,
        total = complaints.len(),
        category_table = table(&categories),
        location_table = table(&locations),
    )
}

pub async fn run(request: InsightsRequest, model: &ModelCall<'_>) -> AdminInsights {
    let complaints = request.complaints;
    let top = most_common_issue(&complaints);
    let fields = generate_fields(Operation::AdminInsights, model, &prompt(&complaints)).await;
    AdminInsights::from_fields(fields, top)
}
