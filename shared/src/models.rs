//! Complaint snapshots passed in by callers for prompt context.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Placeholder rendered into prompts for a missing field.
pub const NOT_SPECIFIED: &str = "Not specified";

/// A partial, read-only view of a complaint.
///
/// Every field is optional and untrusted: text fields accept any JSON scalar, and
/// values of the wrong shape are dropped instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintSnapshot {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub urgency: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub priority_score: Option<String>,
    /// Filing date, normalized to `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_date")]
    pub created_at: Option<NaiveDate>,
}

impl ComplaintSnapshot {
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn filed_on(&self) -> String {
        self.created_at
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string())
    }

    /// Multi-line block for single-complaint prompts.
    pub fn describe(&self) -> String {
        let field = |value: &Option<String>| value.as_deref().unwrap_or(NOT_SPECIFIED).to_string();
        format!(
            "Description: {}\nCategory: {}\nUrgency: {}\nStatus: {}\nSummary: {}\nLocation: {}\nFiled on: {}",
            field(&self.description),
            field(&self.category),
            field(&self.urgency),
            field(&self.status),
            field(&self.summary),
            field(&self.location),
            self.filed_on(),
        )
    }

    /// Compact one-line form for list prompts.
    pub fn one_line(&self) -> String {
        format!(
            "[{}] {} ({}, {}) filed {}",
            self.status_or_default(),
            self.category_or_default(),
            self.urgency.as_deref().unwrap_or(NOT_SPECIFIED),
            self.summary
                .as_deref()
                .or(self.description.as_deref())
                .unwrap_or(NOT_SPECIFIED),
            self.filed_on(),
        )
    }

    /// True when the status matches `expected`, ignoring case and surrounding space.
    pub fn has_status(&self, expected: &str) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.trim().eq_ignore_ascii_case(expected))
    }
}

/// Any JSON scalar as trimmed text; blank strings, null, arrays and objects read as absent.
///
/// Use with `#[serde(default, deserialize_with = "lenient_text")]` on caller-supplied fields.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// A snapshot that tolerates a non-object value by reading it as absent.
pub fn lenient_snapshot<'de, D>(deserializer: D) -> Result<Option<ComplaintSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(snapshot_from_value(Value::deserialize(deserializer)?))
}

/// A snapshot list that drops non-object elements and reads a non-array as empty.
pub fn lenient_snapshots<'de, D>(deserializer: D) -> Result<Vec<ComplaintSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(snapshot_from_value).collect(),
        _ => Vec::new(),
    })
}

fn snapshot_from_value(value: Value) -> Option<ComplaintSnapshot> {
    match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Accept RFC 3339 strings, plain dates, epoch milliseconds, or a document-store
/// timestamp object (`{seconds, nanoseconds}` or `{_seconds, _nanoseconds}`).
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64);
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            seconds
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, nanos))
                .map(|dt| dt.date_naive())
        }
        _ => None,
    })
}
