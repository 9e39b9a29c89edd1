//! Best-effort recovery of a JSON object from untrusted model text.
//!
//! The upstream model is asked for JSON but may wrap it in prose, break it, or skip
//! it entirely. Nothing here returns an error: "no structured result" is `None`, and
//! every caller must supply its own fallback for that branch.

use serde_json::{Map, Value};

/// Severity levels accepted for `urgency` / `priority` fields.
pub const LEVELS: [&str; 4] = ["Low", "Medium", "High", "Critical"];

/// Take the text between the first `{` and the last `}` and parse it as an object.
pub fn extract_json_object(raw: &str) -> Option<Fields> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(Fields(map)),
        _ => None,
    }
}

/// A parsed model object with per-field, type-checked accessors.
///
/// Every accessor returns `None` for an absent or wrongly typed field so the
/// caller can substitute that field's default.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields(pub Map<String, Value>);

impl Fields {
    /// A non-blank string field, trimmed.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// A score in `[0, 100]` from an integer, float or numeric string.
    pub fn score(&self, key: &str) -> Option<u8> {
        let raw = match self.0.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !raw.is_finite() {
            return None;
        }
        Some(raw.round().clamp(0.0, 100.0) as u8)
    }

    /// One of [`LEVELS`], matched case-insensitively and returned in canonical casing.
    pub fn level(&self, key: &str) -> Option<&'static str> {
        let value = self.text(key)?;
        LEVELS
            .iter()
            .copied()
            .find(|level| level.eq_ignore_ascii_case(&value))
    }

    /// The non-blank string elements of an array field. `None` if nothing survives.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .0
            .get(key)?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        (!items.is_empty()).then_some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_object_wrapped_in_prose() {
        let raw = r#"Sure! {"category":"Plumbing","priority":"High"} Hope that helps"#;
        let fields = extract_json_object(raw).unwrap();
        assert_eq!(fields.text("category").as_deref(), Some("Plumbing"));
        assert_eq!(fields.level("priority"), Some("High"));
    }

    #[test]
    fn test_extracts_from_markdown_fence() {
        let raw = "```json\n{\n  \"summary\": \"Leak\",\n  \"nested\": {\"a\": 1}\n}\n```";
        let fields = extract_json_object(raw).unwrap();
        assert_eq!(fields.text("summary").as_deref(), Some("Leak"));
    }

    #[test]
    fn test_no_structured_result() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object(r#"{"category": "Plumbing", }"#).is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn test_two_objects_is_not_an_object() {
        // first `{` to last `}` spans both, which is not valid JSON
        assert!(extract_json_object(r#"{"a":1} and {"b":2}"#).is_none());
    }

    #[test]
    fn test_score_coercion() {
        let fields = extract_json_object(
            r#"{"a": 95, "b": 72.6, "c": "40", "d": 180, "e": -3, "f": "high", "g": null}"#,
        )
        .unwrap();
        assert_eq!(fields.score("a"), Some(95));
        assert_eq!(fields.score("b"), Some(73));
        assert_eq!(fields.score("c"), Some(40));
        assert_eq!(fields.score("d"), Some(100));
        assert_eq!(fields.score("e"), Some(0));
        assert_eq!(fields.score("f"), None);
        assert_eq!(fields.score("g"), None);
        assert_eq!(fields.score("missing"), None);
    }

    #[test]
    fn test_level_normalization() {
        let fields =
            extract_json_object(r#"{"a": "critical", "b": "Severe", "c": 3}"#).unwrap();
        assert_eq!(fields.level("a"), Some("Critical"));
        assert_eq!(fields.level("b"), None);
        assert_eq!(fields.level("c"), None);
    }

    #[test]
    fn test_list_keeps_only_strings() {
        let fields =
            extract_json_object(r#"{"a": ["one", 2, " ", "three"], "b": [], "c": "x"}"#).unwrap();
        assert_eq!(
            fields.list("a"),
            Some(vec!["one".to_string(), "three".to_string()])
        );
        assert_eq!(fields.list("b"), None);
        assert_eq!(fields.list("c"), None);
    }

    #[test]
    fn test_blank_text_is_absent() {
        let fields = extract_json_object(r#"{"a": "   ", "b": 4}"#).unwrap();
        assert_eq!(fields.text("a"), None);
        assert_eq!(fields.text("b"), None);
    }
}
