//! Recovery of JSON payloads from free-form generation output
//!
//! Model output is treated as adversarial: it may be empty, wrapped in code
//! fences, or surrounded by prose. [`extract_json_slice`] is a best-effort
//! slice, not a parser; [`decode_items`] performs the real decode and turns
//! every failure into an empty list.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Why no JSON slice could be recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("generation output is empty")]
    NoContent,

    #[error("no JSON object or array found in generation output")]
    NoJsonFound,
}

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Slice the substring most likely to be a JSON value out of `text`
pub fn extract_json_slice(text: &str) -> Result<&str, ExtractError> {
    let mut text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::NoContent);
    }

    // Repeated fences are stripped so a slice is always a fixed point
    loop {
        let before = text.len();
        if let Some(rest) = text.strip_prefix(JSON_FENCE).or_else(|| text.strip_prefix(FENCE)) {
            text = rest.trim();
        }
        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest.trim();
        }
        if text.len() == before {
            break;
        }
    }

    if text.starts_with('{') || text.starts_with('[') {
        return Ok(text);
    }

    let start = match (text.find('{'), text.find('[')) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return Err(ExtractError::NoJsonFound),
    };
    let end = match (text.rfind('}'), text.rfind(']')) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return Err(ExtractError::NoJsonFound),
    };

    if end < start {
        return Err(ExtractError::NoJsonFound);
    }

    Ok(&text[start..=end])
}

/// Shape of the records a decode should accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemShape {
    /// Field that must be present as an identifier
    pub id_field: &'static str,
    /// At least one of these must be present as the text/content
    pub text_fields: &'static [&'static str],
    /// Key of an object wrapping the list
    pub wrapper: &'static str,
}

impl ItemShape {
    pub const REQUIREMENTS: ItemShape =
        ItemShape { id_field: "id", text_fields: &["text", "content"], wrapper: "requirements" };

    pub const TEST_CASES: ItemShape =
        ItemShape { id_field: "id", text_fields: &["title", "description"], wrapper: "test_cases" };

    fn accepts(&self, item: &Map<String, Value>) -> bool {
        item.contains_key(self.id_field) && self.text_fields.iter().any(|f| item.contains_key(*f))
    }
}

/// Decode generation output into the list of records it carries
///
/// Decode errors and shape mismatches yield an empty list.
pub fn decode_items(text: &str, shape: ItemShape) -> Vec<Map<String, Value>> {
    let slice = match extract_json_slice(text) {
        Ok(slice) => slice,
        Err(e) => {
            debug!(error = %e, "No structured payload in output");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(slice) {
        Ok(value) => collect_items(value, shape),
        Err(e) => {
            debug!(error = %e, "Structured payload failed to decode");
            Vec::new()
        }
    }
}

fn collect_items(value: Value, shape: ItemShape) -> Vec<Map<String, Value>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) if shape.accepts(&map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(mut map) => match map.remove(shape.wrapper) {
            Some(inner) => collect_items(inner, shape),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_json_slice(""), Err(ExtractError::NoContent));
        assert_eq!(extract_json_slice("   \n\t"), Err(ExtractError::NoContent));
    }

    #[test]
    fn test_fenced_input() {
        let fenced = "```json\n[{\"id\": \"REQ-001\"}]\n```";
        assert_eq!(extract_json_slice(fenced).unwrap(), "[{\"id\": \"REQ-001\"}]");

        let plain_fence = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_slice(plain_fence).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_prose_around_json() {
        let text = "Here are the requirements:\n[{\"id\": 1}]\nLet me know if you need more.";
        assert_eq!(extract_json_slice(text).unwrap(), "[{\"id\": 1}]");

        let text = "Result: {\"test_cases\": []} done";
        assert_eq!(extract_json_slice(text).unwrap(), "{\"test_cases\": []}");
    }

    #[test]
    fn test_optimistic_path_keeps_trailing_text() {
        let text = "[1, 2] and then some prose";
        assert_eq!(extract_json_slice(text).unwrap(), text);
    }

    #[test]
    fn test_unbalanced_braces_still_slice() {
        assert_eq!(extract_json_slice("note: {\"a\": [1, 2}").unwrap(), "{\"a\": [1, 2}");
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json_slice("APPROVED"), Err(ExtractError::NoJsonFound));
        assert_eq!(extract_json_slice("open { only"), Err(ExtractError::NoJsonFound));
        assert_eq!(extract_json_slice("} reversed {"), Err(ExtractError::NoJsonFound));
    }

    #[test]
    fn test_decode_requirement_list() {
        let text = r#"```json
[
  {"id": "REQ-001", "text": "The system shall parse uploaded documents."},
  {"id": "REQ-002"},
  "stray string",
  {"id": "REQ-003", "content": "The system shall export results."}
]
```"#;
        let items = decode_items(text, ItemShape::REQUIREMENTS);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], "REQ-001");
        assert_eq!(items[1]["content"], "The system shall export results.");
    }

    #[test]
    fn test_decode_wrapped_list() {
        let text =
            r#"{"requirements": [{"id": "REQ-001", "text": "The system shall log in users."}]}"#;
        assert_eq!(decode_items(text, ItemShape::REQUIREMENTS).len(), 1);

        let text = r#"{"test_cases": [{"id": "TC-001", "title": "Login works", "steps": []}]}"#;
        assert_eq!(decode_items(text, ItemShape::TEST_CASES).len(), 1);
    }

    #[test]
    fn test_decode_failures_are_empty() {
        assert!(decode_items("", ItemShape::REQUIREMENTS).is_empty());
        assert!(decode_items("APPROVED", ItemShape::REQUIREMENTS).is_empty());
        assert!(decode_items("[{\"id\": 1,", ItemShape::REQUIREMENTS).is_empty());
        assert!(decode_items("{\"other\": []}", ItemShape::REQUIREMENTS).is_empty());
        assert!(decode_items("42", ItemShape::REQUIREMENTS).is_empty());
    }

    proptest! {
        #[test]
        fn prop_slice_is_fixed_point(text in ".{0,200}") {
            if let Ok(slice) = extract_json_slice(&text) {
                prop_assert_eq!(extract_json_slice(slice), Ok(slice));
            }
        }

        #[test]
        fn prop_fence_does_not_change_slice(
            body in r#"\{"[a-z]{1,8}": \[[0-9, ]{0,20}\]\}"#,
            prefix in "[A-Za-z .:]{0,30}",
        ) {
            let plain = format!("{prefix}{body}");
            let fenced = format!("```json\n{plain}\n```");
            prop_assert_eq!(extract_json_slice(&plain), extract_json_slice(&fenced));
        }
    }
}
