//! Recovery of structured JSON from free-form Oracle replies.
//!
//! Models wrap objects in prose, markdown fences, or stop mid-object. Two
//! independent steps handle this:
//!
//! - `repair_truncated` appends a closing `}` when the reply does not end with one.
//! - `first_balanced_object` scans for the first `{...}` span whose braces balance,
//!   ignoring braces that appear inside JSON string literals.
//!
//! `extract_object` / `extract_repaired` combine them with deserialization.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no balanced JSON object found in reply")]
    NoObject,

    #[error("JSON object in reply is invalid: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Appends a trailing `}` if the reply (ignoring trailing whitespace) lacks one.
pub fn repair_truncated(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim_end();
    if trimmed.ends_with('}') {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("{trimmed}}}"))
    }
}

/// Returns the first balanced `{...}` span in `text`.
///
/// Starts at each `{` in turn; a start whose braces never balance is skipped so a
/// stray opening brace in leading prose does not hide a later complete object.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_close(bytes, open) {
            return Some(&text[open..=close]);
        }
        start = open + 1;
    }

    None
}

/// Index of the `}` closing the `{` at `open`, tracking string literals and escapes.
fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Deserializes the first balanced object in `raw`.
pub fn extract_object<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let span = first_balanced_object(raw).ok_or(ExtractError::NoObject)?;
    Ok(serde_json::from_str(span)?)
}

/// Repairs a truncated reply, then deserializes its first balanced object.
pub fn extract_repaired<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    extract_object(&repair_truncated(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        valid: bool,
    }

    #[test]
    fn test_object_surrounded_by_prose() {
        let raw = "Sure! Here is the result: {\"valid\": true} Let me know if you need more.";
        let verdict: Verdict = extract_object(raw).unwrap();
        assert_eq!(verdict, Verdict { valid: true });
    }

    #[test]
    fn test_object_inside_markdown_fence() {
        let raw = "```json\n{\"valid\": false}\n```";
        let verdict: Verdict = extract_object(raw).unwrap();
        assert!(!verdict.valid);
    }

    #[test]
    fn test_nested_objects_return_outer_span() {
        let raw = r#"noise {"a": {"b": {"c": 1}}, "d": 2} trailing {"e": 3}"#;
        assert_eq!(
            first_balanced_object(raw),
            Some(r#"{"a": {"b": {"c": 1}}, "d": 2}"#)
        );
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let raw = r#"{"feedback": "You wrote {x} and \"}\" here.", "transition": "Now, consider:"}"#;
        let value: Value = extract_object(raw).unwrap();
        assert_eq!(value["transition"], "Now, consider:");
    }

    #[test]
    fn test_stray_open_brace_is_skipped() {
        let raw = r#"I think { maybe... {"valid": true}"#;
        assert_eq!(first_balanced_object(raw), Some(r#"{"valid": true}"#));
    }

    #[test]
    fn test_missing_braces_is_no_object() {
        let err = extract_object::<Value>("no json here at all").unwrap_err();
        assert!(matches!(err, ExtractError::NoObject));
    }

    #[test]
    fn test_balanced_but_invalid_json() {
        let err = extract_object::<Value>("{not: json}").unwrap_err();
        assert!(matches!(err, ExtractError::Invalid(_)));
    }

    #[test]
    fn test_repair_appends_closing_brace() {
        assert_eq!(
            repair_truncated(r#"{"feedback": "ok""#),
            r#"{"feedback": "ok"}"#
        );
    }

    #[test]
    fn test_repair_leaves_complete_reply_untouched() {
        let raw = "{\"valid\": true}\n";
        assert!(matches!(repair_truncated(raw), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncated_reply_only_parses_after_repair() {
        let raw = r#"Here you go: {"feedback": "You named two index types.", "transition": "Moving on to:""#;
        assert!(extract_object::<Value>(raw).is_err());

        let value: Value = extract_repaired(raw).unwrap();
        assert_eq!(value["transition"], "Moving on to:");
    }

    #[test]
    fn test_truncated_inside_string_is_not_recoverable() {
        let raw = r#"{"feedback": "You did not"#;
        assert!(matches!(
            extract_repaired::<Value>(raw).unwrap_err(),
            ExtractError::NoObject
        ));
    }
}
