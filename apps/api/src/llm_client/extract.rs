//! JSON extraction from raw model output.
//!
//! Models wrap JSON in markdown fences, preface it with prose, or trail it
//! with commentary. Extraction is: strip fences, take the first `{` through
//! the last `}`, parse. Parse failures surface as `MalformedResponse` with a
//! short snippet around the error position for diagnosis.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AppError;

/// Characters of context kept on each side of a parse-error position.
const SNIPPET_CONTEXT: usize = 20;

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Extracts and parses the JSON object embedded in raw model output.
pub fn extract_json_object(raw: &str) -> Result<Value, AppError> {
    let text = strip_code_fences(raw);

    let start = text.find('{');
    let end = text.rfind('}');
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            return Err(AppError::MalformedResponse {
                reason: "no JSON object found in response".to_string(),
                snippet: snippet_around(text, 0),
            })
        }
    };

    let candidate = &text[start..=end];
    serde_json::from_str(candidate).map_err(|e| {
        // serde_json reports line/column; convert to a byte offset so the
        // snippet points at the exact failure site.
        let pos = offset_of(candidate, e.line(), e.column());
        AppError::MalformedResponse {
            reason: e.to_string(),
            snippet: snippet_around(candidate, pos),
        }
    })
}

/// Extracts the embedded JSON object and deserializes it into `T`.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    let value = extract_json_object(raw)?;
    serde_json::from_value(value).map_err(|e| AppError::MalformedResponse {
        reason: format!("response does not match expected schema: {e}"),
        snippet: snippet_around(strip_code_fences(raw), 0),
    })
}

fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (idx, l) in text.lines().enumerate() {
        if idx + 1 == line {
            return offset + column.saturating_sub(1);
        }
        offset += l.len() + 1;
    }
    text.len().saturating_sub(1)
}

fn snippet_around(text: &str, pos: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let start = pos.saturating_sub(SNIPPET_CONTEXT);
    let end = (pos + SNIPPET_CONTEXT).min(text.len());
    // Snap to char boundaries so multi-byte output cannot panic the slice.
    let start = (0..=start).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
    let end = (end..=text.len()).find(|i| text.is_char_boundary(*i)).unwrap_or(text.len());
    text[start..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_json_fences() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strips_bare_fences() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extracts_object_with_surrounding_prose() {
        let raw = "Here is your roadmap:\n{\"career_title\": \"Data Analyst\"}\nGood luck!";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["career_title"], "Data Analyst");
    }

    #[test]
    fn test_first_brace_to_last_brace_spans_nested_objects() {
        let raw = "{\"outer\": {\"inner\": 1}}";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value["outer"]["inner"], 1);
    }

    #[test]
    fn test_no_object_is_malformed_response() {
        let err = extract_json_object("I am unable to help with that.").unwrap_err();
        match err {
            AppError::MalformedResponse { snippet, .. } => {
                assert!(snippet.contains("I am unable"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_snippet_covers_error_position() {
        // Trailing comma after the last element is a parse error.
        let raw = "{\"phases\": [1, 2,]}";
        let err = extract_json_object(raw).unwrap_err();
        match err {
            AppError::MalformedResponse { snippet, .. } => {
                assert!(snippet.contains(",]"), "snippet was {snippet:?}");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_structured_into_typed_value() {
        #[derive(serde::Deserialize)]
        struct Payload {
            count: u32,
        }
        let payload: Payload = parse_structured("```json\n{\"count\": 3}\n```").unwrap();
        assert_eq!(payload.count, 3);
    }

    #[test]
    fn test_parse_structured_schema_mismatch_is_malformed() {
        #[derive(Debug, serde::Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            count: u32,
        }
        let err = parse_structured::<Payload>("{\"count\": \"three\"}").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }
}
