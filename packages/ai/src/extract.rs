// ABOUTME: Defensive JSON extraction from completion text
// ABOUTME: Providers may wrap payloads in prose or markdown fences; this digs the JSON out

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON payload found in response text")]
    NoJson,
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extracts the outermost `{...}` span from `text` and parses it. Markdown
/// code fences and surrounding prose are tolerated.
pub fn json_object(text: &str) -> Result<Value, ExtractError> {
    extract_span(text, '{', '}')
}

/// Extracts the outermost `[...]` span from `text` and parses it
pub fn json_array(text: &str) -> Result<Value, ExtractError> {
    extract_span(text, '[', ']')
}

fn extract_span(text: &str, open: char, close: char) -> Result<Value, ExtractError> {
    let stripped = strip_fences(text);
    let start = stripped.find(open).ok_or(ExtractError::NoJson)?;
    let end = stripped.rfind(close).ok_or(ExtractError::NoJson)?;
    if end < start {
        return Err(ExtractError::NoJson);
    }
    Ok(serde_json::from_str(&stripped[start..=end])?)
}

/// Removes markdown code-fence lines (```json ... ```), keeping their content
fn strip_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_json() {
        let value = json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(value, json!({ "a": 1 }));
    }

    #[test]
    fn strips_markdown_fences() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(json_object(text).unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn tolerates_surrounding_prose() {
        let text = "Here is the roadmap you asked for:\n\n{\"a\": {\"b\": 2}}\n\nLet me know!";
        assert_eq!(json_object(text).unwrap(), json!({ "a": { "b": 2 } }));
    }

    #[test]
    fn extracts_arrays() {
        let text = "Questions below.\n[1, 2, 3]";
        assert_eq!(json_array(text).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn reports_missing_json() {
        assert!(matches!(
            json_object("no structure here"),
            Err(ExtractError::NoJson)
        ));
    }

    #[test]
    fn reports_malformed_json() {
        assert!(matches!(
            json_object("{not valid json}"),
            Err(ExtractError::Parse(_))
        ));
    }
}
