//! Oracle backend implementations.

pub mod openai;
pub mod scripted;

use async_trait::async_trait;
use serde_json::Value;

use crate::{OracleRequest, Result};

/// Trait for structured-generation backends.
///
/// A backend turns one [`OracleRequest`] into one JSON object shaped like the
/// request's schema, or fails. Any retries it performs internally (for
/// replies that are not valid JSON) are its own business; callers see a
/// single success or failure per call.
#[async_trait]
pub trait OracleBackend: Send + Sync {
    /// Run one structured-generation call.
    async fn complete(&self, request: &OracleRequest) -> Result<Value>;

    /// Short human-readable backend name for logs.
    fn name(&self) -> &str;
}

/// Parse a model reply into a JSON object.
///
/// Tolerates a surrounding Markdown code fence, which chat models add even
/// when asked not to.
pub fn parse_reply(text: &str) -> std::result::Result<Value, String> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err(format!("expected a JSON object, got {}", json_kind(&value)));
    }
    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_object() {
        let value = parse_reply(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(value, json!({"name": "Ada"}));
    }

    #[test]
    fn test_parse_fenced_object() {
        let value = parse_reply("```json\n{\"name\": \"Ada\"}\n```").unwrap();
        assert_eq!(value["name"], "Ada");

        let value = parse_reply("```\n{\"n\": 1}\n```").unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_reply("[1, 2]").unwrap_err();
        assert!(err.contains("an array"));

        assert!(parse_reply("not json").is_err());
    }
}
