//! OpenAI-compatible chat-completions backend.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use super::{parse_reply, OracleBackend};
use crate::error::OracleError;
use crate::{OracleRequest, Result};

/// Connection settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature (service default when `None`).
    pub temperature: Option<f32>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Backend speaking the OpenAI chat-completions protocol with JSON-schema
/// response formatting.
pub struct OpenAiBackend {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiBackend {
    /// Build a backend with its own HTTP client.
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| OracleError::InvalidRequest(e.to_string()))?;

        debug!("OpenAI backend targeting {}", settings.endpoint);
        Ok(Self { client, settings })
    }

    fn request_body(&self, request: &OracleRequest, messages: &[ChatMessage]) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": request.schema,
                    "strict": false,
                },
            },
        });

        if let Some(temperature) = self.settings.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }

    async fn send(&self, body: &Value) -> Result<String> {
        let mut builder = self.client.post(&self.settings.endpoint).json(body);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.settings.timeout_secs)
            } else {
                OracleError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        trace!("Oracle replied with status {} ({} bytes)", status, text.len());

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| OracleError::Api {
            status,
            message: format!("unreadable response envelope: {}", e),
        })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl OracleBackend for OpenAiBackend {
    async fn complete(&self, request: &OracleRequest) -> Result<Value> {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage::new("system", request.system.as_str()));
        }
        messages.push(ChatMessage::new("user", request.prompt.as_str()));

        complete_with_retries(messages, request.max_retries + 1, |messages| {
            let body = self.request_body(request, messages);
            async move { self.send(&body).await }
        })
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Ask for a reply until one parses as a JSON object, at most `tries` times.
///
/// Each malformed reply is appended to the conversation together with a
/// correction before asking again. Errors from `send` end the loop at once.
async fn complete_with_retries<F, Fut>(
    mut messages: Vec<ChatMessage>,
    tries: u32,
    mut send: F,
) -> Result<Value>
where
    F: FnMut(&[ChatMessage]) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut last_error = String::new();

    for attempt in 1..=tries {
        let content = send(&messages).await?;

        match parse_reply(&content) {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Malformed oracle reply (try {}/{}): {}", attempt, tries, e);
                messages.push(ChatMessage::new("assistant", content));
                messages.push(ChatMessage::new(
                    "user",
                    format!(
                        "Your reply could not be parsed: {}. Respond with a single JSON object matching the schema.",
                        e
                    ),
                ));
                last_error = e;
            }
        }
    }

    Err(OracleError::MalformedReply {
        attempts: tries,
        message: last_error,
    })
}

/// Map a non-success HTTP status to an oracle error.
fn classify_status(status: u16, body: &str) -> OracleError {
    let message = error_message(body);
    match status {
        401 | 403 => OracleError::Unauthorized(message),
        429 => OracleError::RateLimited(message),
        _ => OracleError::Api { status, message },
    }
}

/// Pull `error.message` out of an error envelope, or fall back to the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    fn backend(temperature: Option<f32>) -> OpenAiBackend {
        OpenAiBackend::new(OpenAiSettings {
            temperature,
            ..OpenAiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let request = OracleRequest::new("extract this", "notes", json!({"type": "object"}))
            .with_model("gpt-4o-mini");
        let messages = vec![ChatMessage::new("user", "extract this")];

        let body = backend(None).request_body(&request, &messages);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "notes");
        assert_eq!(
            body["response_format"]["json_schema"]["schema"],
            json!({"type": "object"})
        );
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_request_body_temperature() {
        let request = OracleRequest::new("x", "notes", json!({}));
        let body = backend(Some(0.5)).request_body(&request, &[]);
        assert_eq!(body["temperature"], json!(0.5));
    }

    #[test]
    fn test_classify_status() {
        let body = r#"{"error": {"message": "You exceeded your current quota"}}"#;
        match classify_status(429, body) {
            OracleError::RateLimited(msg) => assert_eq!(msg, "You exceeded your current quota"),
            other => panic!("unexpected: {other:?}"),
        }

        assert!(matches!(classify_status(401, "{}"), OracleError::Unauthorized(_)));

        match classify_status(502, "Bad Gateway") {
            OracleError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new("system", "Extract data."),
            ChatMessage::new("user", "Weekly sync on 2024-05-15"),
        ]
    }

    #[tokio::test]
    async fn test_malformed_reply_is_retried_with_correction() {
        let mut replies: VecDeque<Result<String>> = VecDeque::from([
            Ok("Sure! Here is the data: {name: Weekly sync}".to_string()),
            Ok(r#"{"name": "Weekly sync"}"#.to_string()),
        ]);
        let mut seen: Vec<Vec<ChatMessage>> = Vec::new();

        let value = complete_with_retries(conversation(), 3, |messages| {
            seen.push(messages.to_vec());
            let reply = replies.pop_front().unwrap();
            async move { reply }
        })
        .await
        .unwrap();

        assert_eq!(value, json!({"name": "Weekly sync"}));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], conversation());

        let retry = &seen[1];
        assert_eq!(retry.len(), 4);
        assert_eq!(
            retry[2],
            ChatMessage::new("assistant", "Sure! Here is the data: {name: Weekly sync}")
        );
        assert_eq!(retry[3].role, "user");
        assert!(retry[3].content.starts_with("Your reply could not be parsed:"));
    }

    #[tokio::test]
    async fn test_malformed_reply_every_try() {
        let mut calls = 0;

        let err = complete_with_retries(conversation(), 3, |_| {
            calls += 1;
            async { Ok("[1, 2, 3]".to_string()) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 3);
        match err {
            OracleError::MalformedReply { attempts, message } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("an array"), "{}", message);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let mut calls = 0;

        let err = complete_with_retries(conversation(), 3, |_| {
            calls += 1;
            async { Err(OracleError::Timeout(60)) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, OracleError::Timeout(60)));
    }
}
