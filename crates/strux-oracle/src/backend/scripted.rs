//! Replay backend serving recorded replies in order.
//!
//! Used for offline runs (`--replay`) and for exercising the extraction loop
//! without a network.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::OracleBackend;
use crate::error::OracleError;
use crate::{OracleRequest, Result};

/// One recorded oracle outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    /// The oracle returned this JSON object.
    Value(Value),
    /// The call failed at the transport level with this message.
    Failure(String),
}

impl ScriptedReply {
    /// Interpret a recorded line; `{"error": "..."}` is a failure.
    fn from_value(value: Value) -> Self {
        if let Some(obj) = value.as_object() {
            if obj.len() == 1 {
                if let Some(msg) = obj.get("error").and_then(Value::as_str) {
                    return ScriptedReply::Failure(msg.to_string());
                }
            }
        }
        ScriptedReply::Value(value)
    }
}

/// Backend that replays a fixed queue of replies.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedBackend {
    /// Create a backend from an ordered list of replies.
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a backend that answers every call with a JSON value.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(values.into_iter().map(ScriptedReply::Value))
    }

    /// Load replies from a JSON-lines file; blank lines are skipped.
    pub fn from_jsonl<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut replies = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                OracleError::InvalidRequest(format!(
                    "{}:{}: invalid recorded reply: {}",
                    path.display(),
                    index + 1,
                    e
                ))
            })?;
            replies.push(ScriptedReply::from_value(value));
        }

        debug!("Loaded {} recorded replies from {}", replies.len(), path.display());
        Ok(Self::new(replies))
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of replies not yet served.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl OracleBackend for ScriptedBackend {
    async fn complete(&self, request: &OracleRequest) -> Result<Value> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| OracleError::Transport("reply queue poisoned".to_string()))?
            .pop_front();

        match next {
            Some(ScriptedReply::Value(value)) => Ok(value),
            Some(ScriptedReply::Failure(message)) => Err(OracleError::Transport(message)),
            None => Err(OracleError::Exhausted),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
