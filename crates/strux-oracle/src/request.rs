//! Request payload sent to an oracle backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single structured-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Instruction establishing the assistant's role.
    pub system: String,

    /// Free-text prompt (instruction, source text, prior errors).
    pub prompt: String,

    /// Name of the target schema.
    pub schema_name: String,

    /// Machine-readable JSON schema the reply must conform to.
    pub schema: Value,

    /// Model identifier.
    pub model: String,

    /// Retries the backend may spend on malformed replies.
    pub max_retries: u32,
}

impl OracleRequest {
    /// Create a request with an empty system instruction and no retries.
    pub fn new(prompt: impl Into<String>, schema_name: impl Into<String>, schema: Value) -> Self {
        Self {
            system: String::new(),
            prompt: prompt.into(),
            schema_name: schema_name.into(),
            schema,
            model: String::new(),
            max_retries: 0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Approximate size of the outgoing text, in characters.
    pub fn char_count(&self) -> usize {
        self.system.chars().count() + self.prompt.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = OracleRequest::new("extract", "notes", json!({"type": "object"}))
            .with_system("be precise")
            .with_model("gpt-4o-mini")
            .with_max_retries(2);

        assert_eq!(req.prompt, "extract");
        assert_eq!(req.schema_name, "notes");
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.max_retries, 2);
        assert_eq!(req.char_count(), "be precise".len() + "extract".len());
    }
}
