//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StruxError};

/// Main configuration for strux.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StruxConfig {
    /// Oracle connection configuration.
    pub oracle: OracleConfig,

    /// Extraction loop configuration.
    pub extraction: ExtractionSettings,

    /// Input ingestion configuration.
    pub ingest: IngestConfig,
}

/// Oracle connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Retries the oracle may spend on malformed replies within one call.
    pub max_retries: u32,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Sampling temperature (service default when null).
    pub temperature: Option<f32>,

    /// System instruction sent before the extraction prompt.
    pub system_prompt: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_retries: 3,
            timeout_secs: 60,
            temperature: None,
            system_prompt: "You are a precise data extraction assistant.".to_string(),
        }
    }
}

/// Extraction loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Maximum extract/validate rounds before giving up.
    pub max_attempts: u32,

    /// Default schema (`invoice` or `notes`).
    pub schema: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            schema: "invoice".to_string(),
        }
    }
}

/// Input ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest input file accepted, in bytes.
    pub max_file_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 20 * 1024 * 1024,
        }
    }
}

impl StruxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn check(&self) -> Result<()> {
        if self.extraction.max_attempts == 0 {
            return Err(StruxError::Config(
                "extraction.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.oracle.model.trim().is_empty() {
            return Err(StruxError::Config("oracle.model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.oracle.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
