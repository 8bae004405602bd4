//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use strux_core::models::config::StruxConfig;
use strux_oracle::{OpenAiBackend, OpenAiSettings, OracleBackend, ScriptedBackend};

/// Schema to extract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaKind {
    /// Project invoice with vendor, line items, tax and totals
    Invoice,
    /// Meeting notes with a date and action items
    Notes,
}

impl SchemaKind {
    /// Parse the schema name stored in the config file.
    pub fn from_config(name: &str) -> anyhow::Result<Self> {
        match name {
            "invoice" => Ok(SchemaKind::Invoice),
            "notes" => Ok(SchemaKind::Notes),
            other => anyhow::bail!("Unknown schema in config: {} (expected invoice or notes)", other),
        }
    }
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strux")
        .join("config.json")
}

/// Load the config from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StruxConfig> {
    if let Some(path) = config_path {
        return Ok(StruxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(StruxConfig::from_file(&default_path)?)
    } else {
        Ok(StruxConfig::default())
    }
}

/// Build the oracle backend: a replay file when given, otherwise HTTP.
pub fn build_backend(
    config: &StruxConfig,
    replay: Option<&Path>,
) -> anyhow::Result<Box<dyn OracleBackend>> {
    if let Some(path) = replay {
        debug!("Replaying oracle replies from {}", path.display());
        return Ok(Box::new(ScriptedBackend::from_jsonl(path)?));
    }

    let api_key = config.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set, sending requests without an API key",
            config.oracle.api_key_env
        );
    }

    let backend = OpenAiBackend::new(OpenAiSettings {
        endpoint: config.oracle.endpoint.clone(),
        api_key,
        timeout_secs: config.oracle.timeout_secs,
        temperature: config.oracle.temperature,
    })?;
    Ok(Box::new(backend))
}
