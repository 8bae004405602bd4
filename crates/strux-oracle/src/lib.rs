//! Structured-generation oracle abstraction for strux.
//!
//! This crate provides a unified interface for asking a generative model for
//! a JSON object that follows a given schema:
//! - `OpenAiBackend` talks to any OpenAI-compatible chat-completions endpoint
//! - `ScriptedBackend` replays recorded replies for offline runs and tests

mod backend;
mod error;
mod request;

pub use backend::openai::{OpenAiBackend, OpenAiSettings};
pub use backend::scripted::{ScriptedBackend, ScriptedReply};
pub use backend::{parse_reply, OracleBackend};
pub use error::OracleError;
pub use request::OracleRequest;

/// Result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
