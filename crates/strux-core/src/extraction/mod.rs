//! Extract-validate-repair control loop.
//!
//! - [`ExtractionLoop`] - drives attempts against an oracle backend
//! - [`LoopState`] - per-request state and the result handed back to callers
//! - [`LoopPhase`] / [`transition`] - the explicit state machine
//! - [`ExtractionMetrics`] - attempt and size accounting

mod machine;
mod metrics;
mod runner;
mod state;

pub use machine::{transition, LoopPhase, Termination};
pub use metrics::{estimate_tokens, ExtractionMetrics};
pub use runner::{ExtractionLoop, LoopSettings};
pub use state::{AttemptRecord, LoopState};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::validate::Validate;

/// A schema the loop can extract.
pub trait Extractable: Serialize + DeserializeOwned + JsonSchema + Validate + Send + Sync {
    /// Name sent to the oracle alongside the schema.
    const SCHEMA_NAME: &'static str;

    /// Machine-readable JSON schema for the oracle.
    fn schema_descriptor() -> serde_json::Result<Value> {
        serde_json::to_value(schemars::schema_for!(Self))
    }
}
