//! Drives the extract-validate-repair loop against an oracle backend.

use std::time::Instant;

use strux_oracle::{OracleBackend, OracleError};
use tracing::{debug, info, warn};

use super::machine::{transition, LoopPhase, Termination};
use super::metrics::estimate_tokens;
use super::state::{AttemptRecord, LoopState};
use super::Extractable;
use crate::error::{Result, StruxError};
use crate::models::config::StruxConfig;
use crate::prompt::{build_request, PromptSettings};
use crate::validate::{validate_value, ValidationErrors};

/// Settings for one loop run.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Oracle calls allowed before giving up. Must be at least 1.
    pub max_attempts: u32,
    pub prompt: PromptSettings,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from(&StruxConfig::default())
    }
}

impl From<&StruxConfig> for LoopSettings {
    fn from(config: &StruxConfig) -> Self {
        Self {
            max_attempts: config.extraction.max_attempts,
            prompt: PromptSettings {
                system: config.oracle.system_prompt.clone(),
                model: config.oracle.model.clone(),
                max_retries: config.oracle.max_retries,
            },
        }
    }
}

/// The extraction loop.
///
/// Holds no per-request state, so one loop can serve any number of
/// concurrent [`run`](Self::run) calls.
pub struct ExtractionLoop<'a> {
    backend: &'a dyn OracleBackend,
    settings: LoopSettings,
}

impl<'a> ExtractionLoop<'a> {
    pub fn new(backend: &'a dyn OracleBackend, settings: LoopSettings) -> Self {
        Self { backend, settings }
    }

    /// Override the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.settings.max_attempts = max_attempts;
        self
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Run the loop for one input text.
    ///
    /// Validation failures and retriable oracle failures are retried until
    /// the budget runs out; running out is reported through the returned
    /// state, not as an error. Only a non-retriable oracle error or a schema
    /// that cannot be described is returned as `Err`.
    ///
    /// Dropping the returned future abandons the in-flight oracle call and
    /// issues no further attempts.
    pub async fn run<T: Extractable>(&self, raw_text: &str) -> Result<LoopState<T>> {
        if self.settings.max_attempts == 0 {
            return Err(StruxError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let schema = T::schema_descriptor()?;
        let started = Instant::now();
        let max_attempts = self.settings.max_attempts;
        let mut state = LoopState::<T>::new(raw_text);
        let mut phase = LoopPhase::Init;

        info!(
            "Starting extraction: schema={}, backend={}, max_attempts={}",
            T::SCHEMA_NAME,
            self.backend.name(),
            max_attempts
        );

        while !phase.is_done() {
            if phase == LoopPhase::Extracting {
                self.attempt(&mut state, &schema).await?;
            }
            phase = transition(phase, state.latest_passed(), state.attempt_count(), max_attempts);
            if phase == LoopPhase::Retry {
                debug!(
                    "Attempt {}/{} left {} error(s), retrying",
                    state.attempt_count(),
                    max_attempts,
                    state.validation_errors().len()
                );
            }
        }

        if let LoopPhase::Done(termination) = phase {
            state.finish(termination);
            match termination {
                Termination::Valid => info!(
                    "Extraction valid after {} attempt(s)",
                    state.attempt_count()
                ),
                Termination::BudgetExhausted => warn!(
                    "Maximum attempts reached with {} unresolved error(s)",
                    state.validation_errors().len()
                ),
            }
        }

        state.metrics_mut().wall_time_ms = started.elapsed().as_millis() as u64;
        Ok(state)
    }

    /// One oracle call plus validation of its reply.
    async fn attempt<T: Extractable>(
        &self,
        state: &mut LoopState<T>,
        schema: &serde_json::Value,
    ) -> Result<()> {
        let attempt_number = state.attempt_count() + 1;
        let started = Instant::now();

        let request = build_request(
            state.raw_text(),
            state.validation_errors().as_slice(),
            T::SCHEMA_NAME,
            schema,
            &self.settings.prompt,
        );
        debug!("Attempt {}: sending {} prompt chars", attempt_number, request.char_count());
        state.metrics_mut().estimated_input_tokens += estimate_tokens(&request.prompt);

        let (candidate, errors, raw) = match self.backend.complete(&request).await {
            Ok(value) => {
                state.metrics_mut().estimated_output_tokens += estimate_tokens(&value.to_string());
                let (candidate, errors) = validate_value::<T>(value.clone());
                (candidate, errors, Some(value))
            }
            Err(e) if e.is_retriable() => {
                warn!("Attempt {}: oracle call failed: {}", attempt_number, e);
                let mut errors = ValidationErrors::new();
                errors.push(oracle_message(&e));
                (None, errors, None)
            }
            Err(e) => return Err(e.into()),
        };

        if !errors.is_empty() {
            for error in errors.iter() {
                debug!("Attempt {}: {}", attempt_number, error);
            }
        }

        let record = AttemptRecord {
            attempt_number,
            candidate: raw,
            validation_errors: errors.as_slice().to_vec(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        state.record_attempt(candidate, errors, record);
        Ok(())
    }
}

fn oracle_message(error: &OracleError) -> String {
    format!("oracle: {}", error)
}
