//! Per-request loop state.

use serde::Serialize;
use serde_json::Value;

use super::machine::Termination;
use super::metrics::ExtractionMetrics;
use crate::validate::ValidationErrors;

/// One oracle call and what validation made of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt_number: u32,
    /// Raw reply, `None` when the oracle call failed.
    pub candidate: Option<Value>,
    /// Violations found in this attempt (or the oracle failure message).
    pub validation_errors: Vec<String>,
    /// Time spent in the oracle call and validation.
    pub elapsed_ms: u64,
}

/// State of one extraction request.
///
/// Created by [`ExtractionLoop::run`](super::ExtractionLoop::run) and only
/// mutated there; callers get read access once the loop has finished.
#[derive(Debug, Clone, Serialize)]
pub struct LoopState<T> {
    raw_text: String,
    validation_errors: ValidationErrors,
    attempt_count: u32,
    final_output: Option<T>,
    is_valid: bool,
    warning_flag: bool,
    termination: Option<Termination>,
    history: Vec<AttemptRecord>,
    metrics: ExtractionMetrics,
}

impl<T> LoopState<T> {
    pub(super) fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            validation_errors: ValidationErrors::new(),
            attempt_count: 0,
            final_output: None,
            is_valid: false,
            warning_flag: false,
            termination: None,
            history: Vec::new(),
            metrics: ExtractionMetrics::default(),
        }
    }

    /// Source text, unchanged for the whole run.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Violations from the most recent attempt.
    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.validation_errors
    }

    /// Oracle calls made so far.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Most recent candidate that parsed, valid or not.
    pub fn final_output(&self) -> Option<&T> {
        self.final_output.as_ref()
    }

    pub fn into_final_output(self) -> Option<T> {
        self.final_output
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Set when the loop gave up with errors remaining.
    pub fn warning_flag(&self) -> bool {
        self.warning_flag
    }

    /// How the loop ended, `None` while it is still running.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn metrics(&self) -> &ExtractionMetrics {
        &self.metrics
    }

    /// Store the outcome of one oracle call.
    ///
    /// Errors replace the previous round's. A failed call (`candidate` is
    /// `None`) keeps the previous candidate as the best-effort output.
    pub(super) fn record_attempt(
        &mut self,
        candidate: Option<T>,
        errors: ValidationErrors,
        record: AttemptRecord,
    ) {
        self.attempt_count += 1;
        self.metrics.total_attempts = self.attempt_count;
        if candidate.is_some() {
            self.final_output = candidate;
        }
        self.validation_errors = errors;
        self.history.push(record);
    }

    /// Whether the latest attempt produced a candidate with no violations.
    pub(super) fn latest_passed(&self) -> bool {
        self.validation_errors.is_empty()
            && self.final_output.is_some()
            && self.history.last().is_some_and(|r| r.candidate.is_some())
    }

    pub(super) fn finish(&mut self, termination: Termination) {
        self.termination = Some(termination);
        self.is_valid = termination == Termination::Valid;
        self.warning_flag = termination == Termination::BudgetExhausted;
    }

    pub(super) fn metrics_mut(&mut self) -> &mut ExtractionMetrics {
        &mut self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32, candidate: Option<Value>, errors: &[&str]) -> AttemptRecord {
        AttemptRecord {
            attempt_number: n,
            candidate,
            validation_errors: errors.iter().map(|e| e.to_string()).collect(),
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_new_state() {
        let state: LoopState<String> = LoopState::new("text");
        assert_eq!(state.raw_text(), "text");
        assert_eq!(state.attempt_count(), 0);
        assert!(state.final_output().is_none());
        assert!(!state.is_valid());
        assert!(!state.warning_flag());
        assert!(state.termination().is_none());
    }

    #[test]
    fn test_errors_replaced_not_merged() {
        let mut state: LoopState<String> = LoopState::new("text");
        state.record_attempt(
            Some("a".to_string()),
            vec!["first".to_string(), "second".to_string()].into(),
            record(1, Some(Value::Null), &["first", "second"]),
        );
        state.record_attempt(
            Some("b".to_string()),
            vec!["third".to_string()].into(),
            record(2, Some(Value::Null), &["third"]),
        );

        assert_eq!(state.attempt_count(), 2);
        assert_eq!(state.validation_errors().as_slice(), ["third".to_string()]);
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.metrics().total_attempts, 2);
    }

    #[test]
    fn test_failed_call_keeps_previous_candidate() {
        let mut state: LoopState<String> = LoopState::new("text");
        state.record_attempt(
            Some("a".to_string()),
            vec!["bad".to_string()].into(),
            record(1, Some(Value::Null), &["bad"]),
        );
        state.record_attempt(
            None,
            vec!["timeout".to_string()].into(),
            record(2, None, &["timeout"]),
        );

        assert_eq!(state.final_output().map(String::as_str), Some("a"));
        assert_eq!(state.validation_errors().as_slice(), ["timeout".to_string()]);
        assert!(!state.latest_passed());
    }

    #[test]
    fn test_finish_sets_flags() {
        let mut state: LoopState<String> = LoopState::new("text");
        state.finish(Termination::BudgetExhausted);
        assert!(state.warning_flag());
        assert!(!state.is_valid());

        let mut state: LoopState<String> = LoopState::new("text");
        state.finish(Termination::Valid);
        assert!(state.is_valid());
        assert!(!state.warning_flag());
    }
}
