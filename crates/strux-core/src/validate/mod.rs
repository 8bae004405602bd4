//! Candidate validation.
//!
//! Every rule is a plain function returning a [`Check`]. A schema's
//! [`Validate`] impl runs all of its rules in a fixed order and collects the
//! failures into [`ValidationErrors`]; no rule stops later rules from running.

pub mod rules;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Outcome of a single rule: `Err` carries the human-readable violation.
pub type Check = std::result::Result<(), String>;

/// Trait for schemas with cross-field invariants.
pub trait Validate {
    /// Run every rule and return the violations in check order.
    fn validate(&self) -> ValidationErrors;
}

/// Ordered list of violations. Never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record the outcome of a rule.
    pub fn check(&mut self, result: Check) -> &mut Self {
        if let Err(message) = result {
            self.0.push(message);
        }
        self
    }

    /// Record a violation directly.
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(errors: Vec<String>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Deserialize an oracle reply and validate it.
///
/// A reply that does not fit the schema's shape yields a single structural
/// violation and no candidate. A reply that fits yields the candidate
/// together with its (possibly empty) violations.
pub fn validate_value<T>(value: Value) -> (Option<T>, ValidationErrors)
where
    T: DeserializeOwned + Validate,
{
    match serde_json::from_value::<T>(value) {
        Ok(candidate) => {
            let errors = candidate.validate();
            (Some(candidate), errors)
        }
        Err(e) => {
            let mut errors = ValidationErrors::new();
            errors.push(format!("structure: {}", e));
            (None, errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notes::MeetingNotes;
    use serde_json::json;

    #[test]
    fn test_check_collects_in_order() {
        let mut errors = ValidationErrors::new();
        errors
            .check(Err("first".to_string()))
            .check(Ok(()))
            .check(Err("second".to_string()))
            .check(Err("first".to_string()));

        assert_eq!(errors.as_slice(), ["first", "second", "first"]);
    }

    #[test]
    fn test_validate_value_shape_error() {
        let (candidate, errors) = validate_value::<MeetingNotes>(json!({"name": "x"}));

        assert!(candidate.is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors.as_slice()[0].starts_with("structure:"));
        assert!(errors.as_slice()[0].contains("date"));
    }

    #[test]
    fn test_validate_value_semantic_errors_keep_candidate() {
        let (candidate, errors) = validate_value::<MeetingNotes>(json!({
            "name": "Weekly sync",
            "date": "tomorrow",
            "action_items": ["Ship it"]
        }));

        assert!(candidate.is_some());
        assert_eq!(errors.len(), 1);
        assert!(errors.as_slice()[0].starts_with("date:"));
    }

    #[test]
    fn test_serializes_as_list() {
        let errors = ValidationErrors::from(vec!["a".to_string()]);
        assert_eq!(serde_json::to_value(&errors).unwrap(), json!(["a"]));
    }
}
