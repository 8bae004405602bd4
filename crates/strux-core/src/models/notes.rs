//! Meeting notes schema: who, when, and what to do next.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::extraction::Extractable;
use crate::validate::rules::{dates, structure};
use crate::validate::{Validate, ValidationErrors};

/// Summary of a meeting or note with its follow-up tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MeetingNotes {
    /// The name of the entity or subject.
    pub name: String,

    /// Date in YYYY-MM-DD format.
    pub date: String,

    /// A list of specific follow-up tasks.
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl Validate for MeetingNotes {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        errors.check(structure::require_non_blank("name", &self.name));
        errors.check(dates::check_date_format("date", &self.date));
        errors.check(structure::require_non_empty(
            "action_items",
            &self.action_items,
            "action item",
        ));
        for (i, item) in self.action_items.iter().enumerate() {
            errors.check(structure::require_non_blank(&format!("action_items[{}]", i), item));
        }

        errors
    }
}

impl Extractable for MeetingNotes {
    const SCHEMA_NAME: &'static str = "meeting_notes";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn notes() -> MeetingNotes {
        MeetingNotes {
            name: "John Doe".to_string(),
            date: "2024-05-15".to_string(),
            action_items: vec![
                "Update the documentation".to_string(),
                "Fix the login bug".to_string(),
            ],
        }
    }

    #[test]
    fn test_valid_notes() {
        assert!(notes().validate().is_empty());
    }

    #[test]
    fn test_invalid_notes_collects_everything() {
        let notes = MeetingNotes {
            name: " ".to_string(),
            date: "15/05/2024".to_string(),
            action_items: vec!["Review".to_string(), "".to_string()],
        };

        let errors = notes.validate().into_vec();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("name:"));
        assert!(errors[1].starts_with("date:"));
        assert!(errors[2].starts_with("action_items[1]:"));
    }

    #[test]
    fn test_missing_action_items() {
        let mut notes = notes();
        notes.action_items.clear();

        assert_eq!(
            notes.validate().into_vec(),
            vec!["action_items: at least one action item is required".to_string()]
        );
    }

    #[test]
    fn test_schema_descriptor_lists_fields() {
        let schema = MeetingNotes::schema_descriptor().unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("name").is_some());
        assert!(properties.get("date").is_some());
        assert!(properties.get("action_items").is_some());
    }
}
