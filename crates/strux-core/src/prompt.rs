//! Feedback prompt builder.
//!
//! Pure functions: the same text, errors and settings always produce the
//! same request.

use serde_json::Value;
use strux_oracle::OracleRequest;

const INSTRUCTION: &str = "Extract structured information from the following text:";
const ERRORS_HEADER: &str = "### Previous Validation Errors found in your last output:";
const ERRORS_FOOTER: &str = "Please correct these errors in your new response.";

/// Request settings that do not change between attempts.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    /// System instruction.
    pub system: String,
    /// Model identifier.
    pub model: String,
    /// Oracle-internal retries for malformed replies.
    pub max_retries: u32,
}

/// Compose the user prompt for one attempt.
///
/// With no prior errors this is the bare instruction plus the source text.
/// Otherwise a delimited section lists every prior error verbatim, followed
/// by an instruction to fix them.
pub fn build_prompt(raw_text: &str, previous_errors: &[String]) -> String {
    let mut prompt = format!("{}\n\n{}\n", INSTRUCTION, raw_text);

    if !previous_errors.is_empty() {
        prompt.push('\n');
        prompt.push_str(ERRORS_HEADER);
        prompt.push('\n');
        for error in previous_errors {
            prompt.push_str("- ");
            prompt.push_str(error);
            prompt.push('\n');
        }
        prompt.push('\n');
        prompt.push_str(ERRORS_FOOTER);
    }

    prompt
}

/// Build the full oracle request for one attempt.
pub fn build_request(
    raw_text: &str,
    previous_errors: &[String],
    schema_name: &str,
    schema: &Value,
    settings: &PromptSettings,
) -> OracleRequest {
    OracleRequest::new(build_prompt(raw_text, previous_errors), schema_name, schema.clone())
        .with_system(settings.system.as_str())
        .with_model(settings.model.as_str())
        .with_max_retries(settings.max_retries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_first_attempt_prompt() {
        let prompt = build_prompt("Meeting on 2024-05-15", &[]);
        assert_eq!(
            prompt,
            "Extract structured information from the following text:\n\nMeeting on 2024-05-15\n"
        );
        assert!(!prompt.contains("###"));
    }

    #[test]
    fn test_retry_prompt_lists_errors_verbatim() {
        let errors = vec![
            "end_date (2024-10-15) is before start_date (2024-12-01)".to_string(),
            "grand_total: expected 2837.00 (subtotal 2625.00 - discount 0.00 + tax 212.00), got 2725.00"
                .to_string(),
        ];

        let prompt = build_prompt("Project: Deep Freeze", &errors);

        assert_eq!(
            prompt,
            "Extract structured information from the following text:\n\n\
             Project: Deep Freeze\n\n\
             ### Previous Validation Errors found in your last output:\n\
             - end_date (2024-10-15) is before start_date (2024-12-01)\n\
             - grand_total: expected 2837.00 (subtotal 2625.00 - discount 0.00 + tax 212.00), got 2725.00\n\n\
             Please correct these errors in your new response."
        );
    }

    #[test]
    fn test_build_request_is_deterministic() {
        let settings = PromptSettings {
            system: "You are precise.".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_retries: 2,
        };
        let schema = json!({"type": "object"});
        let errors = vec!["name: must not be empty or whitespace".to_string()];

        let first = build_request("text", &errors, "meeting_notes", &schema, &settings);
        let second = build_request("text", &errors, "meeting_notes", &schema, &settings);

        assert_eq!(first, second);
        assert_eq!(first.system, "You are precise.");
        assert_eq!(first.model, "gpt-4o-mini");
        assert_eq!(first.max_retries, 2);
        assert_eq!(first.schema_name, "meeting_notes");
    }
}
