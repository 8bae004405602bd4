//! Attempt and size accounting for one extraction request.

use serde::Serialize;

/// Metrics collected while running the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionMetrics {
    /// Oracle calls made.
    pub total_attempts: u32,
    /// Wall-clock time of the whole run.
    pub wall_time_ms: u64,
    /// Estimated tokens sent, summed over attempts.
    pub estimated_input_tokens: usize,
    /// Estimated tokens received, summed over successful calls.
    pub estimated_output_tokens: usize,
}

/// Estimate tokens at four characters per token, rounding up.
///
/// Counts chars rather than bytes so multi-byte text is not overestimated.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("żółw"), 1);
    }
}
