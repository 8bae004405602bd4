//! Error types for the oracle layer.

use thiserror::Error;

/// Errors that can occur while calling a structured-generation oracle.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The request could not be built (bad schema descriptor, bad config).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or connection failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service did not answer within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The service rejected the call because of rate limits or quota.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The service rejected the credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The reply was still not a usable JSON object after all internal retries.
    #[error("malformed reply after {attempts} tries: {message}")]
    MalformedReply { attempts: u32, message: String },

    /// A scripted backend ran out of recorded replies.
    #[error("no more recorded replies")]
    Exhausted,

    /// I/O error when reading recorded replies.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OracleError {
    /// Whether the failure may be fed back into another extraction attempt.
    ///
    /// Everything except a request that could not be built is retriable:
    /// the caller folds the message into its error list and tries again.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, OracleError::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            OracleError::InvalidRequest(e.to_string())
        } else {
            OracleError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_classification() {
        assert!(OracleError::Transport("reset".into()).is_retriable());
        assert!(OracleError::RateLimited("quota".into()).is_retriable());
        assert!(OracleError::Timeout(30).is_retriable());
        assert!(OracleError::Exhausted.is_retriable());
        assert!(!OracleError::InvalidRequest("bad schema".into()).is_retriable());
    }

    #[test]
    fn test_error_messages() {
        let err = OracleError::Api {
            status: 500,
            message: "internal".into(),
        };
        assert_eq!(err.to_string(), "service returned 500: internal");

        let err = OracleError::MalformedReply {
            attempts: 4,
            message: "expected value".into(),
        };
        assert_eq!(err.to_string(), "malformed reply after 4 tries: expected value");
    }
}
