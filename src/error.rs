//! Error types for the portfolio agent
//!
//! Decode-level errors (`Decode`, `MissingField`) are terminal and never
//! produce a reply; processor-level outcomes travel as
//! [`crate::protocol::ErrorDetails`] inside a failure envelope instead of
//! through this type.

use thiserror::Error;

/// Main error type for agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("malformed task payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("required envelope field missing: {0}")]
    MissingField(&'static str),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AgentError {
    /// Create a transport error from any underlying transport failure
    pub fn transport<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Sanitize error messages before they reach a reply envelope or a log line.
///
/// Quote-lookup failures can echo the request URL, which carries the
/// `apikey` query parameter; redact credential-shaped patterns and cap the
/// length at 500 bytes.
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = message.to_string();

    // Credential-shaped query parameters and key/value pairs
    sanitized = regex::Regex::new(r"(?i)(apikey|api_key|password|token|secret)[=:]\s*[^&\s]+")
        .unwrap()
        .replace_all(&sanitized, "${1}=***")
        .to_string();

    if sanitized.len() > 500 {
        let truncate_suffix = "...[truncated]";
        // Messages can carry non-ASCII endpoint text; back off to a char
        // boundary so the cut never lands inside a multibyte character
        let mut cut = 500 - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str(truncate_suffix);
    }

    sanitized
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
