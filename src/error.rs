//! Defines the application's primary error type `AppError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition and provides `From`
//! implementations to convert common external errors into `AppError` variants.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `AppError` to be cloneable.

use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all application-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Transport-level failure talking to an upstream service (`reqwest`).
    #[error("HTTP Error: {0}")]
    Http(Arc<reqwest::Error>),

    /// An upstream service answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The LLM answered, but not with anything usable.
    #[error("LLM Error: {0}")]
    Llm(String),

    /// Error during JSON parsing (`serde_json`). Wrapped in Arc as serde_json::Error is not Clone.
    #[error("JSON Parsing Error: {0}")]
    JsonParse(Arc<serde_json::Error>),

    /// Error decoding base64 payloads (`base64`).
    #[error("Base64 Decode Error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Missing or invalid configuration.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error related to standard I/O operations.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// HTTP status of an upstream rejection, if this error is one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Upstream { status, .. } => Some(*status),
            AppError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when GitHub refused to create a repository because the name is taken.
    pub fn is_repo_name_taken(&self) -> bool {
        matches!(
            self,
            AppError::Upstream { service: "github", status: 422, body }
                if body.contains("name already exists")
        )
    }
}

// --- From implementations ---
// Arc is used for non-Clone error types.

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(Arc::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonParse(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_taken_repo_name() {
        let err = AppError::Upstream {
            service: "github",
            status: 422,
            body: r#"{"message":"Repository creation failed.","errors":[{"resource":"Repository","code":"custom","field":"name","message":"name already exists on this account"}]}"#.to_string(),
        };
        assert!(err.is_repo_name_taken());
        assert_eq!(err.upstream_status(), Some(422));
    }

    #[test]
    fn other_422s_are_not_name_conflicts() {
        let err = AppError::Upstream {
            service: "github",
            status: 422,
            body: "Validation Failed".to_string(),
        };
        assert!(!err.is_repo_name_taken());

        let gemini = AppError::Upstream {
            service: "gemini",
            status: 422,
            body: "name already exists".to_string(),
        };
        assert!(!gemini.is_repo_name_taken());
    }

    #[test]
    fn base64_errors_convert() {
        use base64::Engine;
        let err: AppError = base64::engine::general_purpose::STANDARD
            .decode("%%%")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Base64(_)));
    }
}
