// ============================
// portal-state/src/error.rs
// ============================
//! Error taxonomy of the state core.
use thiserror::Error;

/// Errors surfaced by the state managers
#[derive(Error, Debug)]
pub enum StateError {
    /// Missing required local input; reported synchronously, never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// The service rejected the credentials or token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network or service failure on an external call; the affected state
    /// collapses to a safe empty value
    #[error("Service error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for StateError {
    fn from(err: reqwest::Error) -> Self {
        StateError::Service(err.to_string())
    }
}

impl From<std::io::Error> for StateError {
    fn from(err: std::io::Error) -> Self {
        StateError::Service(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Service(err.to_string())
    }
}
