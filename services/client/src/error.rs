//! services/client/src/error.rs
//!
//! Defines the primary error type for the terminal client.

use crate::config::ConfigError;
use learning_journey_core::{IdentityError, JourneyError, PortError, QuizError};

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    #[error("Journey error: {0}")]
    Journey(#[from] JourneyError),

    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    #[error("Username error: {0}")]
    Identity(#[from] IdentityError),

    /// No username has been chosen on this machine yet.
    #[error("No username set. Run `learn login <name>` first.")]
    NotLoggedIn,

    /// Represents an error from building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ClientError {
    /// The text printed for the user when a command fails.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Journey(e) => e.user_message(),
            ClientError::Quiz(e) => e.user_message(),
            ClientError::Identity(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
