//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use question_bank_core::{PortError, SelectorError, SessionError, ValidationErrors};

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A form failed its client-side checks; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The actor tried a transition the selector does not allow right now.
    #[error("Selection error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The current role may not perform the action.
    #[error("The {0} role may not do this")]
    Forbidden(String),

    /// Building the HTTP client failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading the console).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
