//! services/client/src/screens/notice.rs
//!
//! Transient, dismissible notifications shown after API calls.

use crate::error::ClientError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Holds the one notice currently on screen. A new notice replaces the old one.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn post(&mut self, notice: Notice) {
        self.current = Some(notice);
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) -> Option<Notice> {
        self.current.take()
    }
}

impl ClientError {
    /// What to tell the actor about this error. Server messages are shown verbatim;
    /// anything without one falls back to `fallback`.
    pub fn notice(&self, fallback: &str) -> Notice {
        match self {
            ClientError::Port(error) => Notice::error(error.user_message(fallback)),
            ClientError::Validation(errors) => Notice::error(errors.to_string()),
            ClientError::Selector(error) => Notice::error(error.to_string()),
            ClientError::Forbidden(_) => Notice::error(self.to_string()),
            _ => Notice::error(fallback),
        }
    }
}
