//! crates/question_bank_core/src/session_store.rs
//!
//! The single source of truth for the current session.
//!
//! Every screen gets a clone of the same [`SessionStore`]; the only ways to change the
//! session are [`SessionStore::dispatch`] and its infallible shorthand
//! [`SessionStore::logout`].

use crate::domain::{AuthGrant, Authenticated, IssuedVia, Session};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("The server did not return a token")]
    MissingToken,
    #[error("The server did not return a role")]
    MissingRole,
}

/// The writes the session accepts.
#[derive(Debug, Clone)]
pub enum SessionAction {
    SignedIn { grant: AuthGrant, via: IssuedVia },
    LoggedOut,
}

#[derive(Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Session::Anonymous);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A snapshot of the current session.
    pub fn current(&self) -> Session {
        self.sender.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.sender.borrow().token().map(str::to_string)
    }

    /// A receiver that is notified on every accepted dispatch.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }

    /// Drops back to an anonymous session. Signing out is never refused.
    pub fn logout(&self) {
        self.sender.send_replace(Session::Anonymous);
    }

    /// Applies `action`. A grant without a token or role is refused and the
    /// session stays as it was.
    pub fn dispatch(&self, action: SessionAction) -> Result<(), SessionError> {
        let next = match action {
            SessionAction::SignedIn { grant, via } => {
                if grant.token.trim().is_empty() {
                    return Err(SessionError::MissingToken);
                }
                if grant.role.is_empty() {
                    return Err(SessionError::MissingRole);
                }
                let assignment = grant.assignment();
                Session::Authenticated(Authenticated {
                    actor_id: grant.user.id,
                    role: grant.role,
                    token: grant.token,
                    issued_via: via,
                    assignment,
                    signed_in_at: Utc::now(),
                })
            }
            SessionAction::LoggedOut => {
                self.logout();
                return Ok(());
            }
        };
        self.sender.send_replace(next);
        Ok(())
    }
}
