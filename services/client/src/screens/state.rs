//! services/client/src/screens/state.rs
//!
//! Defines the state shared by every screen of the client.

use crate::adapters::HttpAdapter;
use crate::config::Config;
use crate::error::ClientError;
use question_bank_core::gate::{self, GateDecision, GateMode};
use question_bank_core::{
    AuthService, Capabilities, HierarchyService, QuestionService, SessionStore,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Screens)
//=========================================================================================

/// The shared client state, created once at startup and handed to every screen.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hierarchy: Arc<dyn HierarchyService>,
    pub auth: Arc<dyn AuthService>,
    pub questions: Arc<dyn QuestionService>,
    pub session: SessionStore,
}

impl AppState {
    /// Wires every port to a single HTTP adapter sharing `session`.
    pub fn over_http(config: Config) -> Result<Self, ClientError> {
        let session = SessionStore::new();
        let adapter = Arc::new(HttpAdapter::new(&config, session.clone())?);
        Ok(Self {
            config: Arc::new(config),
            hierarchy: adapter.clone(),
            auth: adapter.clone(),
            questions: adapter,
            session,
        })
    }

    pub fn gate(&self, mode: GateMode) -> GateDecision {
        gate::evaluate(mode, &self.session.current())
    }

    /// The capabilities of the signed-in role, if anyone is signed in.
    pub fn capabilities(&self) -> Option<Capabilities> {
        let session = self.session.current();
        if !session.is_authenticated() {
            return None;
        }
        session.role().map(|role| role.capabilities())
    }

    /// Fails with `Forbidden` unless the signed-in role passes `check`.
    pub fn require(
        &self,
        check: impl Fn(&Capabilities) -> bool,
    ) -> Result<(), ClientError> {
        match self.capabilities() {
            Some(capabilities) if check(&capabilities) => Ok(()),
            _ => {
                let role = self
                    .session
                    .current()
                    .role()
                    .map(|role| role.to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                Err(ClientError::Forbidden(role))
            }
        }
    }
}
