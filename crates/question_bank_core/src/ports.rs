//! crates/question_bank_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core talks to.
//! These traits form the boundary between the pure state machines in this crate
//! and the REST API, so the core never depends on a particular HTTP stack.

use async_trait::async_trait;
use crate::domain::{
    AuthGrant, CreatedQuestion, Credentials, EntityId, HierarchyNode, Level, Question,
    QuestionDraft, RegistrationRequest, RoleOption,
};
use crate::question_list::QuestionScope;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the transport (status codes, sockets, JSON).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The server answered with a non-success status, possibly with its own message.
    #[error("Request rejected with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The text to show the actor: the server's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PortError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait HierarchyService: Send + Sync {
    async fn list_classes(&self) -> PortResult<Vec<HierarchyNode>>;

    async fn list_subjects(&self, class_id: &EntityId) -> PortResult<Vec<HierarchyNode>>;

    async fn list_topics(&self, subject_id: &EntityId) -> PortResult<Vec<HierarchyNode>>;

    async fn list_subtopics(&self, topic_id: &EntityId) -> PortResult<Vec<HierarchyNode>>;

    /// Lists the options of `level` under `parent`. Only `Class` has no parent.
    async fn list_level(
        &self,
        level: Level,
        parent: Option<&EntityId>,
    ) -> PortResult<Vec<HierarchyNode>> {
        match (level, parent) {
            (Level::Class, _) => self.list_classes().await,
            (Level::Subject, Some(parent)) => self.list_subjects(parent).await,
            (Level::Topic, Some(parent)) => self.list_topics(parent).await,
            (Level::Subtopic, Some(parent)) => self.list_subtopics(parent).await,
            (level, None) => Err(PortError::Unexpected(format!(
                "cannot list {} options without a parent",
                level
            ))),
        }
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthGrant>;

    async fn register(&self, request: &RegistrationRequest) -> PortResult<AuthGrant>;

    async fn list_roles(&self) -> PortResult<Vec<RoleOption>>;
}

#[async_trait]
pub trait QuestionService: Send + Sync {
    async fn create_question(&self, draft: &QuestionDraft) -> PortResult<CreatedQuestion>;

    /// Replaces the question `id` and returns the server's acknowledgement message.
    async fn update_question(&self, id: &EntityId, draft: &QuestionDraft) -> PortResult<String>;

    /// Lists the questions filed under exactly one scope (no intersection of levels).
    async fn questions_in(&self, scope: &QuestionScope) -> PortResult<Vec<Question>>;
}
