//! crates/question_bank_core/src/question_list.rs
//!
//! The result set of the question browser. Questions are always listed by exactly
//! one scope (the deepest selected level), and only the newest request may land.

use crate::domain::{EntityId, Question};
use crate::ports::PortResult;
use crate::selector::Resolution;
use std::fmt;

/// The single level questions are filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuestionScope {
    Subject(EntityId),
    Topic(EntityId),
    Subtopic(EntityId),
}

impl QuestionScope {
    /// The path segment of `GET /questions/{scope}/{id}`.
    pub fn segment(&self) -> &'static str {
        match self {
            QuestionScope::Subject(_) => "subject",
            QuestionScope::Topic(_) => "topic",
            QuestionScope::Subtopic(_) => "subtopic",
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            QuestionScope::Subject(id) | QuestionScope::Topic(id) | QuestionScope::Subtopic(id) => id,
        }
    }
}

impl fmt::Display for QuestionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.segment(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    pub scope: QuestionScope,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionList {
    scope: Option<QuestionScope>,
    questions: Vec<Question>,
    loading: bool,
    generation: u64,
}

impl QuestionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to `scope`. The previous result set is dropped right away.
    pub fn request(&mut self, scope: QuestionScope) -> ListTicket {
        self.generation += 1;
        self.scope = Some(scope.clone());
        self.questions.clear();
        self.loading = true;
        ListTicket {
            scope,
            generation: self.generation,
        }
    }

    /// No scope selected: nothing to show, and any in-flight request is void.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.scope = None;
        self.questions.clear();
        self.loading = false;
    }

    pub fn resolve(&mut self, ticket: &ListTicket, outcome: PortResult<Vec<Question>>) -> Resolution {
        if ticket.generation != self.generation || self.scope.as_ref() != Some(&ticket.scope) {
            return Resolution::Discarded;
        }
        self.loading = false;
        match outcome {
            Ok(questions) => {
                self.questions = questions;
                Resolution::Applied
            }
            Err(error) => {
                self.questions.clear();
                Resolution::Degraded(error)
            }
        }
    }

    pub fn scope(&self) -> Option<&QuestionScope> {
        self.scope.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: &EntityId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }
}
