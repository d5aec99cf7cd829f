//! services/client/src/screens/question_setup.rs
//!
//! The create/edit question screen. The draft's hierarchy ids always come from the
//! cascading selector; everything else is edited on the draft directly.

use crate::error::ClientError;
use crate::screens::notice::Notice;
use crate::screens::selector::SelectorDriver;
use crate::screens::state::AppState;
use question_bank_core::{
    EntityId, Preset, Question, QuestionDraft, QuestionService, Route,
};
use std::sync::Arc;
use tracing::{info, warn};

pub const SUBMIT_FALLBACK: &str = "Failed to save question";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(EntityId),
}

/// What a successful submit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub notice: Notice,
    pub inserted_id: Option<EntityId>,
    /// Edits return to the question list; creates stay for the next question.
    pub redirect: Option<Route>,
}

pub struct QuestionEditor {
    selector: SelectorDriver,
    questions: Arc<dyn QuestionService>,
    draft: QuestionDraft,
    mode: EditorMode,
    /// What the selector returns to after a submit (a teacher's pinned root).
    base_preset: Preset,
}

impl QuestionEditor {
    /// A blank editor for a new question.
    pub fn create(state: &AppState) -> Result<Self, ClientError> {
        state.require(|capabilities| capabilities.author_questions)?;
        let preset = Preset::for_session(&state.session.current());
        Ok(Self {
            selector: SelectorDriver::new(state.hierarchy.clone(), preset.clone()),
            questions: state.questions.clone(),
            draft: QuestionDraft::default(),
            mode: EditorMode::Create,
            base_preset: preset,
        })
    }

    /// An editor pre-filled with `question`. A teacher's pinned class and subject
    /// win over the question's own.
    pub fn edit(state: &AppState, question: Question) -> Result<Self, ClientError> {
        state.require(|capabilities| capabilities.author_questions)?;
        let base_preset = Preset::for_session(&state.session.current());
        let preset = base_preset.clone().with_path(&question.body.path());
        Ok(Self {
            selector: SelectorDriver::new(state.hierarchy.clone(), preset),
            questions: state.questions.clone(),
            draft: question.body,
            mode: EditorMode::Edit(question.id),
            base_preset,
        })
    }

    pub async fn mount(&self) -> Vec<Notice> {
        self.selector.mount().await
    }

    pub fn selector(&self) -> &SelectorDriver {
        &self.selector
    }

    pub fn draft(&self) -> &QuestionDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut QuestionDraft {
        &mut self.draft
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    /// Validates and sends the draft. Nothing is sent if validation fails.
    ///
    /// On success the form is reset to a blank create form.
    pub async fn submit(&mut self) -> Result<Submitted, ClientError> {
        self.draft.apply_path(&self.selector.path().await);
        self.draft.validate()?;
        let payload = self.draft.for_submission();

        let submitted = match &self.mode {
            EditorMode::Create => {
                let created = self.questions.create_question(&payload).await.map_err(|e| {
                    warn!("Creating question failed: {}", e);
                    e
                })?;
                info!("Question created: {:?}", created.inserted_id);
                Submitted {
                    notice: Notice::success(created.message),
                    inserted_id: created.inserted_id,
                    redirect: None,
                }
            }
            EditorMode::Edit(id) => {
                let message = self.questions.update_question(id, &payload).await.map_err(|e| {
                    warn!("Updating question {} failed: {}", id, e);
                    e
                })?;
                info!("Question {} updated", id);
                Submitted {
                    notice: Notice::success(message),
                    inserted_id: None,
                    redirect: Some(Route::QuestionList),
                }
            }
        };

        self.reset().await;
        Ok(submitted)
    }

    async fn reset(&mut self) {
        self.draft = QuestionDraft::default();
        self.mode = EditorMode::Create;
        for notice in self.selector.remount(self.base_preset.clone()).await {
            warn!("Reloading the selector after submit: {}", notice.message);
        }
    }
}
