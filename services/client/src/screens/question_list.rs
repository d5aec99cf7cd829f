//! services/client/src/screens/question_list.rs
//!
//! The "view & edit questions" screen: the cascading selector plus the list of
//! questions filed under the deepest selected level.

use crate::error::ClientError;
use crate::screens::notice::Notice;
use crate::screens::selector::SelectorDriver;
use crate::screens::state::AppState;
use question_bank_core::{
    EntityId, Level, Preset, Question, QuestionList, QuestionScope, QuestionService, Resolution,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const QUESTIONS_FALLBACK: &str = "Failed to fetch questions";

#[derive(Clone)]
pub struct QuestionBrowser {
    selector: SelectorDriver,
    list: Arc<Mutex<QuestionList>>,
    questions: Arc<dyn QuestionService>,
}

impl QuestionBrowser {
    /// Opens the browser for the signed-in actor. Teachers start inside their
    /// assigned class and subject.
    pub fn open(state: &AppState) -> Result<Self, ClientError> {
        state.require(|capabilities| capabilities.browse_questions)?;
        let preset = Preset::for_session(&state.session.current());
        Ok(Self {
            selector: SelectorDriver::new(state.hierarchy.clone(), preset),
            list: Arc::new(Mutex::new(QuestionList::new())),
            questions: state.questions.clone(),
        })
    }

    pub fn selector(&self) -> &SelectorDriver {
        &self.selector
    }

    pub async fn mount(&self) -> Vec<Notice> {
        let mut notices = self.selector.mount().await;
        notices.extend(self.refresh().await);
        notices
    }

    /// Chooses a value and re-lists questions for the new deepest level.
    pub async fn choose(&self, level: Level, id: EntityId) -> Result<Vec<Notice>, ClientError> {
        let mut notices: Vec<Notice> = self.selector.choose(level, id).await?.into_iter().collect();
        notices.extend(self.refresh().await);
        Ok(notices)
    }

    pub async fn clear(&self, level: Level) -> Result<Vec<Notice>, ClientError> {
        self.selector.clear(level).await?;
        Ok(self.refresh().await.into_iter().collect())
    }

    pub async fn questions(&self) -> Vec<Question> {
        self.list.lock().await.questions().to_vec()
    }

    pub async fn scope(&self) -> Option<QuestionScope> {
        self.list.lock().await.scope().cloned()
    }

    /// The listed question `id`, to hand to the editor.
    pub async fn edit_target(&self, id: &EntityId) -> Option<Question> {
        self.list.lock().await.find(id).cloned()
    }

    async fn refresh(&self) -> Option<Notice> {
        let ticket = {
            // Scope is read under the list lock so requests are issued in the
            // same order the selection changed.
            let mut list = self.list.lock().await;
            match self.selector.question_scope().await {
                Some(scope) => list.request(scope),
                None => {
                    list.clear();
                    return None;
                }
            }
        };

        info!("Listing questions for {}", ticket.scope);
        let outcome = self.questions.questions_in(&ticket.scope).await;

        let mut list = self.list.lock().await;
        match list.resolve(&ticket, outcome) {
            Resolution::Applied => None,
            Resolution::Degraded(error) => {
                warn!("Listing questions for {} failed: {}", ticket.scope, error);
                Some(Notice::error(error.user_message(QUESTIONS_FALLBACK)))
            }
            Resolution::Discarded => {
                debug!("Discarding questions for superseded scope {}", ticket.scope);
                None
            }
        }
    }
}
