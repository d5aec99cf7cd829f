//! services/client/src/screens/selector.rs
//!
//! Drives a [`CascadingSelector`] against the hierarchy port.
//!
//! The selector lock is never held across a fetch: a transition takes the lock,
//! produces its ticket and releases it; the outcome is applied under the lock
//! again, where superseded tickets are discarded.

use crate::error::ClientError;
use crate::screens::notice::Notice;
use futures::future::join_all;
use question_bank_core::{
    CascadingSelector, EntityId, FetchTicket, HierarchyNode, HierarchyService, Level, PortResult,
    Preset, QuestionScope, Resolution, SelectionPath,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct SelectorDriver {
    selector: Arc<Mutex<CascadingSelector>>,
    hierarchy: Arc<dyn HierarchyService>,
}

impl SelectorDriver {
    pub fn new(hierarchy: Arc<dyn HierarchyService>, preset: Preset) -> Self {
        Self {
            selector: Arc::new(Mutex::new(CascadingSelector::with_preset(preset))),
            hierarchy,
        }
    }

    /// Loads the class list (and the options of any preset levels) concurrently.
    pub async fn mount(&self) -> Vec<Notice> {
        let tickets = self.selector.lock().await.mount();
        self.load_all(tickets).await
    }

    /// Starts over from `preset`, dropping the current selection.
    pub async fn remount(&self, preset: Preset) -> Vec<Notice> {
        let tickets = {
            let mut selector = self.selector.lock().await;
            selector.set_preset(preset);
            selector.mount()
        };
        self.load_all(tickets).await
    }

    async fn load_all(&self, tickets: Vec<FetchTicket>) -> Vec<Notice> {
        let outcomes = join_all(tickets.into_iter().map(|ticket| async move {
            let outcome = self.fetch(&ticket).await;
            (ticket, outcome)
        }))
        .await;

        let mut selector = self.selector.lock().await;
        outcomes
            .into_iter()
            .filter_map(|(ticket, outcome)| settle(&mut selector, &ticket, outcome))
            .collect()
    }

    /// Chooses `id` at `level` and loads the options of the level beneath.
    ///
    /// Returns a notice when that load failed.
    pub async fn choose(&self, level: Level, id: EntityId) -> Result<Option<Notice>, ClientError> {
        let ticket = self.selector.lock().await.choose(level, id)?;
        match ticket {
            Some(ticket) => Ok(self.load(ticket).await),
            None => Ok(None),
        }
    }

    pub async fn clear(&self, level: Level) -> Result<(), ClientError> {
        self.selector.lock().await.clear(level)?;
        Ok(())
    }

    /// A copy of the selector for rendering.
    pub async fn snapshot(&self) -> CascadingSelector {
        self.selector.lock().await.clone()
    }

    pub async fn path(&self) -> SelectionPath {
        self.selector.lock().await.path()
    }

    pub async fn question_scope(&self) -> Option<QuestionScope> {
        self.selector.lock().await.question_scope()
    }

    async fn load(&self, ticket: FetchTicket) -> Option<Notice> {
        let outcome = self.fetch(&ticket).await;
        let mut selector = self.selector.lock().await;
        settle(&mut selector, &ticket, outcome)
    }

    async fn fetch(&self, ticket: &FetchTicket) -> PortResult<Vec<HierarchyNode>> {
        self.hierarchy
            .list_level(ticket.level, ticket.parent.as_ref())
            .await
    }
}

fn settle(
    selector: &mut CascadingSelector,
    ticket: &FetchTicket,
    outcome: PortResult<Vec<HierarchyNode>>,
) -> Option<Notice> {
    match selector.resolve(ticket, outcome) {
        Resolution::Applied => None,
        Resolution::Degraded(error) => {
            warn!("Loading {} options failed: {}", ticket.level, error);
            Some(Notice::error(
                error.user_message(&format!("Failed to fetch {}", ticket.level.plural())),
            ))
        }
        Resolution::Discarded => {
            debug!(
                "Discarding {} options for superseded parent {:?}",
                ticket.level, ticket.parent
            );
            None
        }
    }
}
