//! crates/question_bank_core/src/selector.rs
//!
//! The Class -> Subject -> Topic -> Subtopic dependent dropdowns as an explicit
//! state machine.
//!
//! The selector never performs I/O. Every transition that needs options for a level
//! hands back a [`FetchTicket`]; the caller runs the fetch and feeds the outcome to
//! [`CascadingSelector::resolve`]. A ticket is tagged with the parent id it was issued
//! for and a generation number, so a response that arrives after the actor has moved
//! on is discarded instead of overwriting fresher options.

use crate::domain::{EntityId, HierarchyNode, Level, Role, SelectionPath, Session};
use crate::ports::{PortError, PortResult};
use crate::question_list::QuestionScope;

//=========================================================================================
// States, Tickets and Errors
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// The level above has no selection.
    Disabled,
    /// Options are loaded and nothing is chosen.
    Idle,
    /// A fetch for this level's options is in flight.
    Loading,
    /// A value is chosen.
    Selected,
}

/// A request for the options of `level` under `parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub level: Level,
    pub parent: Option<EntityId>,
    generation: u64,
}

/// What happened to a fetch outcome handed to [`CascadingSelector::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The fetch failed; the level now shows an empty option list.
    Degraded(PortError),
    /// The ticket was superseded before the outcome arrived.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Choose a {} first", .0.above().map(Level::name).unwrap_or("value"))]
    Disabled(Level),
    #[error("The {0} options are still loading")]
    Loading(Level),
    #[error("The {0} is fixed for this account")]
    Locked(Level),
    #[error("{id} is not one of the available {level} options")]
    UnknownOption { level: Level, id: EntityId },
}

//=========================================================================================
// Presets
//=========================================================================================

/// Values the selector starts with: the path of a question being edited, and for
/// teachers the class/subject their account is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preset {
    path: SelectionPath,
    locked_through: Option<Level>,
}

impl Preset {
    /// Starts from `path`, with every level editable.
    pub fn path(path: SelectionPath) -> Self {
        Self {
            path,
            locked_through: None,
        }
    }

    /// Pins class and subject for a teacher account that carries an assignment.
    pub fn for_session(session: &Session) -> Self {
        let assignment = session
            .actor()
            .filter(|actor| actor.role == Role::Teacher)
            .and_then(|actor| actor.assignment.as_ref());

        match assignment {
            Some(assignment) => Self {
                path: SelectionPath::default()
                    .with(Level::Class, assignment.class_id.clone())
                    .with(Level::Subject, assignment.subject_id.clone()),
                locked_through: Some(Level::Subject),
            },
            None => Self::default(),
        }
    }

    /// Layers `path` over this preset without touching the pinned levels.
    pub fn with_path(mut self, path: &SelectionPath) -> Self {
        for level in Level::ALL {
            if !self.is_locked(level) {
                self.path.set(level, path.get(level).cloned());
            }
        }
        self
    }

    pub fn is_locked(&self, level: Level) -> bool {
        self.locked_through.is_some_and(|through| level <= through)
    }
}

//=========================================================================================
// The Selector
//=========================================================================================

#[derive(Debug, Clone)]
struct Slot {
    selection: Option<EntityId>,
    options: Vec<HierarchyNode>,
    state: SlotState,
    locked: bool,
    pending: Option<u64>,
}

impl Slot {
    fn disabled() -> Self {
        Self {
            selection: None,
            options: Vec::new(),
            state: SlotState::Disabled,
            locked: false,
            pending: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CascadingSelector {
    slots: [Slot; 4],
    preset: Preset,
    next_generation: u64,
}

impl Default for CascadingSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadingSelector {
    pub fn new() -> Self {
        Self::with_preset(Preset::default())
    }

    pub fn with_preset(preset: Preset) -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::disabled()),
            preset,
            next_generation: 0,
        }
    }

    /// Replaces the preset used by the next [`CascadingSelector::mount`].
    pub fn set_preset(&mut self, preset: Preset) {
        self.preset = preset;
    }

    /// (Re)starts the selector from its preset and returns the fetches it needs.
    ///
    /// Without a preset that is just the class list. With one, every preset level and
    /// the level right below the deepest preset value need their options too.
    pub fn mount(&mut self) -> Vec<FetchTicket> {
        self.slots = std::array::from_fn(|_| Slot::disabled());

        for level in Level::ALL {
            match self.preset.path.get(level) {
                Some(id) if !id.is_empty() => {
                    let slot = &mut self.slots[level.index()];
                    slot.selection = Some(id.clone());
                    slot.locked = self.preset.is_locked(level);
                }
                // A gap ends the preset; nothing below it may stay selected.
                _ => break,
            }
        }

        let mut tickets = vec![self.issue(Level::Class, None)];
        for level in Level::Class.descendants() {
            let parent = level.above().and_then(|above| self.selection(above).cloned());
            match parent {
                Some(parent) => tickets.push(self.issue(level, Some(parent))),
                None => break,
            }
        }
        tickets
    }

    /// Picks `id` at `level`, clearing everything beneath it.
    ///
    /// Returns the fetch for the next level's options (none for `Subtopic`).
    pub fn choose(
        &mut self,
        level: Level,
        id: EntityId,
    ) -> Result<Option<FetchTicket>, SelectorError> {
        let slot = &self.slots[level.index()];
        if slot.locked {
            return Err(SelectorError::Locked(level));
        }
        match slot.state {
            SlotState::Disabled => return Err(SelectorError::Disabled(level)),
            SlotState::Loading => return Err(SelectorError::Loading(level)),
            SlotState::Idle | SlotState::Selected => {}
        }
        if !slot.options.iter().any(|node| node.id == id) {
            return Err(SelectorError::UnknownOption { level, id });
        }

        let slot = &mut self.slots[level.index()];
        slot.selection = Some(id.clone());
        slot.state = SlotState::Selected;
        self.disable_below(level);

        Ok(level.below().map(|next| self.issue(next, Some(id))))
    }

    /// Empties `level` and everything beneath it.
    pub fn clear(&mut self, level: Level) -> Result<(), SelectorError> {
        let slot = &mut self.slots[level.index()];
        if slot.locked {
            return Err(SelectorError::Locked(level));
        }
        slot.selection = None;
        if slot.state == SlotState::Selected {
            slot.state = SlotState::Idle;
        }
        self.disable_below(level);
        Ok(())
    }

    /// Applies the outcome of the fetch described by `ticket`, unless the ticket
    /// has been superseded.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        outcome: PortResult<Vec<HierarchyNode>>,
    ) -> Resolution {
        let current_parent = ticket
            .level
            .above()
            .and_then(|above| self.selection(above).cloned());
        let slot = &mut self.slots[ticket.level.index()];
        if slot.pending != Some(ticket.generation) || current_parent != ticket.parent {
            return Resolution::Discarded;
        }

        slot.pending = None;
        slot.state = if slot.selection.is_some() {
            SlotState::Selected
        } else {
            SlotState::Idle
        };
        match outcome {
            Ok(options) => {
                slot.options = options;
                Resolution::Applied
            }
            Err(error) => {
                slot.options.clear();
                Resolution::Degraded(error)
            }
        }
    }

    pub fn state(&self, level: Level) -> SlotState {
        self.slots[level.index()].state
    }

    pub fn selection(&self, level: Level) -> Option<&EntityId> {
        self.slots[level.index()].selection.as_ref()
    }

    pub fn options(&self, level: Level) -> &[HierarchyNode] {
        &self.slots[level.index()].options
    }

    pub fn is_locked(&self, level: Level) -> bool {
        self.slots[level.index()].locked
    }

    pub fn path(&self) -> SelectionPath {
        let mut path = SelectionPath::default();
        for level in Level::ALL {
            path.set(level, self.selection(level).cloned());
        }
        path
    }

    /// The deepest selected level that questions can be listed by.
    /// A class alone is not a question scope.
    pub fn question_scope(&self) -> Option<QuestionScope> {
        if let Some(id) = self.selection(Level::Subtopic) {
            return Some(QuestionScope::Subtopic(id.clone()));
        }
        if let Some(id) = self.selection(Level::Topic) {
            return Some(QuestionScope::Topic(id.clone()));
        }
        self.selection(Level::Subject)
            .map(|id| QuestionScope::Subject(id.clone()))
    }

    fn disable_below(&mut self, level: Level) {
        for below in level.descendants() {
            let slot = &mut self.slots[below.index()];
            slot.selection = None;
            slot.options.clear();
            slot.state = SlotState::Disabled;
            slot.pending = None;
        }
    }

    fn issue(&mut self, level: Level, parent: Option<EntityId>) -> FetchTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        let slot = &mut self.slots[level.index()];
        slot.state = SlotState::Loading;
        slot.pending = Some(generation);
        FetchTicket {
            level,
            parent,
            generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Authenticated, IssuedVia, TeacherAssignment};
    use chrono::Utc;

    fn nodes(ids: &[&str]) -> Vec<HierarchyNode> {
        ids.iter()
            .map(|id| HierarchyNode {
                id: (*id).into(),
                name: id.to_uppercase(),
                parent_id: None,
            })
            .collect()
    }

    fn assert_cascade(selector: &CascadingSelector) {
        for level in Level::ALL {
            if selector.selection(level).is_none() {
                for below in level.descendants() {
                    assert_eq!(selector.selection(below), None, "{below} still selected");
                    assert!(selector.options(below).is_empty(), "{below} still has options");
                }
            }
        }
    }

    /// A selector with class 11, subject phy, topic kin and subtopic proj chosen.
    fn fully_selected() -> CascadingSelector {
        let mut selector = CascadingSelector::new();
        let class = selector.mount().remove(0);
        selector.resolve(&class, Ok(nodes(&["11", "12"])));
        let steps = [
            (Level::Class, "11", vec!["phy", "chem"]),
            (Level::Subject, "phy", vec!["kin", "opt"]),
            (Level::Topic, "kin", vec!["proj", "free"]),
        ];
        for (level, id, children) in steps {
            let ticket = selector.choose(level, id.into()).unwrap().unwrap();
            assert_eq!(selector.resolve(&ticket, Ok(nodes(&children))), Resolution::Applied);
        }
        assert_eq!(selector.choose(Level::Subtopic, "proj".into()), Ok(None));
        selector
    }

    #[test]
    fn mount_fetches_classes_only() {
        let mut selector = CascadingSelector::new();
        let tickets = selector.mount();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].level, Level::Class);
        assert_eq!(tickets[0].parent, None);
        assert_eq!(selector.state(Level::Class), SlotState::Loading);
        assert_eq!(selector.state(Level::Subject), SlotState::Disabled);

        assert_eq!(
            selector.choose(Level::Class, "11".into()),
            Err(SelectorError::Loading(Level::Class))
        );
        selector.resolve(&tickets[0], Ok(nodes(&["11"])));
        assert_eq!(selector.state(Level::Class), SlotState::Idle);
        assert_eq!(
            selector.choose(Level::Subject, "phy".into()),
            Err(SelectorError::Disabled(Level::Subject))
        );
    }

    #[test]
    fn choosing_a_class_resets_everything_below() {
        let mut selector = fully_selected();
        let ticket = selector.choose(Level::Class, "12".into()).unwrap().unwrap();

        assert_eq!(ticket.level, Level::Subject);
        assert_eq!(ticket.parent, Some("12".into()));
        assert_eq!(selector.state(Level::Subject), SlotState::Loading);
        for level in [Level::Topic, Level::Subtopic] {
            assert_eq!(selector.state(level), SlotState::Disabled);
            assert_eq!(selector.selection(level), None);
        }
        assert!(selector.options(Level::Subject).is_empty());
        assert_cascade(&selector);

        selector.resolve(&ticket, Ok(nodes(&["bio"])));
        assert_eq!(selector.state(Level::Subject), SlotState::Idle);
        assert_eq!(selector.options(Level::Subject).len(), 1);
    }

    #[test]
    fn choosing_the_same_class_twice_converges() {
        let mut selector = fully_selected();
        let first = selector.choose(Level::Class, "11".into()).unwrap().unwrap();
        selector.resolve(&first, Ok(nodes(&["phy"])));
        let once = (selector.path(), selector.options(Level::Subject).to_vec());

        let second = selector.choose(Level::Class, "11".into()).unwrap().unwrap();
        selector.resolve(&second, Ok(nodes(&["phy"])));
        assert_eq!((selector.path(), selector.options(Level::Subject).to_vec()), once);
        assert_eq!(selector.state(Level::Subject), SlotState::Idle);
    }

    #[test]
    fn clearing_subject_disables_topic_and_subtopic() {
        let mut selector = fully_selected();
        selector.clear(Level::Subject).unwrap();

        assert_eq!(selector.selection(Level::Subject), None);
        assert_eq!(selector.state(Level::Subject), SlotState::Idle);
        assert_eq!(selector.options(Level::Subject).len(), 2);
        for level in [Level::Topic, Level::Subtopic] {
            assert_eq!(selector.state(level), SlotState::Disabled);
            assert_eq!(selector.selection(level), None);
            assert!(selector.options(level).is_empty());
        }
        assert_cascade(&selector);
    }

    #[test]
    fn superseded_responses_are_discarded() {
        let mut selector = fully_selected();
        let stale = selector.choose(Level::Subject, "chem".into()).unwrap().unwrap();
        let fresh = selector.choose(Level::Subject, "phy".into()).unwrap().unwrap();

        // The chem topics arrive late, after phy was picked.
        assert_eq!(selector.resolve(&stale, Ok(nodes(&["acids"]))), Resolution::Discarded);
        assert_eq!(selector.state(Level::Topic), SlotState::Loading);

        assert_eq!(selector.resolve(&fresh, Ok(nodes(&["kin"]))), Resolution::Applied);
        assert_eq!(selector.options(Level::Topic), nodes(&["kin"]).as_slice());
    }

    #[test]
    fn responses_for_a_cleared_parent_are_discarded() {
        let mut selector = fully_selected();
        let ticket = selector.choose(Level::Subject, "chem".into()).unwrap().unwrap();
        selector.clear(Level::Subject).unwrap();
        assert_eq!(selector.resolve(&ticket, Ok(nodes(&["acids"]))), Resolution::Discarded);
        assert_eq!(selector.state(Level::Topic), SlotState::Disabled);
        assert_cascade(&selector);
    }

    #[test]
    fn failed_fetch_degrades_to_an_empty_idle_level() {
        let mut selector = fully_selected();
        let ticket = selector.choose(Level::Subject, "chem".into()).unwrap().unwrap();
        let outcome = selector.resolve(&ticket, Err(PortError::Transport("offline".into())));

        assert!(matches!(outcome, Resolution::Degraded(PortError::Transport(_))));
        assert_eq!(selector.state(Level::Topic), SlotState::Idle);
        assert!(selector.options(Level::Topic).is_empty());
    }

    #[test]
    fn unknown_options_are_rejected() {
        let mut selector = fully_selected();
        assert_eq!(
            selector.choose(Level::Topic, "nope".into()),
            Err(SelectorError::UnknownOption {
                level: Level::Topic,
                id: "nope".into(),
            })
        );
        assert_eq!(selector.selection(Level::Topic), Some(&"kin".into()));
    }

    #[test]
    fn question_scope_prefers_the_deepest_level() {
        let mut selector = fully_selected();
        assert_eq!(selector.question_scope(), Some(QuestionScope::Subtopic("proj".into())));
        selector.clear(Level::Subtopic).unwrap();
        assert_eq!(selector.question_scope(), Some(QuestionScope::Topic("kin".into())));
        selector.clear(Level::Topic).unwrap();
        assert_eq!(selector.question_scope(), Some(QuestionScope::Subject("phy".into())));
        selector.clear(Level::Subject).unwrap();
        assert_eq!(selector.question_scope(), None);
    }

    #[test]
    fn teacher_assignment_pins_class_and_subject() {
        let session = Session::Authenticated(Authenticated {
            actor_id: "t1".into(),
            role: Role::Teacher,
            token: "tok".into(),
            issued_via: IssuedVia::Login,
            assignment: Some(TeacherAssignment {
                class_id: "11".into(),
                subject_id: "phy".into(),
            }),
            signed_in_at: Utc::now(),
        });
        let mut selector = CascadingSelector::with_preset(Preset::for_session(&session));
        let tickets = selector.mount();

        let levels: Vec<_> = tickets.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![Level::Class, Level::Subject, Level::Topic]);
        assert_eq!(tickets[2].parent, Some("phy".into()));
        for ticket in &tickets {
            let children = match ticket.level {
                Level::Class => nodes(&["11"]),
                Level::Subject => nodes(&["phy"]),
                _ => nodes(&["kin"]),
            };
            assert_eq!(selector.resolve(ticket, Ok(children)), Resolution::Applied);
        }

        assert!(selector.is_locked(Level::Class));
        assert!(selector.is_locked(Level::Subject));
        assert_eq!(selector.state(Level::Subject), SlotState::Selected);
        assert_eq!(selector.state(Level::Topic), SlotState::Idle);
        assert_eq!(
            selector.choose(Level::Class, "11".into()),
            Err(SelectorError::Locked(Level::Class))
        );
        assert_eq!(selector.clear(Level::Subject), Err(SelectorError::Locked(Level::Subject)));

        let subtopics = selector.choose(Level::Topic, "kin".into()).unwrap().unwrap();
        assert_eq!(subtopics.parent, Some("kin".into()));
    }

    #[test]
    fn edit_preset_restores_the_whole_path() {
        let path = SelectionPath::default()
            .with(Level::Class, "11")
            .with(Level::Subject, "phy")
            .with(Level::Topic, "kin")
            .with(Level::Subtopic, "proj");
        let mut selector = CascadingSelector::with_preset(Preset::path(path.clone()));
        let tickets = selector.mount();

        assert_eq!(tickets.len(), 4);
        assert_eq!(selector.path(), path);
        assert!(!selector.is_locked(Level::Class));
        assert_eq!(selector.state(Level::Subtopic), SlotState::Loading);
    }

    #[test]
    fn preset_stops_at_the_first_gap() {
        let path = SelectionPath::default()
            .with(Level::Class, "11")
            .with(Level::Topic, "kin");
        let mut selector = CascadingSelector::with_preset(Preset::path(path));
        assert_eq!(selector.mount().len(), 2);
        assert_eq!(selector.selection(Level::Topic), None);
        assert_cascade(&selector);
    }
}
