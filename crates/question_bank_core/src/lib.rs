pub mod domain;
pub mod gate;
pub mod ports;
pub mod question_list;
pub mod selector;
pub mod session_store;
pub mod validation;

pub use domain::{
    AuthGrant, Authenticated, CreatedQuestion, Credentials, Difficulty, EntityId, GrantedUser,
    HierarchyNode, IssuedVia, Level, OptionKey, Question, QuestionDraft, QuestionType, RegistrationRequest, Role,
    RoleOption, SelectionPath, Session, TeacherAssignment,
};
pub use gate::{Capabilities, GateDecision, GateMode, Route};
pub use ports::{AuthService, HierarchyService, PortError, PortResult, QuestionService};
pub use question_list::{ListTicket, QuestionList, QuestionScope};
pub use selector::{CascadingSelector, FetchTicket, Preset, Resolution, SelectorError, SlotState};
pub use session_store::{SessionAction, SessionError, SessionStore};
pub use validation::ValidationErrors;
