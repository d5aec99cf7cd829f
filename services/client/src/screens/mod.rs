pub mod auth;
pub mod notice;
pub mod question_list;
pub mod question_setup;
pub mod selector;
pub mod state;

// Re-export the screen entry points so the console host can reach them directly.
pub use notice::{Notice, NoticeBoard, Severity};
pub use question_list::QuestionBrowser;
pub use question_setup::{EditorMode, QuestionEditor, Submitted};
pub use selector::SelectorDriver;
pub use state::AppState;
