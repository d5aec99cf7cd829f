//! crates/question_bank_core/src/gate.rs
//!
//! Route guarding: decides whether the current session may see a screen,
//! and where to send it otherwise. The gate only reads the session.

use crate::domain::{Role, Session};

/// The screens the client knows how to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    SignIn,
    Register,
    AdminHome,
    TeacherHome,
    StudentHome,
    QuestionSetup,
    QuestionList,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::SignIn => "/login",
            Route::Register => "/signup",
            Route::AdminHome => "/admin/dashboard",
            Route::TeacherHome => "/teacher/dashboard",
            Route::StudentHome => "/student/dashboard",
            Route::QuestionSetup => "/question-setup",
            Route::QuestionList => "/questions",
        }
    }
}

/// What a role may do. Every role-dependent decision reads this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub home: Route,
    pub author_questions: bool,
    pub browse_questions: bool,
}

const ADMIN: Capabilities = Capabilities {
    home: Route::AdminHome,
    author_questions: true,
    browse_questions: true,
};

const TEACHER: Capabilities = Capabilities {
    home: Route::TeacherHome,
    author_questions: true,
    browse_questions: true,
};

const STUDENT: Capabilities = Capabilities {
    home: Route::StudentHome,
    author_questions: false,
    browse_questions: true,
};

const UNRECOGNIZED: Capabilities = Capabilities {
    home: Route::Root,
    author_questions: false,
    browse_questions: false,
};

impl Role {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => ADMIN,
            Role::Teacher => TEACHER,
            Role::Student => STUDENT,
            Role::Unrecognized(_) => UNRECOGNIZED,
        }
    }

    pub fn home(&self) -> Route {
        self.capabilities().home
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Screens that need a signed-in actor.
    Protected,
    /// Screens only anonymous actors should see (sign-in, sign-up).
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    Redirect(Route),
}

/// Protected mode: no token means sign in first. No role branching here.
pub fn protected(session: &Session) -> GateDecision {
    match session.token() {
        Some(_) => GateDecision::Render,
        None => GateDecision::Redirect(Route::SignIn),
    }
}

/// Public mode: a signed-in actor with a role is sent to that role's home.
pub fn public(session: &Session) -> GateDecision {
    match session.actor() {
        Some(actor) if session.is_authenticated() && !actor.role.is_empty() => {
            GateDecision::Redirect(actor.role.home())
        }
        _ => GateDecision::Render,
    }
}

pub fn evaluate(mode: GateMode, session: &Session) -> GateDecision {
    match mode {
        GateMode::Protected => protected(session),
        GateMode::Public => public(session),
    }
}
