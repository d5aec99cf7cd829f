//! services/client/src/bin/quizbank.rs
//!
//! A line-oriented console host for the question bank client. Each command maps to
//! one screen action; the access gate decides which screen is actually shown.

use client_lib::{
    config::Config,
    error::ClientError,
    screens::{
        auth::{self, LOGIN_FALLBACK, REGISTER_FALLBACK},
        question_list::QUESTIONS_FALLBACK,
        question_setup::SUBMIT_FALLBACK,
        AppState, Notice, NoticeBoard, QuestionBrowser, QuestionEditor, SelectorDriver,
    },
};
use question_bank_core::{
    gate::{GateDecision, GateMode},
    Credentials, Difficulty, EntityId, Level, OptionKey, QuestionType, RegistrationRequest, Route,
};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  login <username> <password>
  register <name> <username> <password> <mobile> <email> <role> <class> [subject]
  roles | logout | browse | new | edit <question-id>
  choose <class|subject|topic|subtopic> <id> | clear <level> | show
  set difficulty|type|text|answer|explanation <value>
  set option <a|b|c|d> <text> | set correct <a|b|c|d>
  submit | dismiss | help | quit";

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Using API at {}", config.api_base_url);

    // --- 2. Build the Shared AppState ---
    let state = AppState::over_http(config)?;
    println!(
        "Question bank console on {} (requests time out after {}s)",
        state.config.api_base_url,
        state.config.request_timeout.as_secs()
    );
    let mut console = Console::new(state);
    console.navigate(Route::Root);
    println!("{HELP}");

    // --- 3. Run the Command Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.first() == Some(&"quit") {
            break;
        }
        console.handle(&words).await;
        console.render_notice();
    }
    info!("Console closed");
    Ok(())
}

struct Console {
    state: AppState,
    route: Route,
    board: NoticeBoard,
    browser: Option<QuestionBrowser>,
    editor: Option<QuestionEditor>,
}

impl Console {
    fn new(state: AppState) -> Self {
        Self {
            state,
            route: Route::Root,
            board: NoticeBoard::default(),
            browser: None,
            editor: None,
        }
    }

    /// Moves to `route`, following gate redirects until a screen renders.
    fn navigate(&mut self, mut route: Route) {
        loop {
            let mode = match route {
                Route::Root | Route::SignIn | Route::Register => GateMode::Public,
                _ => GateMode::Protected,
            };
            match self.state.gate(mode) {
                GateDecision::Redirect(next) if next != route => route = next,
                _ => break,
            }
        }
        self.route = route;
        println!("-> {}", route.path());
    }

    async fn handle(&mut self, words: &[&str]) {
        let result = match words {
            [] => Ok(()),
            ["help"] => {
                println!("{HELP}");
                Ok(())
            }
            ["dismiss"] => {
                self.board.dismiss();
                Ok(())
            }
            ["login", username, password] => {
                let credentials = Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                };
                match auth::login(&self.state, credentials).await {
                    Ok(home) => {
                        self.board.post(Notice::success("Login successful!"));
                        self.navigate(home);
                        Ok(())
                    }
                    Err(e) => Err(e.notice(LOGIN_FALLBACK)),
                }
            }
            ["register", name, username, password, mobile, email, role, class, rest @ ..] => {
                let request = RegistrationRequest {
                    name: name.to_string(),
                    username: username.to_string(),
                    password: password.to_string(),
                    mobile_number: mobile.to_string(),
                    email: email.to_string(),
                    role: role.to_string(),
                    subject: rest.first().map(|s| s.to_string()),
                    class: class.to_string(),
                };
                match auth::register(&self.state, request).await {
                    Ok(home) => {
                        self.navigate(home);
                        Ok(())
                    }
                    Err(e) => Err(e.notice(REGISTER_FALLBACK)),
                }
            }
            ["roles"] => match auth::roles(&self.state).await {
                Ok(roles) => {
                    for role in roles {
                        println!("  {} ({})", role.name, role.id);
                    }
                    Ok(())
                }
                Err(e) => Err(e.notice("Failed to fetch roles")),
            },
            ["logout"] => {
                self.browser = None;
                self.editor = None;
                let route = auth::logout(&self.state);
                self.navigate(route);
                Ok(())
            }
            ["browse"] => self.open_browser().await,
            ["new"] => self.open_editor(None).await,
            ["edit", id] => self.open_editor(Some(EntityId::from(*id))).await,
            ["choose", level, id] => self.choose(level, id).await,
            ["clear", level] => self.clear(level).await,
            ["show"] => {
                self.show().await;
                Ok(())
            }
            ["set", field, value @ ..] => self.set(field, &value.join(" ")),
            ["submit"] => self.submit().await,
            _ => Err(Notice::error(format!("Unknown command: {}", words.join(" ")))),
        };
        if let Err(notice) = result {
            self.board.post(notice);
        }
    }

    async fn open_browser(&mut self) -> Result<(), Notice> {
        self.navigate(Route::QuestionList);
        if self.route != Route::QuestionList {
            return Ok(());
        }
        let browser = QuestionBrowser::open(&self.state).map_err(|e| e.notice(QUESTIONS_FALLBACK))?;
        self.post_all(browser.mount().await);
        self.browser = Some(browser);
        self.show().await;
        Ok(())
    }

    async fn open_editor(&mut self, question: Option<EntityId>) -> Result<(), Notice> {
        let target = match (&question, &self.browser) {
            (Some(id), Some(browser)) => Some(
                browser
                    .edit_target(id)
                    .await
                    .ok_or_else(|| Notice::error(format!("Question {} is not listed", id)))?,
            ),
            (Some(_), None) => return Err(Notice::error("Browse questions before editing one")),
            (None, _) => None,
        };

        self.navigate(Route::QuestionSetup);
        if self.route != Route::QuestionSetup {
            return Ok(());
        }
        let editor = match target {
            Some(question) => QuestionEditor::edit(&self.state, question),
            None => QuestionEditor::create(&self.state),
        }
        .map_err(|e| e.notice(SUBMIT_FALLBACK))?;
        self.post_all(editor.mount().await);
        self.editor = Some(editor);
        self.show().await;
        Ok(())
    }

    fn active_selector(&self) -> Option<&SelectorDriver> {
        match self.route {
            Route::QuestionSetup => self.editor.as_ref().map(QuestionEditor::selector),
            Route::QuestionList => self.browser.as_ref().map(QuestionBrowser::selector),
            _ => None,
        }
    }

    async fn choose(&mut self, level: &str, id: &str) -> Result<(), Notice> {
        let level: Level = level.parse().map_err(Notice::error)?;
        let id = EntityId::from(id);
        let notices = match (self.route, &self.browser) {
            (Route::QuestionList, Some(browser)) => browser.choose(level, id).await,
            _ => match self.active_selector() {
                Some(selector) => selector
                    .choose(level, id)
                    .await
                    .map(|notice| notice.into_iter().collect()),
                None => return Err(Notice::error("No selector on this screen")),
            },
        }
        .map_err(|e| e.notice("Selection failed"))?;
        self.post_all(notices);
        self.show().await;
        Ok(())
    }

    async fn clear(&mut self, level: &str) -> Result<(), Notice> {
        let level: Level = level.parse().map_err(Notice::error)?;
        let notices = match (self.route, &self.browser) {
            (Route::QuestionList, Some(browser)) => browser.clear(level).await,
            _ => match self.active_selector() {
                Some(selector) => selector.clear(level).await.map(|_| Vec::new()),
                None => return Err(Notice::error("No selector on this screen")),
            },
        }
        .map_err(|e| e.notice("Selection failed"))?;
        self.post_all(notices);
        self.show().await;
        Ok(())
    }

    fn set(&mut self, field: &str, value: &str) -> Result<(), Notice> {
        let editor = match (self.route, self.editor.as_mut()) {
            (Route::QuestionSetup, Some(editor)) => editor,
            _ => return Err(Notice::error("Open the question editor first")),
        };
        let draft = editor.draft_mut();
        match field {
            "difficulty" => draft.difficulty = Some(parse_word::<Difficulty>(value)?),
            "type" => draft.question_type = Some(parse_word::<QuestionType>(value)?),
            "text" => draft.question_text = value.to_string(),
            "answer" => draft.correct_answer_text = Some(value.to_string()),
            "explanation" => draft.answer_explanation = value.to_string(),
            "correct" => draft.correct_answer_option = Some(parse_word::<OptionKey>(value)?),
            "option" => {
                let (key, text) = value.split_once(' ').unwrap_or((value, ""));
                draft.set_option(parse_word::<OptionKey>(key)?, text);
            }
            other => return Err(Notice::error(format!("Unknown field: {}", other))),
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<(), Notice> {
        let editor = match (self.route, self.editor.as_mut()) {
            (Route::QuestionSetup, Some(editor)) => editor,
            _ => return Err(Notice::error("Open the question editor first")),
        };
        let submitted = editor.submit().await.map_err(|e| e.notice(SUBMIT_FALLBACK))?;
        self.board.post(submitted.notice);
        if let Some(route) = submitted.redirect {
            if route == Route::QuestionList && self.browser.is_some() {
                self.navigate(route);
            }
        }
        Ok(())
    }

    async fn show(&self) {
        let Some(selector) = self.active_selector() else {
            println!("   screen {}", self.route.path());
            return;
        };
        let snapshot = selector.snapshot().await;
        for level in Level::ALL {
            let names: Vec<String> = snapshot
                .options(level)
                .iter()
                .map(|node| format!("{}={}", node.id, node.name))
                .collect();
            println!(
                "   {:<9} {:?}{} selected={} [{}]",
                level.name(),
                snapshot.state(level),
                if snapshot.is_locked(level) { " (fixed)" } else { "" },
                snapshot.selection(level).map(EntityId::as_str).unwrap_or("-"),
                names.join(", ")
            );
        }
        if let (Route::QuestionList, Some(browser)) = (self.route, &self.browser) {
            if let Some(scope) = browser.scope().await {
                println!("   questions for {}:", scope);
            }
            for question in browser.questions().await {
                println!("     {} {}", question.id, question.body.question_text);
            }
        }
        if let (Route::QuestionSetup, Some(editor)) = (self.route, &self.editor) {
            println!("   mode {:?}, draft {:?}", editor.mode(), editor.draft());
        }
    }

    fn post_all(&mut self, notices: Vec<Notice>) {
        // The board shows one notice at a time; the last one wins.
        for notice in notices {
            self.board.post(notice);
        }
    }

    fn render_notice(&self) {
        if let Some(notice) = self.board.current() {
            println!("{}", notice);
        }
    }
}

/// Parses a lowercase wire word (`mcq`, `hard`, `b`...) into its enum.
fn parse_word<T: DeserializeOwned>(value: &str) -> Result<T, Notice> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| Notice::error(format!("Unexpected value: {}", value)))
}
