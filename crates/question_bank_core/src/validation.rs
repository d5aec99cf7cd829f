//! crates/question_bank_core/src/validation.rs
//!
//! Client-side checks that run before anything is sent to the API.
//! Errors are collected per field so a form can show them inline.

use crate::domain::{Credentials, OptionKey, QuestionDraft, QuestionType, RegistrationRequest, Role};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const REQUIRED: &str = "This field is required";

/// Field name -> message, in the order the problems were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push((field.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, message)| (name.as_str(), message.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(name, message)| format!("{name}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Rich text with the markup stripped. An editor left blank still produces
/// things like `<p><br></p>`, which must count as empty.
pub fn visible_text(rich: &str) -> String {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    let markup = MARKUP.get_or_init(|| Regex::new(r"(?i)<[^>]*>|&nbsp;").expect("valid markup pattern"));
    markup.replace_all(rich, " ").trim().to_string()
}

fn has_text(rich: &str) -> bool {
    !visible_text(rich).is_empty()
}

impl QuestionDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let ids = [
            ("classId", &self.class_id),
            ("subjectId", &self.subject_id),
            ("topicId", &self.topic_id),
            ("subtopicId", &self.subtopic_id),
        ];
        for (field, id) in ids {
            if id.as_ref().map_or(true, |id| id.is_empty()) {
                errors.add(field, REQUIRED);
            }
        }
        if self.difficulty.is_none() {
            errors.add("difficulty", REQUIRED);
        }
        if !has_text(&self.question_text) {
            errors.add("questionText", REQUIRED);
        }

        match self.question_type {
            None => errors.add("questionType", REQUIRED),
            Some(QuestionType::Mcq) => {
                let filled = |key: OptionKey| {
                    self.options
                        .as_ref()
                        .and_then(|options| options.get(&key))
                        .is_some_and(|text| has_text(text))
                };
                match self.correct_answer_option {
                    None => errors.add("correctAnswerOption", REQUIRED),
                    Some(key) if !filled(key) => errors.add(
                        format!("options.{}", option_name(key)),
                        "The correct option must have text",
                    ),
                    Some(_) => {}
                }
                if OptionKey::ALL.into_iter().filter(|key| filled(*key)).count() < 2 {
                    errors.add("options", "Provide at least two options");
                }
            }
            Some(QuestionType::Short) => {
                if !self.correct_answer_text.as_deref().is_some_and(has_text) {
                    errors.add("correctAnswerText", REQUIRED);
                }
            }
        }

        errors.into_result()
    }

    /// The payload actually sent: option fields only for MCQs, the answer text
    /// only for short answers.
    pub fn for_submission(&self) -> QuestionDraft {
        let mut payload = self.clone();
        match self.question_type {
            Some(QuestionType::Mcq) => payload.correct_answer_text = None,
            _ => {
                payload.options = None;
                payload.correct_answer_option = None;
            }
        }
        payload
    }
}

fn option_name(key: OptionKey) -> &'static str {
    match key {
        OptionKey::A => "a",
        OptionKey::B => "b",
        OptionKey::C => "c",
        OptionKey::D => "d",
    }
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result()
    }
}

impl RegistrationRequest {
    /// Every field is required; the subject only for teachers.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let fields = [
            ("name", &self.name),
            ("username", &self.username),
            ("password", &self.password),
            ("mobileNumber", &self.mobile_number),
            ("email", &self.email),
            ("role", &self.role),
            ("class", &self.class),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                errors.add(field, REQUIRED);
            }
        }
        let teacher = Role::parse(&self.role) == Role::Teacher;
        if teacher && self.subject.as_deref().map_or(true, |s| s.trim().is_empty()) {
            errors.add("subject", REQUIRED);
        }
        errors.into_result()
    }

    /// Drops the subject for anyone who is not a teacher.
    pub fn for_submission(&self) -> RegistrationRequest {
        let mut payload = self.clone();
        if Role::parse(&self.role) != Role::Teacher {
            payload.subject = None;
        }
        payload
    }
}
