//! crates/question_bank_core/src/domain.rs
//!
//! Defines the pure, core data structures for the question bank client.
//! These types carry the wire names the REST API uses, but hold no I/O of their own.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Identifiers
//=========================================================================================

/// An opaque identifier handed out by the API (class, subject, question, user...).
///
/// The server is not consistent about whether ids are strings or numbers, so both
/// are accepted on the way in; they always go back out as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => EntityId(text),
            Raw::Number(number) => EntityId(number.to_string()),
        })
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Roles and Sessions
//=========================================================================================

/// The role an actor signed in with.
///
/// The server sends free-form strings; anything outside the three known roles is kept
/// verbatim so the gate can still route it (to the application root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Unrecognized(String),
}

impl Role {
    /// Parses a role string case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "teacher" => Role::Teacher,
            "student" => Role::Student,
            other => Role::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Unrecognized(raw) => raw,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::parse(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the current session came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuedVia {
    Login,
    Register,
}

/// The fixed class/subject a teacher account is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherAssignment {
    pub class_id: EntityId,
    pub subject_id: EntityId,
}

/// The signed-in half of a [`Session`]. Role and token only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated {
    pub actor_id: EntityId,
    pub role: Role,
    pub token: String,
    pub issued_via: IssuedVia,
    pub assignment: Option<TeacherAssignment>,
    pub signed_in_at: DateTime<Utc>,
}

/// The client-held record of the current actor's authentication state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Authenticated),
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated(auth) if !auth.token.is_empty() => Some(&auth.token),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            Session::Authenticated(auth) => Some(&auth.role),
            Session::Anonymous => None,
        }
    }

    pub fn actor(&self) -> Option<&Authenticated> {
        match self {
            Session::Authenticated(auth) => Some(auth),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

//=========================================================================================
// Class -> Subject -> Topic -> Subtopic Hierarchy
//=========================================================================================

/// One tier of the hierarchy, totally ordered from `Class` down to `Subtopic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Class,
    Subject,
    Topic,
    Subtopic,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Class, Level::Subject, Level::Topic, Level::Subtopic];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn above(self) -> Option<Level> {
        self.index().checked_sub(1).map(|i| Level::ALL[i])
    }

    pub fn below(self) -> Option<Level> {
        Level::ALL.get(self.index() + 1).copied()
    }

    /// Every level strictly beneath this one, nearest first.
    pub fn descendants(self) -> impl Iterator<Item = Level> {
        Level::ALL.into_iter().skip(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Class => "class",
            Level::Subject => "subject",
            Level::Topic => "topic",
            Level::Subtopic => "subtopic",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Level::Class => "classes",
            Level::Subject => "subjects",
            Level::Topic => "topics",
            Level::Subtopic => "subtopics",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| format!("unknown level '{}'", raw))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single class, subject, topic or subtopic as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
    /// Filled in by the adapter from the request that listed this node.
    #[serde(skip)]
    pub parent_id: Option<EntityId>,
}

/// The chosen id at each level, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionPath {
    ids: [Option<EntityId>; 4],
}

impl SelectionPath {
    pub fn get(&self, level: Level) -> Option<&EntityId> {
        self.ids[level.index()].as_ref()
    }

    pub fn set(&mut self, level: Level, id: Option<EntityId>) {
        self.ids[level.index()] = id;
    }

    pub fn with(mut self, level: Level, id: impl Into<EntityId>) -> Self {
        self.set(level, Some(id.into()));
        self
    }
}

//=========================================================================================
// Questions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Short,
}

/// The key of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];
}

/// The editable body of a question, exactly as it is submitted to the API.
///
/// Rich-text fields hold the editor's HTML/LaTeX markup untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(default)]
    pub class_id: Option<EntityId>,
    #[serde(default)]
    pub subject_id: Option<EntityId>,
    #[serde(default)]
    pub topic_id: Option<EntityId>,
    #[serde(default)]
    pub subtopic_id: Option<EntityId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<OptionKey, String>>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer_option: Option<OptionKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer_text: Option<String>,
    #[serde(default)]
    pub answer_explanation: String,
}

/// Reads an optional enum field, treating `""` and `null` as unset. Older forms
/// saved every untouched select as an empty string.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Value(T),
        Text(String),
    }

    match Option::<Raw<T>>::deserialize(deserializer)? {
        Some(Raw::Value(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => Err(D::Error::custom(format!("unexpected value '{}'", text))),
        None => Ok(None),
    }
}

impl QuestionDraft {
    /// Copies the hierarchy ids of `path` into the draft.
    pub fn apply_path(&mut self, path: &SelectionPath) {
        self.class_id = path.get(Level::Class).cloned();
        self.subject_id = path.get(Level::Subject).cloned();
        self.topic_id = path.get(Level::Topic).cloned();
        self.subtopic_id = path.get(Level::Subtopic).cloned();
    }

    pub fn path(&self) -> SelectionPath {
        let mut path = SelectionPath::default();
        path.set(Level::Class, self.class_id.clone());
        path.set(Level::Subject, self.subject_id.clone());
        path.set(Level::Topic, self.topic_id.clone());
        path.set(Level::Subtopic, self.subtopic_id.clone());
        path
    }

    pub fn set_option(&mut self, key: OptionKey, text: impl Into<String>) {
        self.options
            .get_or_insert_with(BTreeMap::new)
            .insert(key, text.into());
    }
}

/// A question as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(flatten)]
    pub body: QuestionDraft,
}

/// The acknowledgement for a newly created question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuestion {
    pub message: String,
    #[serde(default)]
    pub inserted_id: Option<EntityId>,
}

//=========================================================================================
// Authentication Payloads
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The fields of the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub mobile_number: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub class: String,
}

/// The user record returned alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrantedUser {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub class: Option<EntityId>,
    #[serde(default)]
    pub subject: Option<EntityId>,
}

/// The response of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    pub user: GrantedUser,
    pub role: Role,
    #[serde(default)]
    pub token: String,
}

impl AuthGrant {
    /// A teacher bound to both a class and a subject gets a fixed selector root.
    pub fn assignment(&self) -> Option<TeacherAssignment> {
        if self.role != Role::Teacher {
            return None;
        }
        match (&self.user.class, &self.user.subject) {
            (Some(class_id), Some(subject_id)) if !class_id.is_empty() && !subject_id.is_empty() => {
                Some(TeacherAssignment {
                    class_id: class_id.clone(),
                    subject_id: subject_id.clone(),
                })
            }
            _ => None,
        }
    }
}

/// An entry of the role list offered by the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleOption {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive_and_keeps_unknown_roles() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse(" TEACHER "), Role::Teacher);
        assert_eq!(Role::parse("principal"), Role::Unrecognized("principal".into()));
        assert!(Role::parse("").is_empty());
    }

    #[test]
    fn level_navigation() {
        assert_eq!(Level::Class.above(), None);
        assert_eq!(Level::Topic.above(), Some(Level::Subject));
        assert_eq!(Level::Subtopic.below(), None);
        assert_eq!(
            Level::Subject.descendants().collect::<Vec<_>>(),
            vec![Level::Topic, Level::Subtopic]
        );
        assert_eq!("Subtopic".parse::<Level>(), Ok(Level::Subtopic));
        assert!("chapter".parse::<Level>().is_err());
        assert_eq!(Level::Class.plural(), "classes");
    }

    #[test]
    fn entity_ids_accept_numbers() {
        let node: HierarchyNode = serde_json::from_str(r#"{"_id": 11, "name": "Class 11"}"#).unwrap();
        assert_eq!(node.id, EntityId::from("11"));
        assert_eq!(node.parent_id, None);
    }

    #[test]
    fn question_reads_mongo_style_payload() {
        let raw = r#"{
            "_id": "q1",
            "classId": "11",
            "subjectId": "phy",
            "topicId": "kin",
            "subtopicId": "proj",
            "difficulty": "medium",
            "questionType": "mcq",
            "questionText": "<p>Range?</p>",
            "options": {"a": "1", "b": "2", "c": "3", "d": "4"},
            "correctAnswerOption": "b",
            "answerExplanation": ""
        }"#;
        let question: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(question.id.as_str(), "q1");
        assert_eq!(question.body.question_type, Some(QuestionType::Mcq));
        assert_eq!(question.body.correct_answer_option, Some(OptionKey::B));
        assert_eq!(
            question.body.path().get(Level::Topic),
            Some(&EntityId::from("kin"))
        );
    }

    #[test]
    fn blank_selects_from_older_forms_read_as_unset() {
        let raw = r#"[{
            "_id": "q7",
            "classId": "11",
            "subjectId": "phy",
            "topicId": "kin",
            "subtopicId": "proj",
            "correctAnswerOption": "",
            "difficulty": "easy",
            "questionType": "short",
            "questionText": "<p>Unit of force?</p>",
            "options": {"a": "", "b": "", "c": "", "d": ""},
            "correctAnswerText": "Newton",
            "answerExplanation": ""
        }, {
            "_id": "q8",
            "difficulty": "",
            "questionType": null,
            "questionText": "<p>Draft</p>"
        }]"#;
        let questions: Vec<Question> = serde_json::from_str(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].body.correct_answer_option, None);
        assert_eq!(questions[0].body.question_type, Some(QuestionType::Short));
        assert_eq!(questions[0].body.difficulty, Some(Difficulty::Easy));
        assert_eq!(questions[1].body.difficulty, None);
        assert_eq!(questions[1].body.question_type, None);

        let unknown = serde_json::from_str::<Question>(r#"{"_id": "q9", "difficulty": "brutal"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn teacher_grant_carries_assignment() {
        let grant: AuthGrant = serde_json::from_str(
            r#"{"user": {"_id": "u1", "class": "11", "subject": "phy"}, "role": "Teacher", "token": "t"}"#,
        )
        .unwrap();
        assert_eq!(
            grant.assignment(),
            Some(TeacherAssignment {
                class_id: "11".into(),
                subject_id: "phy".into(),
            })
        );

        let admin: AuthGrant =
            serde_json::from_str(r#"{"user": {"id": "u2", "class": "11", "subject": "phy"}, "role": "admin", "token": "t"}"#)
                .unwrap();
        assert_eq!(admin.assignment(), None);
    }
}
