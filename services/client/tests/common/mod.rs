//! In-memory ports shared by the client integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use client_lib::config::Config;
use client_lib::screens::AppState;
use question_bank_core::{
    AuthGrant, AuthService, CreatedQuestion, Credentials, EntityId, GrantedUser, HierarchyNode,
    HierarchyService, IssuedVia, PortError, PortResult, Question, QuestionDraft, QuestionScope,
    QuestionService, RegistrationRequest, Role, RoleOption, SessionAction, SessionStore,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Holds a fake request until the test opens it.
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Resolves once the gated request has reached the fake.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
pub struct FakeApi {
    classes: Vec<HierarchyNode>,
    children: HashMap<String, Vec<HierarchyNode>>,
    questions: HashMap<String, Vec<Question>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Gate>>,
    calls: Mutex<Vec<String>>,
    login_outcome: Mutex<Option<PortResult<AuthGrant>>>,
    pub created: Mutex<Vec<QuestionDraft>>,
    pub updated: Mutex<Vec<(EntityId, QuestionDraft)>>,
}

pub fn node(id: &str, name: &str) -> HierarchyNode {
    HierarchyNode {
        id: id.into(),
        name: name.to_string(),
        parent_id: None,
    }
}

pub fn question(id: &str, text: &str) -> Question {
    Question {
        id: id.into(),
        body: QuestionDraft {
            question_text: text.to_string(),
            ..QuestionDraft::default()
        },
    }
}

pub fn grant(role: &str, token: &str, class: Option<&str>, subject: Option<&str>) -> AuthGrant {
    AuthGrant {
        user: GrantedUser {
            id: "u1".into(),
            username: Some("ada".to_string()),
            class: class.map(EntityId::from),
            subject: subject.map(EntityId::from),
        },
        role: Role::parse(role),
        token: token.to_string(),
    }
}

impl FakeApi {
    /// One class with two subjects, one topic each and one subtopic per topic.
    /// Questions are filed at several depths of the Physics branch.
    pub fn school() -> Self {
        let mut children = HashMap::new();
        children.insert(
            "subjects/c1".to_string(),
            vec![node("s1", "Physics"), node("s2", "Chemistry")],
        );
        children.insert("topics/s1".to_string(), vec![node("t1", "Motion")]);
        children.insert("topics/s2".to_string(), vec![node("t2", "Atoms")]);
        children.insert("subtopics/t1".to_string(), vec![node("st1", "Velocity")]);
        children.insert("subtopics/t2".to_string(), vec![node("st2", "Electrons")]);

        let mut questions = HashMap::new();
        questions.insert("subject/s1".to_string(), vec![question("q1", "What is force?")]);
        questions.insert("topic/t1".to_string(), vec![question("q2", "Define speed")]);
        questions.insert(
            "subtopic/st1".to_string(),
            vec![question("q3", "Is velocity a vector?")],
        );

        Self {
            classes: vec![node("c1", "Class 9")],
            children,
            questions,
            ..Self::default()
        }
    }

    /// Holds the next request for `key` (e.g. `topics/s1`) until the gate opens.
    pub fn gate(&self, key: &str) -> Gate {
        let gate = Gate::default();
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }

    /// Makes every request for `key` fail with a bare server error.
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn answer_login(&self, outcome: PortResult<AuthGrant>) {
        *self.login_outcome.lock().unwrap() = Some(outcome);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    async fn pass(&self, key: &str) -> PortResult<()> {
        self.calls.lock().unwrap().push(key.to_string());
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(PortError::Rejected {
                status: 500,
                message: None,
            });
        }
        Ok(())
    }

    async fn children_of(&self, key: String) -> PortResult<Vec<HierarchyNode>> {
        self.pass(&key).await?;
        Ok(self.children.get(&key).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl HierarchyService for FakeApi {
    async fn list_classes(&self) -> PortResult<Vec<HierarchyNode>> {
        self.pass("classes").await?;
        Ok(self.classes.clone())
    }

    async fn list_subjects(&self, class_id: &EntityId) -> PortResult<Vec<HierarchyNode>> {
        self.children_of(format!("subjects/{}", class_id)).await
    }

    async fn list_topics(&self, subject_id: &EntityId) -> PortResult<Vec<HierarchyNode>> {
        self.children_of(format!("topics/{}", subject_id)).await
    }

    async fn list_subtopics(&self, topic_id: &EntityId) -> PortResult<Vec<HierarchyNode>> {
        self.children_of(format!("subtopics/{}", topic_id)).await
    }
}

#[async_trait]
impl AuthService for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> PortResult<AuthGrant> {
        self.pass("login").await?;
        self.login_outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(PortError::Unauthorized))
    }

    async fn register(&self, request: &RegistrationRequest) -> PortResult<AuthGrant> {
        self.pass("register").await?;
        Ok(grant(
            &request.role,
            "fresh-token",
            Some(&request.class),
            request.subject.as_deref(),
        ))
    }

    async fn list_roles(&self) -> PortResult<Vec<RoleOption>> {
        self.pass("roles").await?;
        Ok(vec![RoleOption {
            id: "r1".into(),
            name: "teacher".to_string(),
        }])
    }
}

#[async_trait]
impl QuestionService for FakeApi {
    async fn create_question(&self, draft: &QuestionDraft) -> PortResult<CreatedQuestion> {
        self.pass("create").await?;
        self.created.lock().unwrap().push(draft.clone());
        Ok(CreatedQuestion {
            message: "Question created successfully".to_string(),
            inserted_id: Some("q9".into()),
        })
    }

    async fn update_question(&self, id: &EntityId, draft: &QuestionDraft) -> PortResult<String> {
        self.pass("update").await?;
        self.updated
            .lock()
            .unwrap()
            .push((id.clone(), draft.clone()));
        Ok("Question updated successfully".to_string())
    }

    async fn questions_in(&self, scope: &QuestionScope) -> PortResult<Vec<Question>> {
        let key = format!("{}/{}", scope.segment(), scope.id());
        self.pass(&key).await?;
        Ok(self.questions.get(&key).cloned().unwrap_or_default())
    }
}

/// An anonymous client wired to `api`.
pub fn app_state(api: &Arc<FakeApi>) -> AppState {
    AppState {
        config: Arc::new(Config::default()),
        hierarchy: api.clone(),
        auth: api.clone(),
        questions: api.clone(),
        session: SessionStore::new(),
    }
}

/// Puts a signed-in actor straight into the session.
pub fn sign_in(state: &AppState, grant: AuthGrant) {
    state
        .session
        .dispatch(SessionAction::SignedIn {
            grant,
            via: IssuedVia::Login,
        })
        .expect("grant carries a token and a role");
}
