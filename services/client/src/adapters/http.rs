//! services/client/src/adapters/http.rs
//!
//! This module contains the REST adapter, the concrete implementation of the
//! hierarchy, auth and question ports from the `core` crate. It talks to the
//! question bank API with `reqwest`.

use crate::config::{Config, ConfigError};
use crate::error::ClientError;
use async_trait::async_trait;
use question_bank_core::{
    AuthGrant, AuthService, CreatedQuestion, Credentials, EntityId, HierarchyNode,
    HierarchyService, PortError, PortResult, Question, QuestionDraft, QuestionScope,
    QuestionService, RegistrationRequest, RoleOption, SessionStore,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the client ports over HTTP.
#[derive(Clone)]
pub struct HttpAdapter {
    client: Client,
    base_url: Url,
    session: SessionStore,
}

impl HttpAdapter {
    /// Creates a new `HttpAdapter`. Requests carry the session's bearer token when
    /// there is one.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            ConfigError::InvalidValue("API_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' cannot be used as a base URL", base_url),
            )
            .into());
        }
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> PortResult<T> {
        let response = self
            .request(Method::GET, segments)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> PortResult<T> {
        let response = self
            .request(method, segments)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn list_nodes(
        &self,
        segments: &[&str],
        parent: Option<&EntityId>,
    ) -> PortResult<Vec<HierarchyNode>> {
        let mut nodes: Vec<HierarchyNode> = self.fetch(segments).await?;
        for node in &mut nodes {
            node.parent_id = parent.cloned();
        }
        Ok(nodes)
    }
}

//=========================================================================================
// Response Handling
//=========================================================================================

/// The error body the API sends with non-success statuses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    message: String,
}

fn transport(error: reqwest::Error) -> PortError {
    warn!("Request failed before a response arrived: {}", error);
    PortError::Transport(error.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed response body: {}", e)));
    }

    let url = response.url().path().to_string();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty());
    warn!("{} answered {}: {:?}", url, status, message);

    Err(match (status, message) {
        (_, Some(message)) => PortError::Rejected {
            status: status.as_u16(),
            message: Some(message),
        },
        (StatusCode::UNAUTHORIZED, None) => PortError::Unauthorized,
        (StatusCode::NOT_FOUND, None) => PortError::NotFound(url),
        (status, None) => PortError::Rejected {
            status: status.as_u16(),
            message: None,
        },
    })
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl HierarchyService for HttpAdapter {
    async fn list_classes(&self) -> PortResult<Vec<HierarchyNode>> {
        self.list_nodes(&["upload", "classes"], None).await
    }

    async fn list_subjects(&self, class_id: &EntityId) -> PortResult<Vec<HierarchyNode>> {
        self.list_nodes(&["upload", "subjects", class_id.as_str()], Some(class_id))
            .await
    }

    async fn list_topics(&self, subject_id: &EntityId) -> PortResult<Vec<HierarchyNode>> {
        self.list_nodes(&["upload", "topics", subject_id.as_str()], Some(subject_id))
            .await
    }

    async fn list_subtopics(&self, topic_id: &EntityId) -> PortResult<Vec<HierarchyNode>> {
        self.list_nodes(&["upload", "subtopics", topic_id.as_str()], Some(topic_id))
            .await
    }
}

#[async_trait]
impl AuthService for HttpAdapter {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthGrant> {
        self.send_json(Method::POST, &["users", "login"], credentials)
            .await
    }

    async fn register(&self, request: &RegistrationRequest) -> PortResult<AuthGrant> {
        self.send_json(Method::POST, &["users", "register"], request)
            .await
    }

    async fn list_roles(&self) -> PortResult<Vec<RoleOption>> {
        self.fetch(&["roles"]).await
    }
}

#[async_trait]
impl QuestionService for HttpAdapter {
    async fn create_question(&self, draft: &QuestionDraft) -> PortResult<CreatedQuestion> {
        self.send_json(Method::POST, &["questions"], draft).await
    }

    async fn update_question(&self, id: &EntityId, draft: &QuestionDraft) -> PortResult<String> {
        let ack: Acknowledgement = self
            .send_json(Method::PUT, &["questions", id.as_str()], draft)
            .await?;
        Ok(ack.message)
    }

    async fn questions_in(&self, scope: &QuestionScope) -> PortResult<Vec<Question>> {
        self.fetch(&["questions", scope.segment(), scope.id().as_str()])
            .await
    }
}
