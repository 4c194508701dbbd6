#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use kulturifiko_api::models::CommentDeletePolicy;
use kulturifiko_api::repository::{MemoryStore, UserRepository};
use kulturifiko_api::services::AuthService;
use kulturifiko_api::{build_router, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(CommentDeletePolicy::AuthorOnly)
    }

    pub fn with_policy(policy: CommentDeletePolicy) -> Self {
        let mut config = Config::in_memory("integration-secret");
        config.policy.comment_delete = policy;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::in_memory(config, store.clone());

        Self {
            router: build_router(state.clone()),
            store,
            state,
        }
    }

    fn auth(&self) -> AuthService {
        AuthService::new(
            self.state.users.clone(),
            self.state.revocations.clone(),
            self.state.config.jwt.clone(),
        )
    }

    /// Register through the HTTP endpoint
    pub async fn register(&self, username: &str) -> Session {
        let (status, body) = self
            .send_json(
                "/auth/register",
                None,
                json!({ "username": username, "password": "correct horse battery" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        Session {
            user_id: body["user_id"].as_str().unwrap().parse().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Admins are never self-registered; create one directly in the store
    pub async fn admin(&self, username: &str) -> Session {
        let user = self
            .store
            .create_user(username, "unused-hash", true)
            .await
            .unwrap();
        let token = self.auth().issue_token(&user).unwrap();

        Session {
            user_id: user.id,
            token,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = self
            .request(builder.body(Body::from(body.to_string())).unwrap())
            .await;
        read_json(response).await
    }

    pub async fn action(&self, session: &Session, body: Value) -> (StatusCode, Value) {
        self.send_json("/posts_management", Some(&session.token), body)
            .await
    }

    pub async fn get_json(&self, uri: &str, session: &Session) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
            .body(Body::empty())
            .unwrap();
        read_json(self.request(request).await).await
    }

    pub async fn create_post(&self, session: &Session, title: &str) -> Uuid {
        let (status, body) = self
            .action(
                session,
                json!({
                    "action": "create_post",
                    "title": title,
                    "description": "Stories from the old town",
                    "culture_elements": ["history"],
                    "learning_styles": ["visual"]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success", "create_post failed: {}", body);
        body["post_id"].as_str().unwrap().parse().unwrap()
    }
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
