//! Transport between the controller and the `/posts_management` endpoint

use std::time::Duration;

use async_trait::async_trait;
use kulturifiko_schema::{
    ActionResponse, ActionStatus, CreatePostResponse, ErrorBody, FetchPostsResponse, NewPost,
    PostAction, ToggleLikeResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::retry::RetryConfig;

#[async_trait]
pub trait PostApi: Send + Sync {
    async fn fetch_posts(&self) -> Result<FetchPostsResponse>;

    async fn toggle_like(&self, post_id: Uuid) -> Result<ToggleLikeResponse>;

    async fn add_comment(&self, post_id: Uuid, comment_text: &str) -> Result<()>;

    async fn delete_post(&self, post_id: Uuid) -> Result<()>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<()>;

    async fn create_post(&self, post: NewPost) -> Result<Uuid>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

/// `PostApi` over HTTP, authenticated with a bearer session token
pub struct HttpPostApi {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpPostApi {
    pub fn new(config: &ClientConfig, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/posts_management", config.base_url.trim_end_matches('/')),
            token: token.into(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, action: &PostAction) -> Result<T> {
        debug!("Sending {} to {}", action.name(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(action)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn mutate(&self, action: &PostAction) -> Result<()> {
        let response: ActionResponse = self.send(action).await?;
        accepted(response)
    }
}

fn status_error(status: u16, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(envelope) => ClientError::Status {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ClientError::Status {
            status,
            code: "UNKNOWN".to_string(),
            message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

fn accepted(response: ActionResponse) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ClientError::Rejected(
            response
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        ))
    }
}

#[async_trait]
impl PostApi for HttpPostApi {
    async fn fetch_posts(&self) -> Result<FetchPostsResponse> {
        self.send(&PostAction::FetchPosts).await
    }

    async fn toggle_like(&self, post_id: Uuid) -> Result<ToggleLikeResponse> {
        self.send(&PostAction::ToggleLike { post_id }).await
    }

    async fn add_comment(&self, post_id: Uuid, comment_text: &str) -> Result<()> {
        self.mutate(&PostAction::AddComment {
            post_id,
            comment_text: comment_text.to_string(),
        })
        .await
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        self.mutate(&PostAction::DeletePost { post_id }).await
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        self.mutate(&PostAction::DeleteComment { comment_id }).await
    }

    async fn create_post(&self, post: NewPost) -> Result<Uuid> {
        let response: CreatePostResponse = self.send(&PostAction::CreatePost(post)).await?;

        match (response.status, response.post_id) {
            (ActionStatus::Success, Some(post_id)) => Ok(post_id),
            (ActionStatus::Success, None) => {
                Err(ClientError::Decode("missing post_id".to_string()))
            }
            (ActionStatus::Error, _) => Err(ClientError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Request failed".to_string()),
            )),
        }
    }
}
