use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tags::{CultureElement, LearningStyle};

/// Request body of the `/posts_management` endpoint, discriminated by `action`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PostAction {
    FetchPosts,
    ToggleLike { post_id: Uuid },
    AddComment { post_id: Uuid, comment_text: String },
    DeletePost { post_id: Uuid },
    DeleteComment { comment_id: Uuid },
    CreatePost(NewPost),
}

impl PostAction {
    pub fn name(&self) -> &'static str {
        match self {
            PostAction::FetchPosts => "fetch_posts",
            PostAction::ToggleLike { .. } => "toggle_like",
            PostAction::AddComment { .. } => "add_comment",
            PostAction::DeletePost { .. } => "delete_post",
            PostAction::DeleteComment { .. } => "delete_comment",
            PostAction::CreatePost(_) => "create_post",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub culture_elements: Vec<CultureElement>,
    #[serde(default)]
    pub learning_styles: Vec<LearningStyle>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LikeStatus {
    Liked,
    Unliked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToggleLikeResponse {
    pub status: LikeStatus,
    pub like_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Error,
}

/// Outcome of `add_comment`, `delete_post` and `delete_comment`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResponse {
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn success() -> Self {
        Self {
            status: ActionStatus::Success,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePostResponse {
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
