use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tags::{CultureElement, LearningStyle};

/// Response to `fetch_posts`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchPostsResponse {
    pub current_user_id: Uuid,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub posts: Vec<PostView>,
}

/// Post with the aggregates derived for one viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub file_path: Option<String>,
    pub username: String,
    pub profile_picture: Option<String>,
    pub like_count: i64,
    pub user_liked: bool,
    pub comment_count: i64,
    pub comments: Vec<CommentView>,
    #[serde(default)]
    pub culture_elements: Vec<CultureElement>,
    #[serde(default)]
    pub learning_styles: Vec<LearningStyle>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub profile_picture: Option<String>,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn has_any_culture_element(&self, selected: &BTreeSet<CultureElement>) -> bool {
        self.culture_elements.iter().any(|tag| selected.contains(tag))
    }

    pub fn has_any_learning_style(&self, selected: &BTreeSet<LearningStyle>) -> bool {
        self.learning_styles.iter().any(|style| selected.contains(style))
    }
}
