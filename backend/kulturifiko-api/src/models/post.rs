use chrono::{DateTime, Utc};
use kulturifiko_schema::{CultureElement, LearningStyle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub file_path: Option<String>,
    pub culture_elements: Vec<CultureElement>,
    pub learning_styles: Vec<LearningStyle>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}
