use serde::Deserialize;
use uuid::Uuid;

use super::Viewer;

/// Who may delete a comment. The author always may.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommentDeletePolicy {
    #[default]
    AuthorOnly,
    AuthorOrAdmin,
}

impl CommentDeletePolicy {
    pub fn permits(&self, viewer: &Viewer, author_id: Uuid) -> bool {
        if viewer.user_id == author_id {
            return true;
        }
        match self {
            CommentDeletePolicy::AuthorOnly => false,
            CommentDeletePolicy::AuthorOrAdmin => viewer.is_admin(),
        }
    }
}
