mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use kulturifiko_schema::{FeedKind, LikeStatus, NewPost, PostView};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ActivityEvent, Comment, Post, Scope, User, Viewer};

/// Account storage used by registration and login
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken username yields `AppError::Conflict`
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// Storage for posts and the comments and likes attached to them.
///
/// Implementations enforce the data invariants: at most one like per
/// (post, user), and no comment or like outliving its post.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts in the viewer's scope, newest first, with per-viewer aggregates
    /// and comments oldest first
    async fn fetch_posts(&self, viewer: &Viewer) -> Result<Vec<PostView>>;

    async fn create_post(&self, owner_id: Uuid, post: &NewPost) -> Result<Uuid>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Flip the like of `user_id` on `post_id`; returns the new state and
    /// the post's like count after the flip
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(LikeStatus, i64)>;

    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment>;

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Remove the post together with its comments and likes
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool>;

    /// Candidate feed events in scope. Returns at least the newest `limit`
    /// events of every kind the feed includes, in no particular order.
    async fn recent_activity(
        &self,
        scope: Scope,
        kind: FeedKind,
        limit: usize,
    ) -> Result<Vec<ActivityEvent>>;
}
