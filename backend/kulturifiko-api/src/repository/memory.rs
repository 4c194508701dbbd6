use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kulturifiko_schema::{
    CommentView, FeedKind, LikeStatus, NewPost, NotificationKind, PostView,
};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{ActivityEvent, Comment, Post, Scope, User, Viewer};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-local storage behind a single lock.
///
/// Every operation runs under the lock, so a like toggle is a plain
/// check-then-act.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    clock: Clock,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    /// Keyed by (post_id, user_id)
    likes: HashMap<(Uuid, Uuid), LikeRow>,
}

#[derive(Debug, Clone)]
struct LikeRow {
    id: Uuid,
    created_at: DateTime<Utc>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Store stamping rows with times from `clock`
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn comment_count(&self) -> usize {
        self.state.lock().comments.len()
    }

    pub fn like_count(&self) -> usize {
        self.state.lock().likes.len()
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().posts.len()
    }
}

impl MemoryState {
    fn username(&self, user_id: Uuid) -> String {
        self.users
            .get(&user_id)
            .map(|user| user.username.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn profile_picture(&self, user_id: Uuid) -> Option<String> {
        self.users
            .get(&user_id)
            .and_then(|user| user.profile_picture.clone())
    }

    fn post_view(&self, post: &Post, viewer_id: Uuid) -> PostView {
        let mut comments: Vec<&Comment> = self
            .comments
            .values()
            .filter(|comment| comment.post_id == post.id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let like_count = self
            .likes
            .keys()
            .filter(|(post_id, _)| *post_id == post.id)
            .count() as i64;

        PostView {
            id: post.id,
            user_id: post.user_id,
            title: post.title.clone(),
            description: post.description.clone(),
            file_path: post.file_path.clone(),
            username: self.username(post.user_id),
            profile_picture: self.profile_picture(post.user_id),
            like_count,
            user_liked: self.likes.contains_key(&(post.id, viewer_id)),
            comment_count: comments.len() as i64,
            comments: comments
                .into_iter()
                .map(|comment| CommentView {
                    id: comment.id,
                    user_id: comment.user_id,
                    username: self.username(comment.user_id),
                    profile_picture: self.profile_picture(comment.user_id),
                    comment_text: comment.comment_text.clone(),
                    created_at: comment.created_at,
                })
                .collect(),
            culture_elements: post.culture_elements.clone(),
            learning_styles: post.learning_styles.clone(),
            created_at: post.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User> {
        let now = self.now();
        let mut state = self.state.lock();

        if state.users.values().any(|user| user.username == username) {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            profile_picture: None,
            created_at: now,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.lock();
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.state.lock().users.get(&user_id).cloned())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn fetch_posts(&self, viewer: &Viewer) -> Result<Vec<PostView>> {
        let scope = viewer.scope();
        let state = self.state.lock();

        let mut posts: Vec<&Post> = state
            .posts
            .values()
            .filter(|post| scope.includes(post.user_id))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(posts
            .into_iter()
            .map(|post| state.post_view(post, viewer.user_id))
            .collect())
    }

    async fn create_post(&self, owner_id: Uuid, post: &NewPost) -> Result<Uuid> {
        let now = self.now();
        let mut state = self.state.lock();

        let stored = Post {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: post.title.clone(),
            description: post.description.clone(),
            file_path: post.file_path.clone(),
            culture_elements: post.culture_elements.clone(),
            learning_styles: post.learning_styles.clone(),
            created_at: now,
        };
        let post_id = stored.id;
        state.posts.insert(post_id, stored);

        Ok(post_id)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.state.lock().posts.get(&post_id).cloned())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(LikeStatus, i64)> {
        let now = self.now();
        let mut state = self.state.lock();

        if !state.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let status = if state.likes.remove(&(post_id, user_id)).is_some() {
            LikeStatus::Unliked
        } else {
            state.likes.insert(
                (post_id, user_id),
                LikeRow {
                    id: Uuid::new_v4(),
                    created_at: now,
                },
            );
            LikeStatus::Liked
        };

        let like_count = state
            .likes
            .keys()
            .filter(|(liked_post, _)| *liked_post == post_id)
            .count() as i64;

        Ok((status, like_count))
    }

    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        let now = self.now();
        let mut state = self.state.lock();

        if !state.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            comment_text: text.to_string(),
            created_at: now,
        };
        state.comments.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self.state.lock().comments.get(&comment_id).cloned())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock();

        if state.posts.remove(&post_id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, comment| comment.post_id != post_id);
        state.likes.retain(|(liked_post, _), _| *liked_post != post_id);

        Ok(true)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        Ok(self.state.lock().comments.remove(&comment_id).is_some())
    }

    async fn recent_activity(
        &self,
        scope: Scope,
        kind: FeedKind,
        _limit: usize,
    ) -> Result<Vec<ActivityEvent>> {
        let state = self.state.lock();
        let mut events = Vec::new();

        for post in state.posts.values().filter(|post| scope.includes(post.user_id)) {
            events.push(ActivityEvent {
                kind: NotificationKind::PostCreated,
                event_id: post.id,
                post_id: post.id,
                post_title: post.title.clone(),
                actor_id: post.user_id,
                actor_username: state.username(post.user_id),
                occurred_at: post.created_at,
            });
        }

        if kind == FeedKind::Activity {
            for comment in state.comments.values() {
                let Some(post) = state.posts.get(&comment.post_id) else {
                    continue;
                };
                if !scope.includes(post.user_id) {
                    continue;
                }
                events.push(ActivityEvent {
                    kind: NotificationKind::CommentAdded,
                    event_id: comment.id,
                    post_id: post.id,
                    post_title: post.title.clone(),
                    actor_id: comment.user_id,
                    actor_username: state.username(comment.user_id),
                    occurred_at: comment.created_at,
                });
            }

            for ((post_id, user_id), like) in &state.likes {
                let Some(post) = state.posts.get(post_id) else {
                    continue;
                };
                if !scope.includes(post.user_id) {
                    continue;
                }
                events.push(ActivityEvent {
                    kind: NotificationKind::LikeAdded,
                    event_id: like.id,
                    post_id: post.id,
                    post_title: post.title.clone(),
                    actor_id: *user_id,
                    actor_username: state.username(*user_id),
                    occurred_at: like.created_at,
                });
            }
        }

        Ok(events)
    }
}
