//! Snapshot store and interaction flow for the post page
//!
//! Every fetch is stamped with a sequence number taken from a single
//! monotonic counter. A response replaces the snapshot only when its number
//! is newer than the snapshot's, so concurrent fetches may finish in any
//! order and the latest issued one wins. Optimistic like updates draw from
//! the same counter, which retires any fetch that was already in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use kulturifiko_schema::{
    CultureElement, FetchPostsResponse, LearningStyle, NewPost, PostView, ToggleLikeResponse,
};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::PostApi;
use crate::error::{ClientError, Result};
use crate::filter::FilterSet;
use crate::render::{render_cards, PostCard};
use crate::retry::{with_retry, RetryConfig};

/// Immutable copy of the post list as of one fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub sequence: u64,
    pub current_user_id: Option<Uuid>,
    pub is_admin: bool,
    pub posts: Vec<PostView>,
}

impl Snapshot {
    fn from_response(sequence: u64, response: FetchPostsResponse) -> Self {
        Self {
            sequence,
            current_user_id: Some(response.current_user_id),
            is_admin: response.is_admin,
            posts: response.posts,
        }
    }

    fn with_like_flipped(&self, post_id: Uuid, sequence: u64) -> Option<Self> {
        let index = self.posts.iter().position(|post| post.id == post_id)?;

        let mut next = self.clone();
        next.sequence = sequence;
        let post = &mut next.posts[index];
        post.user_liked = !post.user_liked;
        post.like_count = if post.user_liked {
            post.like_count + 1
        } else {
            (post.like_count - 1).max(0)
        };

        Some(next)
    }

    pub fn post(&self, post_id: Uuid) -> Option<&PostView> {
        self.posts.iter().find(|post| post.id == post_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Fetching,
    /// Last fetch gave up; the previous snapshot is still shown
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(u64),
    Stale(u64),
}

pub struct PostController {
    api: Arc<dyn PostApi>,
    retry: RetryConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    filters: RwLock<FilterSet>,
    state: RwLock<ControllerState>,
    sequence: AtomicU64,
}

impl PostController {
    pub fn new(api: Arc<dyn PostApi>, retry: RetryConfig) -> Self {
        Self {
            api,
            retry,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            filters: RwLock::new(FilterSet::default()),
            state: RwLock::new(ControllerState::Idle),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    pub fn state(&self) -> ControllerState {
        self.state.read().clone()
    }

    pub fn filters(&self) -> FilterSet {
        self.filters.read().clone()
    }

    /// Cards for the current snapshot under the active filters
    pub fn cards(&self) -> Vec<PostCard> {
        let snapshot = self.snapshot();
        let filters = self.filters.read();
        render_cards(&snapshot, &filters)
    }

    pub fn toggle_culture_element(&self, tag: CultureElement) {
        self.filters.write().toggle_culture_element(tag);
    }

    pub fn toggle_learning_style(&self, style: LearningStyle) {
        self.filters.write().toggle_learning_style(style);
    }

    pub fn clear_filters(&self) {
        *self.filters.write() = FilterSet::default();
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, sequence: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == sequence
    }

    /// Fetch the post list, retrying transport failures with backoff
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let sequence = self.next_sequence();
        *self.state.write() = ControllerState::Fetching;

        let api = self.api.as_ref();
        match with_retry(&self.retry, move || api.fetch_posts()).await {
            Ok(response) => Ok(self.apply(sequence, response)),
            Err(e) => {
                let err = e.into_inner();
                warn!("Fetch {} failed: {}", sequence, err);
                if self.is_latest(sequence) {
                    *self.state.write() = ControllerState::Failed(err.to_string());
                }
                Err(err)
            }
        }
    }

    fn apply(&self, sequence: u64, response: FetchPostsResponse) -> RefreshOutcome {
        {
            let mut current = self.snapshot.write();
            if sequence <= current.sequence {
                debug!(
                    "Discarding stale fetch {} (snapshot at {})",
                    sequence, current.sequence
                );
                return RefreshOutcome::Stale(sequence);
            }
            *current = Arc::new(Snapshot::from_response(sequence, response));
        }

        if self.is_latest(sequence) {
            *self.state.write() = ControllerState::Idle;
        }
        RefreshOutcome::Applied(sequence)
    }

    pub async fn toggle_like(&self, post_id: Uuid) -> Result<ToggleLikeResponse> {
        self.apply_optimistic_like(post_id);
        let result = self.api.toggle_like(post_id).await;
        self.settle(result).await
    }

    fn apply_optimistic_like(&self, post_id: Uuid) {
        let sequence = self.next_sequence();
        let mut current = self.snapshot.write();
        if let Some(next) = current.with_like_flipped(post_id, sequence) {
            *current = Arc::new(next);
        }
    }

    pub async fn add_comment(&self, post_id: Uuid, comment_text: &str) -> Result<()> {
        let text = comment_text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyComment);
        }

        let result = self.api.add_comment(post_id, text).await;
        self.settle(result).await
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let result = self.api.delete_post(post_id).await;
        self.settle(result).await
    }

    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        let result = self.api.delete_comment(comment_id).await;
        self.settle(result).await
    }

    pub async fn create_post(&self, post: NewPost) -> Result<Uuid> {
        let result = self.api.create_post(post).await;
        if let Ok(post_id) = &result {
            info!("Created post {}", post_id);
        }
        self.settle(result).await
    }

    /// Re-fetch after a mutation; a failed re-fetch shows up in `state()`
    async fn settle<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = self.refresh().await {
            warn!("Re-fetch after mutation failed: {}", e);
        }
        result
    }
}
