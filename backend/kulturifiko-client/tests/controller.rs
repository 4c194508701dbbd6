use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use kulturifiko_client::{
    ClientError, ControllerState, PostApi, PostController, RefreshOutcome, Result, RetryConfig,
};
use kulturifiko_schema::{
    CommentView, CultureElement, FetchPostsResponse, LikeStatus, NewPost, PostView,
    ToggleLikeResponse,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

/// In-process stand-in for the server
struct FakeApi {
    user_id: Uuid,
    posts: Mutex<Vec<PostView>>,
    fetch_gates: Mutex<VecDeque<oneshot::Receiver<FetchPostsResponse>>>,
    like_gate: Mutex<Option<oneshot::Receiver<()>>>,
    fetch_failures: AtomicU32,
    fetch_calls: AtomicU32,
    mutation_calls: AtomicU32,
}

impl FakeApi {
    fn new(user_id: Uuid) -> Arc<Self> {
        Arc::new(Self {
            user_id,
            posts: Mutex::new(Vec::new()),
            fetch_gates: Mutex::new(VecDeque::new()),
            like_gate: Mutex::new(None),
            fetch_failures: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
            mutation_calls: AtomicU32::new(0),
        })
    }

    fn seed(&self, owner: Uuid, title: &str, tags: Vec<CultureElement>) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.lock().push(PostView {
            id,
            user_id: owner,
            title: title.to_string(),
            description: "desc".to_string(),
            file_path: None,
            username: if owner == self.user_id { "mara" } else { "bo" }.to_string(),
            profile_picture: None,
            like_count: 0,
            user_liked: false,
            comment_count: 0,
            comments: vec![],
            culture_elements: tags,
            learning_styles: vec![],
            created_at: Utc::now(),
        });
        id
    }

    fn response(&self) -> FetchPostsResponse {
        FetchPostsResponse {
            current_user_id: self.user_id,
            is_admin: false,
            posts: self.posts.lock().clone(),
        }
    }

    fn fetches(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn pending_gates(&self) -> usize {
        self.fetch_gates.lock().len()
    }
}

#[async_trait]
impl PostApi for FakeApi {
    async fn fetch_posts(&self) -> Result<FetchPostsResponse> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let failures = self.fetch_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.fetch_failures.store(failures - 1, Ordering::SeqCst);
            return Err(ClientError::Transport("connection reset".to_string()));
        }

        let gate = self.fetch_gates.lock().pop_front();
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| ClientError::Transport("gate dropped".to_string())),
            None => Ok(self.response()),
        }
    }

    async fn toggle_like(&self, post_id: Uuid) -> Result<ToggleLikeResponse> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.like_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut posts = self.posts.lock();
        let post = posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or_else(|| ClientError::Status {
                status: 404,
                code: "NOT_FOUND".to_string(),
                message: "Post not found".to_string(),
            })?;
        post.user_liked = !post.user_liked;
        post.like_count += if post.user_liked { 1 } else { -1 };

        Ok(ToggleLikeResponse {
            status: if post.user_liked {
                LikeStatus::Liked
            } else {
                LikeStatus::Unliked
            },
            like_count: post.like_count,
        })
    }

    async fn add_comment(&self, post_id: Uuid, comment_text: &str) -> Result<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);

        let mut posts = self.posts.lock();
        let post = posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or_else(|| ClientError::Rejected("Post not found".to_string()))?;
        post.comments.push(CommentView {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            username: "mara".to_string(),
            profile_picture: None,
            comment_text: comment_text.to_string(),
            created_at: Utc::now(),
        });
        post.comment_count += 1;
        Ok(())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);

        let mut posts = self.posts.lock();
        match posts.iter().position(|post| post.id == post_id) {
            Some(index) if posts[index].user_id == self.user_id => {
                posts.remove(index);
                Ok(())
            }
            Some(_) => Err(ClientError::Rejected(
                "You are not allowed to delete this post".to_string(),
            )),
            None => Err(ClientError::Rejected("Post not found".to_string())),
        }
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);

        let mut posts = self.posts.lock();
        for post in posts.iter_mut() {
            if let Some(index) = post.comments.iter().position(|c| c.id == comment_id) {
                if post.comments[index].user_id != self.user_id {
                    return Err(ClientError::Rejected(
                        "You are not allowed to delete this comment".to_string(),
                    ));
                }
                post.comments.remove(index);
                post.comment_count -= 1;
                return Ok(());
            }
        }
        Err(ClientError::Rejected("Comment not found".to_string()))
    }

    async fn create_post(&self, post: NewPost) -> Result<Uuid> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.seed(self.user_id, &post.title, post.culture_elements))
    }
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(5),
        jitter: false,
        ..Default::default()
    }
}

fn controller(api: &Arc<FakeApi>) -> Arc<PostController> {
    Arc::new(PostController::new(api.clone(), fast_retry()))
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never held");
}

#[tokio::test]
async fn test_refresh_loads_snapshot() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    api.seed(me, "Lantern festival", vec![CultureElement::History]);
    let controller = controller(&api);

    let outcome = controller.refresh().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Applied(1));
    assert_eq!(controller.state(), ControllerState::Idle);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.current_user_id, Some(me));
    assert_eq!(snapshot.posts.len(), 1);

    let cards = controller.cards();
    assert_eq!(cards[0].like_label, "👍 0 Likes");
    assert!(cards[0].can_delete);
}

#[tokio::test]
async fn test_filter_changes_do_not_fetch() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    api.seed(me, "Lantern festival", vec![CultureElement::History]);
    api.seed(me, "Mountain passes", vec![CultureElement::Geography]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();

    controller.toggle_culture_element(CultureElement::Geography);
    let cards = controller.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Mountain passes");

    controller.clear_filters();
    assert_eq!(controller.cards().len(), 2);
    assert_eq!(api.fetches(), 1);
}

#[tokio::test]
async fn test_like_is_optimistic_then_reconciled() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let post_id = api.seed(me, "Lantern festival", vec![]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();

    let (release, gate) = oneshot::channel();
    *api.like_gate.lock() = Some(gate);

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.toggle_like(post_id).await })
    };

    wait_until(|| controller.snapshot().post(post_id).unwrap().user_liked).await;
    assert_eq!(controller.snapshot().post(post_id).unwrap().like_count, 1);
    assert_eq!(api.fetches(), 1);

    release.send(()).unwrap();
    let response = task.await.unwrap().unwrap();

    assert_eq!(response.status, LikeStatus::Liked);
    assert_eq!(api.fetches(), 2);
    let post = controller.snapshot().post(post_id).cloned().unwrap();
    assert!(post.user_liked);
    assert_eq!(post.like_count, 1);
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn test_empty_comment_never_reaches_server() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let post_id = api.seed(me, "Lantern festival", vec![]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();

    let result = controller.add_comment(post_id, "  \n ").await;

    assert_eq!(result, Err(ClientError::EmptyComment));
    assert_eq!(api.mutation_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.fetches(), 1);
}

#[tokio::test]
async fn test_comment_then_refetch() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let post_id = api.seed(me, "Lantern festival", vec![]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();

    controller.add_comment(post_id, "  Beautiful  ").await.unwrap();

    let cards = controller.cards();
    assert_eq!(cards[0].comment_label, "💬 1 Comments");
    assert_eq!(cards[0].comments[0].text, "Beautiful");
    assert!(cards[0].comments[0].can_delete);

    let comment_id = cards[0].comments[0].comment_id;
    controller.delete_comment(comment_id).await.unwrap();
    assert!(controller.cards()[0].comments.is_empty());
    assert_eq!(api.fetches(), 3);
}

#[tokio::test]
async fn test_rejected_delete_surfaces_message() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let theirs = api.seed(Uuid::new_v4(), "River songs", vec![]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();
    assert!(!controller.cards()[0].can_delete);

    let result = controller.delete_post(theirs).await;

    assert_eq!(
        result,
        Err(ClientError::Rejected(
            "You are not allowed to delete this post".to_string()
        ))
    );
    assert_eq!(controller.snapshot().posts.len(), 1);
    assert_eq!(api.fetches(), 2);
}

#[tokio::test]
async fn test_create_post_appears_after_refetch() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let controller = controller(&api);

    let post_id = controller
        .create_post(NewPost {
            title: "Harvest dances".to_string(),
            description: "Circle dances".to_string(),
            file_path: None,
            culture_elements: vec![CultureElement::Culture],
            learning_styles: vec![],
        })
        .await
        .unwrap();

    assert!(controller.snapshot().post(post_id).is_some());
}

#[tokio::test]
async fn test_transient_fetch_failures_are_retried() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    api.seed(me, "Lantern festival", vec![]);
    api.fetch_failures.store(2, Ordering::SeqCst);
    let controller = controller(&api);

    controller.refresh().await.unwrap();

    assert_eq!(api.fetches(), 3);
    assert_eq!(controller.snapshot().posts.len(), 1);
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn test_exhausted_retries_keep_stale_snapshot() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    api.seed(me, "Lantern festival", vec![]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();

    api.seed(me, "Never seen", vec![]);
    api.fetch_failures.store(10, Ordering::SeqCst);
    let result = controller.refresh().await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
    assert!(matches!(controller.state(), ControllerState::Failed(ref msg) if msg.contains("connection reset")));
    assert_eq!(controller.snapshot().posts.len(), 1);
    // Initial fetch plus one attempt and two retries
    assert_eq!(api.fetches(), 4);
}

#[tokio::test]
async fn test_out_of_order_responses_keep_latest() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let controller = controller(&api);

    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    api.fetch_gates.lock().extend([first_rx, second_rx]);

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh().await })
    };
    wait_until(|| api.pending_gates() == 1).await;
    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh().await })
    };
    wait_until(|| api.pending_gates() == 0).await;

    api.seed(me, "Newer", vec![]);
    let newer = api.response();
    let older = FetchPostsResponse {
        current_user_id: me,
        is_admin: false,
        posts: vec![],
    };

    second_tx.send(newer).unwrap();
    assert_eq!(second.await.unwrap().unwrap(), RefreshOutcome::Applied(2));

    first_tx.send(older).unwrap();
    assert_eq!(first.await.unwrap().unwrap(), RefreshOutcome::Stale(1));

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.sequence, 2);
    assert_eq!(snapshot.posts.len(), 1);
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn test_fetch_in_flight_before_like_is_discarded() {
    let me = Uuid::new_v4();
    let api = FakeApi::new(me);
    let post_id = api.seed(me, "Lantern festival", vec![]);
    let controller = controller(&api);
    controller.refresh().await.unwrap();
    let before_like = api.response();

    let (slow_tx, slow_rx) = oneshot::channel();
    api.fetch_gates.lock().push_back(slow_rx);
    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh().await })
    };
    wait_until(|| api.pending_gates() == 0).await;

    controller.toggle_like(post_id).await.unwrap();
    assert!(controller.snapshot().post(post_id).unwrap().user_liked);

    slow_tx.send(before_like).unwrap();
    assert!(matches!(
        slow.await.unwrap().unwrap(),
        RefreshOutcome::Stale(_)
    ));

    let post = controller.snapshot().post(post_id).cloned().unwrap();
    assert!(post.user_liked);
    assert_eq!(post.like_count, 1);
}
