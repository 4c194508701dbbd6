// Feed service - merges post, comment and like events into the notification feed
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kulturifiko_schema::{FeedKind, FeedResponse, NotificationItem, NotificationKind};
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::Result;
use crate::models::{ActivityEvent, Viewer};
use crate::repository::PostRepository;
use crate::utils::{avatar_letter, time_ago};

pub const NO_ACTIVITY_MESSAGE: &str = "No recent activity";
pub const NO_POSTS_MESSAGE: &str = "No recent posts";

pub struct FeedService {
    repo: Arc<dyn PostRepository>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(repo: Arc<dyn PostRepository>, config: FeedConfig) -> Self {
        Self { repo, config }
    }

    pub fn page_size(&self, kind: FeedKind) -> usize {
        match kind {
            FeedKind::Posts => self.config.posts_page_size,
            FeedKind::Activity => self.config.activity_page_size,
        }
    }

    pub async fn build(&self, viewer: &Viewer, kind: FeedKind) -> Result<FeedResponse> {
        self.build_at(viewer, kind, Utc::now()).await
    }

    /// Build the feed with "time ago" labels relative to `now`
    pub async fn build_at(
        &self,
        viewer: &Viewer,
        kind: FeedKind,
        now: DateTime<Utc>,
    ) -> Result<FeedResponse> {
        let limit = self.page_size(kind);
        let candidates = self
            .repo
            .recent_activity(viewer.scope(), kind, limit)
            .await?;
        let events = merge_events(candidates, limit);

        debug!(
            "Built {:?} feed for viewer {} with {} events",
            kind,
            viewer.user_id,
            events.len()
        );

        let message = events.is_empty().then(|| {
            match kind {
                FeedKind::Posts => NO_POSTS_MESSAGE,
                FeedKind::Activity => NO_ACTIVITY_MESSAGE,
            }
            .to_string()
        });

        Ok(FeedResponse {
            kind,
            events: events.into_iter().map(|event| render(event, now)).collect(),
            message,
            refresh_after_secs: self.config.refresh_secs,
        })
    }
}

/// Newest first; equal timestamps order by kind, then event id.
pub fn merge_events(mut events: Vec<ActivityEvent>, limit: usize) -> Vec<ActivityEvent> {
    events.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then(a.kind.cmp(&b.kind))
            .then(a.event_id.cmp(&b.event_id))
    });
    events.truncate(limit);
    events
}

fn render(event: ActivityEvent, now: DateTime<Utc>) -> NotificationItem {
    let title = match event.kind {
        NotificationKind::PostCreated => format!("{} created a new post", event.actor_username),
        NotificationKind::CommentAdded => {
            format!("{} commented on {}", event.actor_username, event.post_title)
        }
        NotificationKind::LikeAdded => format!("{} liked {}", event.actor_username, event.post_title),
    };

    NotificationItem {
        kind: event.kind,
        event_id: event.event_id,
        post_id: event.post_id,
        avatar_letter: avatar_letter(&event.actor_username),
        time_ago: time_ago(now, event.occurred_at),
        occurred_at: event.occurred_at,
        post_title: event.post_title,
        actor_id: event.actor_id,
        actor_username: event.actor_username,
        title,
    }
}
