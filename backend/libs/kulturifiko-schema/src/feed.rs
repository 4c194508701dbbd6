use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which notification feed to build
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Post-created events only
    Posts,
    /// Post, comment and like events merged
    #[default]
    Activity,
}

/// Event kinds in the activity feed.
///
/// Declaration order is the tie-break order for events sharing a timestamp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PostCreated,
    CommentAdded,
    LikeAdded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PostCreated => "post_created",
            NotificationKind::CommentAdded => "comment_added",
            NotificationKind::LikeAdded => "like_added",
        }
    }
}

/// One rendered feed entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationItem {
    pub kind: NotificationKind,
    pub event_id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub avatar_letter: String,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedResponse {
    pub kind: FeedKind,
    pub events: Vec<NotificationItem>,
    /// Set when the viewer's scope has no activity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub refresh_after_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tie_break_order() {
        assert!(NotificationKind::PostCreated < NotificationKind::CommentAdded);
        assert!(NotificationKind::CommentAdded < NotificationKind::LikeAdded);
    }

    #[test]
    fn test_feed_kind_wire_names() {
        assert_eq!(serde_json::to_string(&FeedKind::Posts).unwrap(), "\"posts\"");
        assert_eq!(FeedKind::default(), FeedKind::Activity);
    }
}
