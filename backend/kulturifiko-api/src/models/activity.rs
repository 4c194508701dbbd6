use chrono::{DateTime, Utc};
use kulturifiko_schema::NotificationKind;
use uuid::Uuid;

/// A post, comment or like seen as a feed event, before rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub kind: NotificationKind,
    /// Id of the post, comment or like row that produced the event
    pub event_id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub occurred_at: DateTime<Utc>,
}
