/// Wire schema shared by the Kulturifiko API service and its client.
///
/// Every payload that crosses the `/posts_management` and `/notifications`
/// endpoints is defined here so both sides deserialize the same shapes.
use serde::{Deserialize, Serialize};

pub mod actions;
pub mod feed;
pub mod posts;
pub mod tags;

pub use actions::{
    ActionResponse, ActionStatus, CreatePostResponse, LikeStatus, NewPost, PostAction,
    ToggleLikeResponse,
};
pub use feed::{FeedKind, FeedResponse, NotificationItem, NotificationKind};
pub use posts::{CommentView, FetchPostsResponse, PostView};
pub use tags::{CultureElement, LearningStyle, UnknownTag};

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
