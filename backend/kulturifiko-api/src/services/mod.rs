mod auth_service;
mod feed_service;
mod post_service;
mod revocation;

pub use auth_service::{hash_password, verify_password, AuthService};
pub use feed_service::{merge_events, FeedService, NO_ACTIVITY_MESSAGE, NO_POSTS_MESSAGE};
pub use post_service::{PostService, MAX_COMMENT_CHARS, MAX_TITLE_CHARS};
pub use revocation::{MemoryRevocations, RedisRevocations, SessionRevocations};
