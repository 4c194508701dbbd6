//! Client interaction controller for the Kulturifiko post page
//!
//! Holds an immutable snapshot of the post list, projects it through the
//! active tag filters into post cards, and drives every mutation through a
//! [`PostApi`] transport followed by a sequenced re-fetch.

pub mod api;
pub mod controller;
pub mod error;
pub mod filter;
pub mod render;
pub mod retry;

pub use api::{ClientConfig, HttpPostApi, PostApi};
pub use controller::{ControllerState, PostController, RefreshOutcome, Snapshot};
pub use error::{ClientError, Result};
pub use filter::{filter_posts, FilterSet};
pub use render::{render_cards, CommentCard, PostCard};
pub use retry::{with_retry, RetryConfig, RetryError, Retryable};
