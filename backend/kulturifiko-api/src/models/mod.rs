mod activity;
mod policy;
mod post;
mod user;

pub use activity::ActivityEvent;
pub use policy::CommentDeletePolicy;
pub use post::{Comment, Post};
pub use user::{Role, Scope, User, Viewer};
