mod auth;

pub use auth::{require_session, session_token, Claims, CurrentUser, SESSION_COOKIE};
