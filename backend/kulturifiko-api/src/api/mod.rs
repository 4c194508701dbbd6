mod auth;
mod notifications;
mod posts;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware::require_session;
use crate::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/posts_management", post(posts::handle_action))
        .route("/notifications", get(notifications::get_feed))
        .route("/auth/logout", post(auth::logout))
        .route_layer(from_fn_with_state(state, require_session));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
}
