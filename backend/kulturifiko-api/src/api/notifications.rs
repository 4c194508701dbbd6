use axum::{
    extract::{Query, State},
    Extension, Json,
};
use kulturifiko_schema::{FeedKind, FeedResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::services::FeedService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub kind: FeedKind,
}

pub async fn get_feed(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>> {
    let feed_service = FeedService::new(state.posts.clone(), state.config.feed.clone());
    let feed = feed_service.build(&current_user.viewer(), query.kind).await?;

    Ok(Json(feed))
}
