use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use kulturifiko_schema::{ActionResponse, ActionStatus, CreatePostResponse, NewPost, PostAction};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::Viewer;
use crate::services::PostService;
use crate::AppState;

/// Single entry point for every post interaction, dispatched on `action`
pub async fn handle_action(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    WithRejection(Json(action), _): WithRejection<Json<PostAction>, AppError>,
) -> Result<Response> {
    let viewer = current_user.viewer();
    let service = PostService::new(state.posts.clone(), state.config.policy.comment_delete);

    tracing::debug!(
        action = action.name(),
        user_id = %viewer.user_id,
        "Handling post action"
    );

    match action {
        PostAction::FetchPosts => fetch_posts(&service, &viewer).await,
        PostAction::ToggleLike { post_id } => toggle_like(&service, &viewer, post_id).await,
        PostAction::AddComment {
            post_id,
            comment_text,
        } => Ok(add_comment(&service, &viewer, post_id, &comment_text).await),
        PostAction::DeletePost { post_id } => Ok(delete_post(&service, &viewer, post_id).await),
        PostAction::DeleteComment { comment_id } => {
            Ok(delete_comment(&service, &viewer, comment_id).await)
        }
        PostAction::CreatePost(new_post) => Ok(create_post(&service, &viewer, new_post).await),
    }
}

async fn fetch_posts(service: &PostService, viewer: &Viewer) -> Result<Response> {
    Ok(Json(service.fetch_posts(viewer).await?).into_response())
}

async fn toggle_like(service: &PostService, viewer: &Viewer, post_id: Uuid) -> Result<Response> {
    Ok(Json(service.toggle_like(viewer, post_id).await?).into_response())
}

async fn add_comment(
    service: &PostService,
    viewer: &Viewer,
    post_id: Uuid,
    comment_text: &str,
) -> Response {
    outcome(service.add_comment(viewer, post_id, comment_text).await.map(|_| ()))
}

async fn delete_post(service: &PostService, viewer: &Viewer, post_id: Uuid) -> Response {
    outcome(service.delete_post(viewer, post_id).await)
}

async fn delete_comment(service: &PostService, viewer: &Viewer, comment_id: Uuid) -> Response {
    outcome(service.delete_comment(viewer, comment_id).await)
}

async fn create_post(
    service: &PostService,
    viewer: &Viewer,
    new_post: NewPost,
) -> Response {
    match service.create_post(viewer, new_post).await {
        Ok(post_id) => Json(CreatePostResponse {
            status: ActionStatus::Success,
            post_id: Some(post_id),
            message: None,
        })
        .into_response(),
        Err(e) if e.is_user_facing() => Json(CreatePostResponse {
            status: ActionStatus::Error,
            post_id: None,
            message: Some(e.to_string()),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mutations answer `{status, message?}`; only infrastructure failures
/// leave the envelope
fn outcome(result: Result<()>) -> Response {
    match result {
        Ok(()) => Json(ActionResponse::success()).into_response(),
        Err(e) if e.is_user_facing() => Json(ActionResponse::error(e.to_string())).into_response(),
        Err(e) => e.into_response(),
    }
}
