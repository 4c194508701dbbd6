// Post service - authorization and validation in front of the post repository
use std::sync::Arc;

use kulturifiko_schema::{FetchPostsResponse, NewPost, ToggleLikeResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, CommentDeletePolicy, Viewer};
use crate::repository::PostRepository;

pub const MAX_COMMENT_CHARS: usize = 2000;
pub const MAX_TITLE_CHARS: usize = 200;

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    comment_policy: CommentDeletePolicy,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, comment_policy: CommentDeletePolicy) -> Self {
        Self {
            repo,
            comment_policy,
        }
    }

    pub async fn fetch_posts(&self, viewer: &Viewer) -> Result<FetchPostsResponse> {
        let posts = self.repo.fetch_posts(viewer).await?;

        Ok(FetchPostsResponse {
            current_user_id: viewer.user_id,
            is_admin: viewer.is_admin(),
            posts,
        })
    }

    pub async fn toggle_like(&self, viewer: &Viewer, post_id: Uuid) -> Result<ToggleLikeResponse> {
        let (status, like_count) = self.repo.toggle_like(post_id, viewer.user_id).await?;

        Ok(ToggleLikeResponse { status, like_count })
    }

    pub async fn add_comment(&self, viewer: &Viewer, post_id: Uuid, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::BadRequest(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        self.repo.add_comment(post_id, viewer.user_id, text).await
    }

    pub async fn create_post(&self, viewer: &Viewer, post: NewPost) -> Result<Uuid> {
        let post = NewPost {
            title: post.title.trim().to_string(),
            description: post.description.trim().to_string(),
            file_path: post
                .file_path
                .map(|path| path.trim().to_string())
                .filter(|path| !path.is_empty()),
            culture_elements: dedup_sorted(post.culture_elements),
            learning_styles: dedup_sorted(post.learning_styles),
        };

        if post.title.is_empty() {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }
        if post.title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::BadRequest(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_CHARS
            )));
        }
        if post.description.is_empty() {
            return Err(AppError::BadRequest("Description cannot be empty".to_string()));
        }

        let post_id = self.repo.create_post(viewer.user_id, &post).await?;
        info!("User {} created post {}", viewer.user_id, post_id);

        Ok(post_id)
    }

    pub async fn delete_post(&self, viewer: &Viewer, post_id: Uuid) -> Result<()> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if !viewer.can_delete_post(post.user_id) {
            warn!(
                "User {} attempted to delete post {} owned by {}",
                viewer.user_id, post_id, post.user_id
            );
            return Err(AppError::Forbidden(
                "You are not allowed to delete this post".to_string(),
            ));
        }

        if !self.repo.delete_post(post_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        info!("User {} deleted post {}", viewer.user_id, post_id);
        Ok(())
    }

    pub async fn delete_comment(&self, viewer: &Viewer, comment_id: Uuid) -> Result<()> {
        let comment = self
            .repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if !self.comment_policy.permits(viewer, comment.user_id) {
            warn!(
                "User {} attempted to delete comment {} by {} (policy {:?})",
                viewer.user_id, comment_id, comment.user_id, self.comment_policy
            );
            return Err(AppError::Forbidden(
                "You are not allowed to delete this comment".to_string(),
            ));
        }

        if !self.repo.delete_comment(comment_id).await? {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        Ok(())
    }
}

fn dedup_sorted<T: Ord>(mut tags: Vec<T>) -> Vec<T> {
    tags.sort();
    tags.dedup();
    tags
}
