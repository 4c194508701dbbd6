//! Projection of (snapshot, filters) into post-card view models

use kulturifiko_schema::{CommentView, PostView};
use uuid::Uuid;

use crate::controller::Snapshot;
use crate::filter::{filter_posts, FilterSet};

#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub post_id: Uuid,
    pub title: String,
    pub description: String,
    pub file_path: Option<String>,
    pub author: String,
    pub profile_picture: Option<String>,
    pub liked: bool,
    pub like_label: String,
    pub comment_label: String,
    pub culture_labels: Vec<&'static str>,
    pub learning_labels: Vec<&'static str>,
    pub can_delete: bool,
    pub comments: Vec<CommentCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentCard {
    pub comment_id: Uuid,
    pub author: String,
    pub profile_picture: Option<String>,
    pub text: String,
    pub can_delete: bool,
}

pub fn like_label(count: i64) -> String {
    format!("👍 {} Likes", count)
}

pub fn comment_label(count: i64) -> String {
    format!("💬 {} Comments", count)
}

pub fn render_cards(snapshot: &Snapshot, filters: &FilterSet) -> Vec<PostCard> {
    filter_posts(&snapshot.posts, filters)
        .into_iter()
        .map(|post| post_card(post, snapshot.current_user_id))
        .collect()
}

fn post_card(post: &PostView, viewer: Option<Uuid>) -> PostCard {
    PostCard {
        post_id: post.id,
        title: post.title.clone(),
        description: post.description.clone(),
        file_path: post.file_path.clone(),
        author: post.username.clone(),
        profile_picture: post.profile_picture.clone(),
        liked: post.user_liked,
        like_label: like_label(post.like_count),
        comment_label: comment_label(post.comment_count),
        culture_labels: post.culture_elements.iter().map(|tag| tag.label()).collect(),
        learning_labels: post.learning_styles.iter().map(|style| style.label()).collect(),
        can_delete: viewer == Some(post.user_id),
        comments: post
            .comments
            .iter()
            .map(|comment| comment_card(comment, viewer))
            .collect(),
    }
}

fn comment_card(comment: &CommentView, viewer: Option<Uuid>) -> CommentCard {
    CommentCard {
        comment_id: comment.id,
        author: comment.username.clone(),
        profile_picture: comment.profile_picture.clone(),
        text: comment.comment_text.clone(),
        can_delete: viewer == Some(comment.user_id),
    }
}
