use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kulturifiko_schema::{
    CommentView, FeedKind, LikeStatus, NewPost, NotificationKind, PostView, UnknownTag,
};
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{ActivityEvent, Comment, Post, Scope, User, Viewer};

/// PostgreSQL-backed storage
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    file_path: Option<String>,
    culture_elements: Vec<String>,
    learning_styles: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PostViewRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    file_path: Option<String>,
    culture_elements: Vec<String>,
    learning_styles: Vec<String>,
    created_at: DateTime<Utc>,
    username: String,
    profile_picture: Option<String>,
    like_count: i64,
    user_liked: bool,
    comment_count: i64,
}

#[derive(Debug, FromRow)]
struct CommentViewRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    username: String,
    profile_picture: Option<String>,
    comment_text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    event_id: Uuid,
    post_id: Uuid,
    post_title: String,
    actor_id: Uuid,
    actor_username: String,
    occurred_at: DateTime<Utc>,
}

impl ActivityRow {
    fn into_event(self, kind: NotificationKind) -> ActivityEvent {
        ActivityEvent {
            kind,
            event_id: self.event_id,
            post_id: self.post_id,
            post_title: self.post_title,
            actor_id: self.actor_id,
            actor_username: self.actor_username,
            occurred_at: self.occurred_at,
        }
    }
}

/// Tags are stored as TEXT[]; values the enums no longer know are dropped
fn parse_tags<T>(raw: Vec<String>, post_id: Uuid) -> Vec<T>
where
    T: FromStr<Err = UnknownTag>,
{
    raw.into_iter()
        .filter_map(|tag| match tag.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(post_id = %post_id, "Skipping stored tag: {}", e);
                None
            }
        })
        .collect()
}

const POSTS_ACTIVITY_SQL: &str = r#"
    SELECT
        p.id AS event_id,
        p.id AS post_id,
        p.title AS post_title,
        p.user_id AS actor_id,
        u.username AS actor_username,
        p.created_at AS occurred_at
    FROM posts p
    JOIN users u ON u.id = p.user_id
    WHERE ($1::uuid IS NULL OR p.user_id = $1)
    ORDER BY p.created_at DESC, p.id
    LIMIT $2
"#;

const COMMENTS_ACTIVITY_SQL: &str = r#"
    SELECT
        c.id AS event_id,
        c.post_id,
        p.title AS post_title,
        c.user_id AS actor_id,
        u.username AS actor_username,
        c.created_at AS occurred_at
    FROM comments c
    JOIN posts p ON p.id = c.post_id
    JOIN users u ON u.id = c.user_id
    WHERE ($1::uuid IS NULL OR p.user_id = $1)
    ORDER BY c.created_at DESC, c.id
    LIMIT $2
"#;

const LIKES_ACTIVITY_SQL: &str = r#"
    SELECT
        l.id AS event_id,
        l.post_id,
        p.title AS post_title,
        l.user_id AS actor_id,
        u.username AS actor_username,
        l.created_at AS occurred_at
    FROM likes l
    JOIN posts p ON p.id = l.post_id
    JOIN users u ON u.id = l.user_id
    WHERE ($1::uuid IS NULL OR p.user_id = $1)
    ORDER BY l.created_at DESC, l.id
    LIMIT $2
"#;

impl PgStore {
    async fn activity_of_kind(
        &self,
        sql: &str,
        kind: NotificationKind,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<ActivityEvent>> {
        let rows: Vec<ActivityRow> = sqlx::query_as(sql)
            .bind(scope.owner())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.into_event(kind)).collect())
    }

    async fn comments_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<CommentView>>> {
        let mut grouped: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(grouped);
        }

        let rows: Vec<CommentViewRow> = sqlx::query_as(
            r#"
            SELECT
                c.id,
                c.post_id,
                c.user_id,
                u.username,
                u.profile_picture,
                c.comment_text,
                c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = ANY($1)
            ORDER BY c.created_at ASC, c.id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            grouped.entry(row.post_id).or_default().push(CommentView {
                id: row.id,
                user_id: row.user_id,
                username: row.username,
                profile_picture: row.profile_picture,
                comment_text: row.comment_text,
                created_at: row.created_at,
            });
        }

        Ok(grouped)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, is_admin, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, username, password_hash, is_admin, profile_picture, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username {} is already taken", username))
            }
            other => AppError::Database(other),
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin, profile_picture, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin, profile_picture, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn fetch_posts(&self, viewer: &Viewer) -> Result<Vec<PostView>> {
        let rows: Vec<PostViewRow> = sqlx::query_as(
            r#"
            SELECT
                p.id,
                p.user_id,
                p.title,
                p.description,
                p.file_path,
                p.culture_elements,
                p.learning_styles,
                p.created_at,
                u.username,
                u.profile_picture,
                (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                EXISTS(
                    SELECT 1 FROM likes l
                    WHERE l.post_id = p.id AND l.user_id = $1
                ) AS user_liked,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE ($2::uuid IS NULL OR p.user_id = $2)
            ORDER BY p.created_at DESC, p.id
            "#,
        )
        .bind(viewer.user_id)
        .bind(viewer.scope().owner())
        .fetch_all(&self.pool)
        .await?;

        let post_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut comments = self.comments_for(&post_ids).await?;

        debug!(
            "Fetched {} posts for viewer {} (admin={})",
            rows.len(),
            viewer.user_id,
            viewer.is_admin()
        );

        Ok(rows
            .into_iter()
            .map(|row| PostView {
                comments: comments.remove(&row.id).unwrap_or_default(),
                culture_elements: parse_tags(row.culture_elements, row.id),
                learning_styles: parse_tags(row.learning_styles, row.id),
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                description: row.description,
                file_path: row.file_path,
                username: row.username,
                profile_picture: row.profile_picture,
                like_count: row.like_count,
                user_liked: row.user_liked,
                comment_count: row.comment_count,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn create_post(&self, owner_id: Uuid, post: &NewPost) -> Result<Uuid> {
        let culture: Vec<String> = post
            .culture_elements
            .iter()
            .map(|tag| tag.as_str().to_string())
            .collect();
        let styles: Vec<String> = post
            .learning_styles
            .iter()
            .map(|style| style.as_str().to_string())
            .collect();

        let post_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (id, user_id, title, description, file_path, culture_elements, learning_styles, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.file_path)
        .bind(culture)
        .bind(styles)
        .fetch_one(&self.pool)
        .await?;

        Ok(post_id)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, description, file_path, culture_elements, learning_styles, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Post {
            culture_elements: parse_tags(row.culture_elements, row.id),
            learning_styles: parse_tags(row.learning_styles, row.id),
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            file_path: row.file_path,
            created_at: row.created_at,
        }))
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(LikeStatus, i64)> {
        let mut tx = self.pool.begin().await?;

        // Serializes toggles on this post without blocking comment and like
        // inserts, whose foreign keys take FOR KEY SHARE on the same row.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR NO KEY UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let removed = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let status = if removed {
            LikeStatus::Unliked
        } else {
            sqlx::query(
                r#"
                INSERT INTO likes (id, post_id, user_id, created_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (post_id, user_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            LikeStatus::Liked
        };

        let like_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((status, like_count))
    }

    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, user_id, comment_text, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, post_id, user_id, comment_text, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, comment_text, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let likes = sqlx::query("DELETE FROM likes WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;

        debug!(
            "Deleted post {} with {} comments and {} likes",
            post_id, comments, likes
        );

        Ok(deleted)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent_activity(
        &self,
        scope: Scope,
        kind: FeedKind,
        limit: usize,
    ) -> Result<Vec<ActivityEvent>> {
        let limit = limit as i64;
        let mut events = self
            .activity_of_kind(POSTS_ACTIVITY_SQL, NotificationKind::PostCreated, scope, limit)
            .await?;

        if kind == FeedKind::Activity {
            events.extend(
                self.activity_of_kind(
                    COMMENTS_ACTIVITY_SQL,
                    NotificationKind::CommentAdded,
                    scope,
                    limit,
                )
                .await?,
            );
            events.extend(
                self.activity_of_kind(LIKES_ACTIVITY_SQL, NotificationKind::LikeAdded, scope, limit)
                    .await?,
            );
        }

        Ok(events)
    }
}
