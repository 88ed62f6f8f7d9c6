use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Like, Post, PostKind, UserSummary, Visibility};
use crate::store::RelationStore;

/// Postgres-backed relation store.
#[derive(Clone)]
pub struct PgRelationStore {
    pool: PgPool,
}

/// Raw post row; `visibility` is text and `parent_id` nullable in storage.
/// Conversion to the domain type is where both get tightened.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    content: String,
    visibility: String,
    parent_id: Option<Uuid>,
    is_banned: bool,
    created_at: DateTime<Utc>,
}

impl PostRow {
    /// Convert to the domain post. Rows with an unrecognized visibility
    /// value are dropped entirely (fail closed).
    fn into_post(self) -> Option<Post> {
        let visibility = match Visibility::parse(&self.visibility) {
            Some(v) => v,
            None => {
                tracing::warn!(
                    post_id = %self.id,
                    value = %self.visibility,
                    "dropping post with unrecognized visibility"
                );
                return None;
            }
        };
        let kind = match self.parent_id {
            Some(parent_id) => PostKind::Share { parent_id },
            None => PostKind::Original,
        };
        Some(Post {
            id: self.id,
            author_id: self.author_id,
            content: self.content,
            visibility,
            kind,
            is_banned: self.is_banned,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    content: String,
    parent_comment_id: Option<Uuid>,
    is_banned: bool,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            content: row.content,
            parent_comment_id: row.parent_comment_id,
            is_banned: row.is_banned,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TopLevelCommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    content: String,
    parent_comment_id: Option<Uuid>,
    is_banned: bool,
    created_at: DateTime<Utc>,
    child_comment_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl PgRelationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationStore for PgRelationStore {
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, visibility, parent_id, is_banned, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(PostRow::into_post))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserSummary>> {
        let user = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            r#"
            SELECT id, name, avatar
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(|(id, name, avatar)| UserSummary { id, name, avatar }))
    }

    async fn list_user_posts(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, visibility, parent_id, is_banned, created_at
            FROM posts
            WHERE author_id = $1 AND is_banned = FALSE
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(PostRow::into_post).collect())
    }

    async fn list_feed_candidates(&self, following: &HashSet<Uuid>) -> Result<Vec<Post>> {
        let following: Vec<Uuid> = following.iter().copied().collect();

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, visibility, parent_id, is_banned, created_at
            FROM posts
            WHERE is_banned = FALSE
              AND (visibility = 'public'
                   OR (visibility = 'followers-only' AND author_id = ANY($1)))
            ORDER BY created_at DESC
            "#,
        )
        .bind(&following)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(PostRow::into_post).collect())
    }

    async fn following_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let followees: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT followee_id
            FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(followees.into_iter().collect())
    }

    async fn list_images(&self, post_id: Uuid) -> Result<Vec<String>> {
        let urls: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT url
            FROM post_images
            WHERE post_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(urls)
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE post_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn share_count(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE parent_id = $1 AND is_banned = FALSE
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, content, parent_comment_id, is_banned, created_at
            FROM comments
            WHERE post_id = $1 AND is_banned = FALSE
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn list_top_level_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<(Comment, i64)>> {
        let rows = sqlx::query_as::<_, TopLevelCommentRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, c.content, c.parent_comment_id,
                   c.is_banned, c.created_at,
                   (SELECT COUNT(*) FROM comments r
                    WHERE r.parent_comment_id = c.id AND r.is_banned = FALSE
                   ) AS child_comment_count
            FROM comments c
            WHERE c.post_id = $1 AND c.parent_comment_id IS NULL AND c.is_banned = FALSE
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let child_comment_count = row.child_comment_count;
                (
                    Comment {
                        id: row.id,
                        post_id: row.post_id,
                        author_id: row.author_id,
                        content: row.content,
                        parent_comment_id: row.parent_comment_id,
                        is_banned: row.is_banned,
                        created_at: row.created_at,
                    },
                    child_comment_count,
                )
            })
            .collect())
    }

    async fn list_child_comments(
        &self,
        parent_comment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, content, parent_comment_id, is_banned, created_at
            FROM comments
            WHERE parent_comment_id = $1 AND is_banned = FALSE
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(parent_comment_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>> {
        let inserted = sqlx::query_as::<_, LikeRow>(
            r#"
            INSERT INTO likes (id, post_id, user_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING id, post_id, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.map(|row| Like {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            created_at: row.created_at,
        }))
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }
}
