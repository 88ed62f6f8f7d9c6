/// Relation store accessor
///
/// Typed read access to the Post, Like, Comment, Follow, User and Image
/// relations owned by the platform's CRUD services, plus the single mutation
/// this engine performs: the like upsert/delete. Everything else is a pure read.
use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Like, Post, UserSummary};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgRelationStore;

#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Fetch a single post. Banned posts are returned (callers filter);
    /// rows with an unparseable visibility value are not.
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Author summary with sensitive fields never selected.
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserSummary>>;

    /// Non-banned posts by one author, newest first. Per-viewer visibility
    /// filtering happens in the resolver, not here.
    async fn list_user_posts(&self, author_id: Uuid) -> Result<Vec<Post>>;

    /// Candidate set for the global feed: non-banned posts that are public,
    /// or followers-only and authored by someone in `following`. The viewer
    /// is already encoded in the following set. This is a query-level
    /// prefilter; the resolver still evaluates each post.
    async fn list_feed_candidates(&self, following: &HashSet<Uuid>) -> Result<Vec<Post>>;

    /// Accounts the given user follows.
    async fn following_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Image URLs attached to a post, in insertion order.
    async fn list_images(&self, post_id: Uuid) -> Result<Vec<String>>;

    async fn like_count(&self, post_id: Uuid) -> Result<i64>;

    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Number of non-banned posts sharing this post.
    async fn share_count(&self, post_id: Uuid) -> Result<i64>;

    /// All non-banned comments for a post, oldest first, flat.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Non-banned top-level comments, newest first, each paired with its
    /// non-banned reply count.
    async fn list_top_level_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<(Comment, i64)>>;

    /// Non-banned replies to one comment, oldest first.
    async fn list_child_comments(
        &self,
        parent_comment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>>;

    /// Idempotent like insert keyed by the unique `(post_id, user_id)` pair.
    /// Returns `None` when the pair already existed.
    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>>;

    /// Idempotent like delete; returns true if a row was removed.
    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;
}
