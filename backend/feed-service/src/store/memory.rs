use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Like, Post, UserSummary, Visibility};
use crate::store::RelationStore;

/// In-memory relation store.
///
/// Backs the test suite; same contract as the Postgres store, including
/// ordering and ban filtering. Rows keep insertion order so `created_at`
/// ties resolve the same way on every run.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserSummary>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    follows: HashSet<(Uuid, Uuid)>,
    images: HashMap<Uuid, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserSummary) {
        self.inner.write().unwrap().users.insert(user.id, user);
    }

    pub fn add_post(&self, post: Post) {
        self.inner.write().unwrap().posts.push(post);
    }

    pub fn add_comment(&self, comment: Comment) {
        self.inner.write().unwrap().comments.push(comment);
    }

    pub fn add_follow(&self, follower_id: Uuid, followee_id: Uuid) {
        self.inner
            .write()
            .unwrap()
            .follows
            .insert((follower_id, followee_id));
    }

    pub fn add_images(&self, post_id: Uuid, urls: Vec<String>) {
        self.inner.write().unwrap().images.insert(post_id, urls);
    }

    /// Flip the ban flag on an existing post, e.g. to model moderation
    /// happening after a share was created.
    pub fn set_post_banned(&self, post_id: Uuid, banned: bool) {
        let mut inner = self.inner.write().unwrap();
        if let Some(post) = inner.posts.iter_mut().find(|p| p.id == post_id) {
            post.is_banned = banned;
        }
    }

    pub fn set_comment_banned(&self, comment_id: Uuid, banned: bool) {
        let mut inner = self.inner.write().unwrap();
        if let Some(comment) = inner.comments.iter_mut().find(|c| c.id == comment_id) {
            comment.is_banned = banned;
        }
    }

    pub fn remove_post(&self, post_id: Uuid) {
        self.inner.write().unwrap().posts.retain(|p| p.id != post_id);
    }
}

fn sorted_desc(mut posts: Vec<Post>) -> Vec<Post> {
    // Stable sort: insertion order breaks created_at ties.
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserSummary>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn list_user_posts(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let inner = self.inner.read().unwrap();
        let posts = inner
            .posts
            .iter()
            .filter(|p| p.author_id == author_id && !p.is_banned)
            .cloned()
            .collect();
        Ok(sorted_desc(posts))
    }

    async fn list_feed_candidates(&self, following: &HashSet<Uuid>) -> Result<Vec<Post>> {
        let inner = self.inner.read().unwrap();
        let posts = inner
            .posts
            .iter()
            .filter(|p| {
                !p.is_banned
                    && (p.visibility == Visibility::Public
                        || (p.visibility == Visibility::FollowersOnly
                            && following.contains(&p.author_id)))
            })
            .cloned()
            .collect();
        Ok(sorted_desc(posts))
    }

    async fn following_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followee)| *followee)
            .collect())
    }

    async fn list_images(&self, post_id: Uuid) -> Result<Vec<String>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.images.get(&post_id).cloned().unwrap_or_default())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.likes.iter().filter(|l| l.post_id == post_id).count() as i64)
    }

    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id))
    }

    async fn share_count(&self, post_id: Uuid) -> Result<i64> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .posts
            .iter()
            .filter(|p| p.parent_id() == Some(post_id) && !p.is_banned)
            .count() as i64)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let inner = self.inner.read().unwrap();
        let mut comments: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && !c.is_banned)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn list_top_level_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<(Comment, i64)>> {
        let inner = self.inner.read().unwrap();
        let mut top_level: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.parent_comment_id.is_none() && !c.is_banned)
            .cloned()
            .collect();
        top_level.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let with_counts = top_level
            .into_iter()
            .map(|comment| {
                let children = inner
                    .comments
                    .iter()
                    .filter(|c| c.parent_comment_id == Some(comment.id) && !c.is_banned)
                    .count() as i64;
                (comment, children)
            })
            .collect();
        Ok(page(with_counts, limit, offset))
    }

    async fn list_child_comments(
        &self,
        parent_comment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>> {
        let inner = self.inner.read().unwrap();
        let mut children: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.parent_comment_id == Some(parent_comment_id) && !c.is_banned)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page(children, limit, offset))
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>> {
        // Single write lock makes the check-then-insert atomic.
        let mut inner = self.inner.write().unwrap();
        if inner
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id)
        {
            return Ok(None);
        }
        let like = Like {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            created_at: Utc::now(),
        };
        inner.likes.push(like.clone());
        Ok(Some(like))
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.likes.len();
        inner
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(inner.likes.len() < before)
    }
}
