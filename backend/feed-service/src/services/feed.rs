/// Feed composer & paginator
///
/// One stateless pipeline per request: candidate selection by scope,
/// visibility filtering, ordered concurrent enrichment, then pagination.
/// Pagination counts only posts that survived both the visibility and the
/// share-chain filters.
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::error::{AppError, Result};
use crate::models::{
    CommentView, EnrichedPost, FeedPage, LikeOutcome, Post, PostKind, TopLevelComment,
};
use crate::services::chain;
use crate::services::engagement;
use crate::services::visibility::{is_visible, FeedScope, ViewerContext};
use crate::store::RelationStore;

pub struct FeedService<S> {
    store: Arc<S>,
    config: FeedConfig,
}

fn post_not_found() -> AppError {
    // Banned, invisible and nonexistent posts all surface identically.
    AppError::NotFound("post not found".to_string())
}

impl<S: RelationStore> FeedService<S> {
    pub fn new(store: Arc<S>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    /// Apply paging defaults: limit 5 when unset, page 1 when unset,
    /// limit clamped to the configured maximum.
    fn normalize_page(&self, page: u32, limit: u32) -> (u32, u32, i64) {
        let page = page.max(1);
        let limit = if limit == 0 {
            self.config.default_page_size
        } else {
            limit.min(self.config.max_page_size)
        };
        let offset = (page as i64 - 1) * limit as i64;
        (page, limit, offset)
    }

    /// Raw candidate rows for one scope, before per-viewer evaluation.
    async fn candidates(&self, scope: FeedScope, ctx: &ViewerContext) -> Result<Vec<Post>> {
        match scope {
            FeedScope::SinglePost(post_id) => {
                Ok(self.store.get_post(post_id).await?.into_iter().collect())
            }
            FeedScope::Home => self.store.list_feed_candidates(&ctx.following).await,
            FeedScope::Profile(author_id) => self.store.list_user_posts(author_id).await,
        }
    }

    /// Assemble one feed item: author summary, images, parent snapshot for
    /// shares, and engagement data. `Ok(None)` means the candidate is hidden
    /// (broken share chain or missing author), never an error.
    async fn enrich(&self, post: Post, ctx: &ViewerContext) -> Result<Option<EnrichedPost>> {
        let author = match self.store.get_user(post.author_id).await? {
            Some(author) => author,
            None => {
                tracing::warn!(post_id = %post.id, "post author missing, hiding post");
                return Ok(None);
            }
        };

        let parent = match post.kind {
            PostKind::Original => None,
            PostKind::Share { parent_id } => {
                match chain::resolve_parent(self.store.as_ref(), parent_id).await? {
                    Some(parent) => Some(parent),
                    // Ban propagation: the share goes down with its source.
                    None => return Ok(None),
                }
            }
        };

        let (images, engagement) = tokio::try_join!(
            self.store.list_images(post.id),
            engagement::aggregate(self.store.as_ref(), post.id, ctx.viewer_id),
        )?;

        let is_share = post.is_share();
        Ok(Some(EnrichedPost {
            id: post.id,
            content: post.content,
            author,
            images,
            created_at: post.created_at,
            visibility: post.visibility,
            is_share,
            parent,
            like_count: engagement.like_count,
            comment_count: engagement.comment_count,
            share_count: engagement.share_count,
            viewer_has_liked: engagement.viewer_has_liked,
            comments: engagement.comments,
        }))
    }

    /// Enrichment wrapper used on feed pages: bounded by the per-candidate
    /// deadline, and degrading that single candidate to hidden on any
    /// failure instead of aborting the page.
    async fn enrich_degraded(&self, post: Post, ctx: &ViewerContext) -> Option<EnrichedPost> {
        let post_id = post.id;
        let deadline = Duration::from_millis(self.config.enrich_timeout_ms);
        match tokio::time::timeout(deadline, self.enrich(post, ctx)).await {
            Ok(Ok(item)) => item,
            Ok(Err(err)) => {
                tracing::warn!(%post_id, "enrichment failed, hiding post: {}", err);
                None
            }
            Err(_) => {
                tracing::warn!(%post_id, "enrichment timed out, hiding post");
                None
            }
        }
    }

    /// Visibility filter, deterministic ordering, ordered fan-out
    /// enrichment, then pagination over the surviving set.
    async fn compose(
        &self,
        candidates: Vec<Post>,
        ctx: &ViewerContext,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage<EnrichedPost>> {
        let (page, limit, offset) = self.normalize_page(page, limit);

        let mut visible: Vec<Post> = candidates
            .into_iter()
            .filter(|post| is_visible(post, ctx))
            .collect();
        // Ordering is computed over the candidate set before paging; the
        // stable sort keeps store order for created_at ties.
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let enriched: Vec<EnrichedPost> = stream::iter(visible)
            .map(|post| self.enrich_degraded(post, ctx))
            .buffered(self.config.enrich_concurrency.max(1))
            .filter_map(|item| async move { item })
            .collect()
            .await;

        let items: Vec<EnrichedPost> = enriched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(FeedPage { items, page, limit })
    }

    /// Single post view. Nonexistent, banned and invisible posts are
    /// indistinguishable to the caller.
    pub async fn get_single_post(&self, post_id: Uuid, viewer_id: Uuid) -> Result<EnrichedPost> {
        let ctx = ViewerContext::load(self.store.as_ref(), viewer_id).await?;
        let candidates = self.candidates(FeedScope::SinglePost(post_id), &ctx).await?;

        let post = candidates
            .into_iter()
            .find(|post| is_visible(post, &ctx))
            .ok_or_else(post_not_found)?;

        self.enrich(post, &ctx).await?.ok_or_else(post_not_found)
    }

    /// Global new-feed for a viewer.
    pub async fn get_news_feed(
        &self,
        viewer_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage<EnrichedPost>> {
        let ctx = ViewerContext::load(self.store.as_ref(), viewer_id).await?;
        let candidates = self.candidates(FeedScope::Home, &ctx).await?;
        self.compose(candidates, &ctx, page, limit).await
    }

    /// Profile feed: posts authored by `target_user_id`, as seen by the viewer.
    pub async fn get_user_feed(
        &self,
        target_user_id: Uuid,
        viewer_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage<EnrichedPost>> {
        if self.store.get_user(target_user_id).await?.is_none() {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        let ctx = ViewerContext::load(self.store.as_ref(), viewer_id).await?;
        let candidates = self.candidates(FeedScope::Profile(target_user_id), &ctx).await?;
        self.compose(candidates, &ctx, page, limit).await
    }

    /// Idempotent like toggle. The store-level unique pair constraint makes
    /// concurrent toggles for the same pair settle on one net transition.
    pub async fn toggle_like(
        &self,
        post_id: Uuid,
        viewer_id: Uuid,
        like: bool,
    ) -> Result<LikeOutcome> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .filter(|post| !post.is_banned)
            .ok_or_else(post_not_found)?;

        if like {
            match self.store.insert_like(post.id, viewer_id).await? {
                Some(like) => Ok(LikeOutcome::Liked { like }),
                None => Ok(LikeOutcome::Unchanged),
            }
        } else if self.store.delete_like(post.id, viewer_id).await? {
            Ok(LikeOutcome::Removed)
        } else {
            Ok(LikeOutcome::Unchanged)
        }
    }

    /// Paged top-level comments for a post, newest first, with reply counts.
    pub async fn get_comments(
        &self,
        post_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage<TopLevelComment>> {
        let exists = self
            .store
            .get_post(post_id)
            .await?
            .map(|post| !post.is_banned)
            .unwrap_or(false);
        if !exists {
            return Err(post_not_found());
        }

        let (page, limit, offset) = self.normalize_page(page, limit);
        let items =
            engagement::top_level_comments(self.store.as_ref(), post_id, limit as i64, offset)
                .await?;

        Ok(FeedPage { items, page, limit })
    }

    /// Paged replies to one comment, fetched on demand by the client.
    pub async fn get_child_comments(
        &self,
        parent_comment_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage<CommentView>> {
        let (page, limit, offset) = self.normalize_page(page, limit);
        let items = engagement::child_comments(
            self.store.as_ref(),
            parent_comment_id,
            limit as i64,
            offset,
        )
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();

        Ok(FeedPage { items, page, limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_clamping() {
        let service = FeedService::new(
            Arc::new(crate::store::MemoryStore::new()),
            FeedConfig::default(),
        );

        assert_eq!(service.normalize_page(0, 0), (1, 5, 0));
        assert_eq!(service.normalize_page(3, 10), (3, 10, 20));
        assert_eq!(service.normalize_page(1, 500), (1, 50, 0));
    }
}
