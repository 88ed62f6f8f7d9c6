/// Visibility resolver
///
/// Decides, per post and per viewer, whether a post is eligible for a feed.
/// Ban and privacy filtering are never errors; they only shrink result sets.
use std::collections::HashSet;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Post, Visibility};
use crate::store::RelationStore;

/// Which candidate set a request draws from. All three call sites run the
/// same visibility/chain/engagement pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// One post, looked up directly.
    SinglePost(Uuid),
    /// The viewer's global new-feed.
    Home,
    /// All posts authored by one user.
    Profile(Uuid),
}

/// Per-request viewer state, built once and passed down. The following set
/// includes the viewer's own id so authors pass the followers-only check on
/// their own posts.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub viewer_id: Uuid,
    pub following: HashSet<Uuid>,
}

impl ViewerContext {
    pub async fn load<S: RelationStore + ?Sized>(store: &S, viewer_id: Uuid) -> Result<Self> {
        let mut following = store.following_of(viewer_id).await?;
        following.insert(viewer_id);
        Ok(ViewerContext {
            viewer_id,
            following,
        })
    }

    #[cfg(test)]
    pub fn with_following(viewer_id: Uuid, followees: &[Uuid]) -> Self {
        let mut following: HashSet<Uuid> = followees.iter().copied().collect();
        following.insert(viewer_id);
        ViewerContext {
            viewer_id,
            following,
        }
    }
}

/// Visibility rules, first match wins:
/// banned posts are invisible to everyone including the author; public posts
/// are visible to anyone; followers-only posts require the viewer to follow
/// the author (or be the author); private posts are author-only.
pub fn is_visible(post: &Post, ctx: &ViewerContext) -> bool {
    if post.is_banned {
        return false;
    }
    match post.visibility {
        Visibility::Public => true,
        Visibility::FollowersOnly => ctx.following.contains(&post.author_id),
        Visibility::Private => ctx.viewer_id == post.author_id,
    }
}
