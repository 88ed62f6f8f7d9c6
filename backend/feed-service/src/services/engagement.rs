/// Engagement aggregator
///
/// Computes like/comment/share counts, the viewer's own like flag, and the
/// filtered comment set for a post. Banned comments are excluded from both
/// payloads and counts.
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, CommentView, TopLevelComment};
use crate::store::RelationStore;

/// Engagement data attached to one feed item.
#[derive(Debug, Clone)]
pub struct Engagement {
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub viewer_has_liked: bool,
    pub comments: Vec<CommentView>,
}

/// Aggregate engagement for one post. The four relation lookups are
/// independent reads and run concurrently.
pub async fn aggregate<S: RelationStore + ?Sized>(
    store: &S,
    post_id: Uuid,
    viewer_id: Uuid,
) -> Result<Engagement> {
    let (like_count, viewer_has_liked, share_count, comments) = tokio::try_join!(
        store.like_count(post_id),
        store.has_liked(post_id, viewer_id),
        store.share_count(post_id),
        store.list_comments(post_id),
    )?;

    let comments: Vec<CommentView> = comments.into_iter().map(CommentView::from).collect();

    Ok(Engagement {
        like_count,
        comment_count: comments.len() as i64,
        share_count,
        viewer_has_liked,
        comments,
    })
}

/// One page of top-level comments, newest first, each carrying its reply
/// count. Replies are paged separately through `child_comments`.
pub async fn top_level_comments<S: RelationStore + ?Sized>(
    store: &S,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<TopLevelComment>> {
    let rows = store.list_top_level_comments(post_id, limit, offset).await?;

    Ok(rows
        .into_iter()
        .map(|(comment, child_comment_count)| TopLevelComment {
            id: comment.id,
            content: comment.content,
            author_id: comment.author_id,
            created_at: comment.created_at,
            child_comment_count,
        })
        .collect())
}

/// One page of replies to a single comment, in conversation order.
pub async fn child_comments<S: RelationStore + ?Sized>(
    store: &S,
    parent_comment_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Comment>> {
    store
        .list_child_comments(parent_comment_id, limit, offset)
        .await
}
