/// Chain resolver
///
/// Resolves a share's parent post for display. A missing or banned parent is
/// a filtering condition, not an error: the share is dropped from the result
/// set, because a share cannot outlive its source.
use uuid::Uuid;

use crate::error::Result;
use crate::models::ParentPost;
use crate::store::RelationStore;

/// Fetch the parent snapshot for a share. Returns `None` when the share must
/// be excluded: parent gone, parent banned, or parent author gone.
///
/// Exactly one hop. Parents are rendered as plain snapshots even if the
/// stored row claims a parent of its own; depth beyond one level is a
/// data-integrity violation upstream, not something this resolver follows.
pub async fn resolve_parent<S: RelationStore + ?Sized>(
    store: &S,
    parent_id: Uuid,
) -> Result<Option<ParentPost>> {
    let parent = match store.get_post(parent_id).await? {
        Some(parent) => parent,
        None => return Ok(None),
    };

    if parent.is_banned {
        return Ok(None);
    }

    let author = match store.get_user(parent.author_id).await? {
        Some(author) => author,
        None => {
            tracing::warn!(parent_id = %parent.id, "share parent has no author row");
            return Ok(None);
        }
    };

    let images = store.list_images(parent.id).await?;

    Ok(Some(ParentPost {
        id: parent.id,
        author,
        images,
        content: parent.content,
        created_at: parent.created_at,
    }))
}
