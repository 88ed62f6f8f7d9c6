use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Privacy policy attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "followers-only")]
    FollowersOnly,
    #[serde(rename = "private")]
    Private,
}

impl Visibility {
    /// Parse the stored text value. Returns `None` for anything unrecognized
    /// so malformed rows are shown to nobody rather than to everybody.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "followers-only" => Some(Visibility::FollowersOnly),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::FollowersOnly => "followers-only",
            Visibility::Private => "private",
        }
    }
}

/// Whether a post is an original or a share of another post.
///
/// Shares carry exactly one parent reference; deeper nesting is
/// unrepresentable here, which is the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostKind {
    Original,
    Share { parent_id: Uuid },
}

/// Post entity as read from the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub visibility: Visibility,
    pub kind: PostKind,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_share(&self) -> bool {
        matches!(self.kind, PostKind::Share { .. })
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        match self.kind {
            PostKind::Original => None,
            PostKind::Share { parent_id } => Some(parent_id),
        }
    }
}

/// Author fields safe to return to clients. Nothing else is ever selected
/// from the users relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

/// Like entity - represents a user liking a post.
/// `(post_id, user_id)` is unique; existence of the row is the like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment entity - `parent_comment_id = None` marks a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment shape returned in payloads: essential fields only, replies are
/// represented by the `parent_comment_id` pointer so clients rebuild the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        CommentView {
            id: comment.id,
            content: comment.content,
            author_id: comment.author_id,
            parent_comment_id: comment.parent_comment_id,
            created_at: comment.created_at,
        }
    }
}

/// Top-level comment with the size of its reply set, for the paged
/// comment listing. Replies themselves are fetched through a separate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopLevelComment {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub child_comment_count: i64,
}

/// Read-only snapshot of a shared post's parent, attached for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentPost {
    pub id: Uuid,
    pub author: UserSummary,
    pub images: Vec<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fully assembled feed item: post, author summary, images, parent snapshot
/// when the post is a share, engagement counts and the viewer's like state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub id: Uuid,
    pub content: String,
    pub author: UserSummary,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
    pub is_share: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentPost>,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub viewer_has_liked: bool,
    pub comments: Vec<CommentView>,
}

/// One page of results with the echoed paging parameters. No total count:
/// clients infer "more pages exist" from a non-empty result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LikeOutcome {
    Liked { like: Like },
    Removed,
    Unchanged,
}
