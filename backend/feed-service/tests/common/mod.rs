#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use feed_service::config::FeedConfig;
use feed_service::models::{Comment, Post, PostKind, UserSummary, Visibility};
use feed_service::services::FeedService;
use feed_service::store::MemoryStore;

/// Fixed base instant so ordering assertions are reproducible.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn service() -> (Arc<MemoryStore>, FeedService<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = FeedService::new(store.clone(), FeedConfig::default());
    (store, service)
}

pub fn user(store: &MemoryStore, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    store.add_user(UserSummary {
        id,
        name: name.to_string(),
        avatar: Some(format!("https://cdn.pulsefit.dev/avatars/{}.jpg", name)),
    });
    id
}

pub fn post(store: &MemoryStore, author_id: Uuid, visibility: Visibility, minutes: i64) -> Uuid {
    let id = Uuid::new_v4();
    store.add_post(Post {
        id,
        author_id,
        content: format!("post at t+{}", minutes),
        visibility,
        kind: PostKind::Original,
        is_banned: false,
        created_at: at(minutes),
    });
    id
}

pub fn share(
    store: &MemoryStore,
    author_id: Uuid,
    parent_id: Uuid,
    visibility: Visibility,
    minutes: i64,
) -> Uuid {
    let id = Uuid::new_v4();
    store.add_post(Post {
        id,
        author_id,
        content: format!("share at t+{}", minutes),
        visibility,
        kind: PostKind::Share { parent_id },
        is_banned: false,
        created_at: at(minutes),
    });
    id
}

pub fn comment(
    store: &MemoryStore,
    post_id: Uuid,
    author_id: Uuid,
    parent_comment_id: Option<Uuid>,
    minutes: i64,
) -> Uuid {
    let id = Uuid::new_v4();
    store.add_comment(Comment {
        id,
        post_id,
        author_id,
        content: format!("comment at t+{}", minutes),
        parent_comment_id,
        is_banned: false,
        created_at: at(minutes),
    });
    id
}
