mod common;

use common::{at, post, service, share, user};
use feed_service::error::AppError;
use feed_service::models::Visibility;
use uuid::Uuid;

#[tokio::test]
async fn banned_posts_never_appear_in_any_feed() {
    let (store, svc) = service();
    let author = user(&store, "ana");
    let banned = post(&store, author, Visibility::Public, 0);
    let visible = post(&store, author, Visibility::Public, 1);
    store.set_post_banned(banned, true);

    // News feed, for a stranger and for the author.
    for viewer in [user(&store, "stranger"), author] {
        let feed = svc.get_news_feed(viewer, 1, 50).await.unwrap();
        assert!(feed.items.iter().all(|p| p.id != banned));
        assert!(feed.items.iter().any(|p| p.id == visible));
    }

    // Profile feed, including the author's own.
    let profile = svc.get_user_feed(author, author, 1, 50).await.unwrap();
    assert!(profile.items.iter().all(|p| p.id != banned));

    // Single post view.
    assert!(matches!(
        svc.get_single_post(banned, author).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn share_disappears_when_parent_is_banned_after_the_fact() {
    let (store, svc) = service();
    let author = user(&store, "bea");
    let sharer = user(&store, "dan");
    let parent = post(&store, author, Visibility::Public, 0);
    let shared = share(&store, sharer, parent, Visibility::Public, 1);

    // Before the ban the share shows up with its parent snapshot.
    let feed = svc.get_news_feed(sharer, 1, 50).await.unwrap();
    let item = feed.items.iter().find(|p| p.id == shared).unwrap();
    assert!(item.is_share);
    assert_eq!(item.parent.as_ref().unwrap().id, parent);

    store.set_post_banned(parent, true);

    // Gone from the news feed and from the sharer's own profile feed.
    let feed = svc.get_news_feed(sharer, 1, 50).await.unwrap();
    assert!(feed.items.iter().all(|p| p.id != shared));
    let profile = svc.get_user_feed(sharer, sharer, 1, 50).await.unwrap();
    assert!(profile.items.iter().all(|p| p.id != shared));
    assert!(matches!(
        svc.get_single_post(shared, sharer).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn share_of_deleted_parent_is_dropped() {
    let (store, svc) = service();
    let author = user(&store, "bea");
    let sharer = user(&store, "dan");
    let parent = post(&store, author, Visibility::Public, 0);
    let shared = share(&store, sharer, parent, Visibility::Public, 1);

    store.remove_post(parent);

    let feed = svc.get_news_feed(sharer, 1, 50).await.unwrap();
    assert!(feed.items.iter().all(|p| p.id != shared));
}

#[tokio::test]
async fn private_posts_are_visible_only_to_their_author() {
    let (store, svc) = service();
    let author = user(&store, "cara");
    let follower = user(&store, "fan");
    store.add_follow(follower, author);
    let secret = post(&store, author, Visibility::Private, 0);

    let own = svc.get_single_post(secret, author).await.unwrap();
    assert_eq!(own.id, secret);
    assert_eq!(own.visibility, Visibility::Private);

    // Even a follower gets the same answer as for a nonexistent post.
    assert!(matches!(
        svc.get_single_post(secret, follower).await,
        Err(AppError::NotFound(_))
    ));

    let profile = svc.get_user_feed(author, follower, 1, 50).await.unwrap();
    assert!(profile.items.iter().all(|p| p.id != secret));
}

#[tokio::test]
async fn followers_only_visibility_follows_the_graph() {
    let (store, svc) = service();
    let b = user(&store, "b");
    let a = user(&store, "a");
    let c = user(&store, "c");
    store.add_follow(a, b);

    let restricted = post(&store, b, Visibility::FollowersOnly, 0);

    let feed_a = svc.get_news_feed(a, 1, 50).await.unwrap();
    assert!(feed_a.items.iter().any(|p| p.id == restricted));

    let feed_c = svc.get_news_feed(c, 1, 50).await.unwrap();
    assert!(feed_c.items.iter().all(|p| p.id != restricted));

    // Profile feed obeys the same edge.
    let profile_a = svc.get_user_feed(b, a, 1, 50).await.unwrap();
    assert!(profile_a.items.iter().any(|p| p.id == restricted));
    let profile_c = svc.get_user_feed(b, c, 1, 50).await.unwrap();
    assert!(profile_c.items.iter().all(|p| p.id != restricted));

    // Authors see their own restricted posts.
    let own = svc.get_news_feed(b, 1, 50).await.unwrap();
    assert!(own.items.iter().any(|p| p.id == restricted));
}

#[tokio::test]
async fn feed_is_ordered_newest_first() {
    let (store, svc) = service();
    let author = user(&store, "runner");
    let viewer = user(&store, "viewer");
    let oldest = post(&store, author, Visibility::Public, 0);
    let middle = post(&store, author, Visibility::Public, 5);
    let newest = post(&store, author, Visibility::Public, 10);

    let feed = svc.get_news_feed(viewer, 1, 50).await.unwrap();
    let ids: Vec<Uuid> = feed.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![newest, middle, oldest]);
    assert!(feed.items[0].created_at >= feed.items[1].created_at);
    assert_eq!(feed.items[0].created_at, at(10));
}

#[tokio::test]
async fn pagination_is_deterministic_without_gaps_or_duplicates() {
    let (store, svc) = service();
    let author = user(&store, "poster");
    let viewer = user(&store, "reader");
    for minutes in 0..12 {
        post(&store, author, Visibility::Public, minutes);
    }

    let limit = 4;
    let mut concatenated: Vec<Uuid> = Vec::new();
    for page in 1..=3 {
        let chunk = svc.get_news_feed(viewer, page, limit).await.unwrap();
        assert_eq!(chunk.page, page);
        assert_eq!(chunk.limit, limit);
        concatenated.extend(chunk.items.iter().map(|p| p.id));
    }

    let all = svc.get_news_feed(viewer, 1, 12).await.unwrap();
    let all_ids: Vec<Uuid> = all.items.iter().map(|p| p.id).collect();
    assert_eq!(concatenated, all_ids);

    let mut deduped = concatenated.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), 12);
}

#[tokio::test]
async fn default_page_size_applies_when_limit_is_zero() {
    let (store, svc) = service();
    let author = user(&store, "poster");
    let viewer = user(&store, "reader");
    for minutes in 0..8 {
        post(&store, author, Visibility::Public, minutes);
    }

    let feed = svc.get_news_feed(viewer, 0, 0).await.unwrap();
    assert_eq!(feed.page, 1);
    assert_eq!(feed.limit, 5);
    assert_eq!(feed.items.len(), 5);
}

#[tokio::test]
async fn pagination_counts_only_chain_valid_posts() {
    let (store, svc) = service();
    let author = user(&store, "bea");
    let sharer = user(&store, "dan");
    let viewer = user(&store, "reader");

    let parent = post(&store, author, Visibility::Public, 0);
    share(&store, sharer, parent, Visibility::Public, 1);
    let p2 = post(&store, author, Visibility::Public, 2);
    let p3 = post(&store, author, Visibility::Public, 3);
    store.set_post_banned(parent, true);

    // The banned parent and its orphaned share are both gone before paging,
    // so the first page holds exactly the two surviving posts.
    let feed = svc.get_news_feed(viewer, 1, 2).await.unwrap();
    let ids: Vec<Uuid> = feed.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![p3, p2]);

    let second = svc.get_news_feed(viewer, 2, 2).await.unwrap();
    assert!(second.items.is_empty());
}

#[tokio::test]
async fn post_with_missing_author_is_hidden_without_dropping_the_page() {
    let (store, svc) = service();
    let author = user(&store, "ana");
    let viewer = user(&store, "reader");
    let kept_old = post(&store, author, Visibility::Public, 0);
    // Author row deleted out from under the post; no user is ever seeded.
    let orphaned = post(&store, Uuid::new_v4(), Visibility::Public, 1);
    let kept_new = post(&store, author, Visibility::Public, 2);

    let feed = svc.get_news_feed(viewer, 1, 50).await.unwrap();
    let ids: Vec<Uuid> = feed.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![kept_new, kept_old]);
    assert!(ids.iter().all(|id| *id != orphaned));

    // The single-post view degrades the same way.
    assert!(matches!(
        svc.get_single_post(orphaned, viewer).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_targets_surface_as_not_found() {
    let (store, svc) = service();
    let viewer = user(&store, "viewer");

    assert!(matches!(
        svc.get_single_post(Uuid::new_v4(), viewer).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        svc.get_user_feed(Uuid::new_v4(), viewer, 1, 5).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn single_post_view_attaches_author_images_and_parent() {
    let (store, svc) = service();
    let author = user(&store, "bea");
    let sharer = user(&store, "dan");
    let parent = post(&store, author, Visibility::Public, 0);
    store.add_images(parent, vec!["before.jpg".into(), "after.jpg".into()]);
    let shared = share(&store, sharer, parent, Visibility::Public, 1);
    store.add_images(shared, vec!["mine.jpg".into()]);

    let item = svc.get_single_post(shared, sharer).await.unwrap();
    assert_eq!(item.author.id, sharer);
    assert_eq!(item.images, vec!["mine.jpg"]);
    assert!(item.is_share);

    let snapshot = item.parent.unwrap();
    assert_eq!(snapshot.id, parent);
    assert_eq!(snapshot.author.id, author);
    assert_eq!(snapshot.images, vec!["before.jpg", "after.jpg"]);
}
