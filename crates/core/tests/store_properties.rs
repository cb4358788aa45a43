//! Messaging and feed behaviour against a real `PostgreSQL`.
//!
//! Each test creates and drops its own database.
//! Run with: `cargo test -p fitlog-core --test store_properties -- --ignored`

#![allow(clippy::unwrap_used)]

use std::{collections::HashSet, sync::Arc};

use chrono::{Duration, Utc};
use fitlog_common::AppError;
use fitlog_core::{
    ConversationService, FeedMode, FeedService, FollowService, PageRequest, PostService,
    ProfileService, SendMessageInput, UpsertProfileInput,
};
use fitlog_db::{
    entities::post,
    repositories::{
        CommentRepository, FollowRepository, MessageRepository, PostLikeRepository,
        PostRepository, UserProfileRepository,
    },
    test_utils::TestDatabase,
};
use sea_orm::{DatabaseConnection, Set};

struct Harness {
    db: TestDatabase,
    conn: Arc<DatabaseConnection>,
    conversations: ConversationService,
    feed: FeedService,
    posts: PostService,
    follows: FollowService,
    profiles: ProfileService,
}

impl Harness {
    async fn new() -> Self {
        let db = TestDatabase::create_unique().await.unwrap();
        let conn = db.shared();

        let profile_repo = UserProfileRepository::new(Arc::clone(&conn));
        let post_repo = PostRepository::new(Arc::clone(&conn));

        Self {
            conversations: ConversationService::new(
                MessageRepository::new(Arc::clone(&conn)),
                profile_repo.clone(),
            ),
            feed: FeedService::new(
                post_repo.clone(),
                PostLikeRepository::new(Arc::clone(&conn)),
                profile_repo.clone(),
            ),
            posts: PostService::new(
                post_repo,
                CommentRepository::new(Arc::clone(&conn)),
                profile_repo.clone(),
            ),
            follows: FollowService::new(FollowRepository::new(Arc::clone(&conn)), profile_repo.clone()),
            profiles: ProfileService::new(profile_repo),
            conn,
            db,
        }
    }

    async fn user(&self, user_id: &str) {
        self.profiles
            .upsert_profile(
                user_id,
                UpsertProfileInput {
                    first_name: user_id.to_string(),
                    last_name: "Test".to_string(),
                },
            )
            .await
            .unwrap();
    }

    async fn send(&self, from: &str, to: &str, content: &str) {
        self.conversations
            .send_message(
                from,
                to,
                SendMessageInput {
                    content: content.to_string(),
                },
            )
            .await
            .unwrap();
    }

    async fn post_aged(&self, id: &str, author: &str, age: Duration) {
        PostRepository::new(Arc::clone(&self.conn))
            .create(post::ActiveModel {
                id: Set(id.to_string()),
                content: Set(format!("post {id}")),
                user_id: Set(author.to_string()),
                workout_log_id: Set(None),
                created_at: Set((Utc::now() - age).into()),
            })
            .await
            .unwrap();
    }

    async fn finish(self) {
        self.into_db().drop_database().await.unwrap();
    }

    /// Drops every service so that the database holds the last handle.
    fn into_db(self) -> TestDatabase {
        self.db
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_opening_conversation_marks_read_once() {
    let h = Harness::new().await;
    h.user("alice").await;
    h.user("bob").await;

    for i in 0..3 {
        h.send("alice", "bob", &format!("set {i}")).await;
    }
    assert_eq!(h.conversations.get_unread_count("bob").await.unwrap(), 3);

    let page = h
        .conversations
        .get_conversation("bob", "alice", PageRequest::default())
        .await
        .unwrap();
    assert!(page.messages.iter().all(|m| m.read));
    assert_eq!(h.conversations.get_unread_count("bob").await.unwrap(), 0);

    // Nothing left to transition on a second pass
    let repo = MessageRepository::new(Arc::clone(&h.conn));
    assert_eq!(repo.mark_conversation_read("bob", "alice").await.unwrap(), 0);

    // The sender opening the conversation does not touch the receiver's side
    h.send("alice", "bob", "one more").await;
    h.conversations
        .get_conversation("alice", "bob", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(h.conversations.get_unread_count("bob").await.unwrap(), 1);

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_conversation_is_symmetric() {
    let h = Harness::new().await;
    h.user("alice").await;
    h.user("bob").await;

    h.send("alice", "bob", "hey").await;
    h.send("bob", "alice", "hi").await;
    h.send("alice", "bob", "gym?").await;

    let a = h
        .conversations
        .get_conversation("alice", "bob", PageRequest::default())
        .await
        .unwrap();
    let b = h
        .conversations
        .get_conversation("bob", "alice", PageRequest::default())
        .await
        .unwrap();

    let ids = |page: &fitlog_core::ConversationPage| -> Vec<String> {
        page.messages.iter().map(|m| m.id.clone()).collect()
    };
    assert_eq!(ids(&a), ids(&b));
    assert_eq!(a.pagination, b.pagination);

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_first_page_holds_latest_twenty_oldest_first() {
    let h = Harness::new().await;
    h.user("alice").await;
    h.user("bob").await;

    for i in 0..45 {
        let (from, to) = if i % 2 == 0 { ("alice", "bob") } else { ("bob", "alice") };
        h.send(from, to, &format!("{i:02}")).await;
    }

    let page = h
        .conversations
        .get_conversation("alice", "bob", PageRequest::from_raw(Some("1"), Some("20")))
        .await
        .unwrap();

    let contents: Vec<_> = page.messages.iter().map(|m| m.content.as_str()).collect();
    let expected: Vec<String> = (25..45).map(|i| format!("{i:02}")).collect();
    assert_eq!(contents, expected);
    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.total_items, 45);

    let last = h
        .conversations
        .get_conversation("alice", "bob", PageRequest::new(3, 20))
        .await
        .unwrap();
    assert_eq!(last.messages.len(), 5);
    assert_eq!(last.messages[0].content, "00");

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_conversation_list_one_row_per_peer() {
    let h = Harness::new().await;
    for user in ["alice", "bob", "carol"] {
        h.user(user).await;
    }

    h.send("bob", "alice", "b1").await;
    h.send("alice", "bob", "a1").await;
    h.send("bob", "alice", "b2").await;
    h.send("carol", "alice", "c1").await;
    h.send("alice", "carol", "a2").await;

    let list = h.conversations.list_conversations("alice").await.unwrap();

    let peers: HashSet<_> = list.iter().map(|s| s.peer_id.as_str()).collect();
    assert_eq!(list.len(), 2);
    assert_eq!(peers.len(), 2);

    // Most recent activity first
    assert_eq!(list[0].peer_id, "carol");
    assert_eq!(list[0].last_message_content, "a2");
    assert_eq!(list[0].unread_count, 1);
    assert_eq!(list[1].peer_id, "bob");
    assert_eq!(list[1].unread_count, 2);
    assert_eq!(list[1].peer_name.as_deref(), Some("bob Test"));

    // Listing does not reset unread counts
    let again = h.conversations.list_conversations("alice").await.unwrap();
    assert_eq!(again[1].unread_count, 2);

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_like_conflicts_without_double_count() {
    let h = Harness::new().await;
    h.user("alice").await;
    h.post_aged("p1", "alice", Duration::hours(1)).await;

    h.feed.like_post("alice", "p1").await.unwrap();
    let second = h.feed.like_post("alice", "p1").await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let feed = h.feed.list_feed("alice", FeedMode::Following).await.unwrap();
    assert_eq!(feed[0].like_count, 1);
    assert!(feed[0].has_liked);

    h.feed.unlike_post("alice", "p1").await.unwrap();
    assert!(matches!(
        h.feed.unlike_post("alice", "p1").await,
        Err(AppError::NotFound(_))
    ));

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_trending_window_and_ordering() {
    let h = Harness::new().await;
    let likers = ["u1", "u2", "u3", "u4"];
    h.user("author").await;
    for liker in likers {
        h.user(liker).await;
    }

    h.post_aged("old", "author", Duration::days(8)).await;
    h.post_aged("fresh", "author", Duration::hours(1)).await;
    h.post_aged("liked", "author", Duration::days(2)).await;

    for liker in likers {
        h.feed.like_post(liker, "old").await.unwrap();
    }
    h.feed.like_post("u1", "liked").await.unwrap();

    let trending = h.feed.list_feed("u2", FeedMode::Trending).await.unwrap();
    let ids: Vec<_> = trending.iter().map(|p| p.id.as_str()).collect();

    assert_eq!(ids, ["liked", "fresh"]);
    // u2 liked only the post that fell out of the window
    assert!(trending.iter().all(|p| !p.has_liked));

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_following_feed_includes_own_posts() {
    let h = Harness::new().await;
    h.user("solo").await;
    h.user("other").await;

    h.posts
        .create_post(
            "solo",
            fitlog_core::CreatePostInput {
                content: "First 10k".to_string(),
                workout_log_id: None,
            },
        )
        .await
        .unwrap();
    h.post_aged("stranger", "other", Duration::minutes(5)).await;

    let feed = h.feed.list_feed("solo", FeedMode::Following).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].user_id, "solo");

    h.follows.follow("solo", "other").await.unwrap();
    let feed = h.feed.list_feed("solo", FeedMode::Following).await.unwrap();
    assert_eq!(feed.len(), 2);

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_page_far_past_end_is_empty() {
    let h = Harness::new().await;
    h.user("alice").await;
    h.user("bob").await;
    h.send("alice", "bob", "tempo run").await;

    let page = h
        .conversations
        .get_conversation(
            "bob",
            "alice",
            PageRequest::from_raw(Some("18446744073709551615"), Some("20")),
        )
        .await
        .unwrap();
    assert!(page.messages.is_empty());
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.pagination.total_pages, 1);

    h.finish().await;
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_recommended_ranks_by_mutual_followers() {
    let h = Harness::new().await;
    for user in ["me", "friend", "pal", "popular", "quiet", "followed"] {
        h.user(user).await;
    }
    h.follows.follow("me", "followed").await.unwrap();
    h.follows.follow("friend", "popular").await.unwrap();
    h.follows.follow("pal", "popular").await.unwrap();
    h.follows.follow("me", "friend").await.unwrap();
    h.follows.follow("me", "pal").await.unwrap();

    let recommended = h.follows.list_recommended("me").await.unwrap();
    let ids: Vec<&str> = recommended.iter().map(|u| u.user_id.as_str()).collect();
    assert_eq!(ids, ["popular", "quiet"]);
    assert_eq!(recommended[0].mutual_followers, 2);
    assert_eq!(recommended[1].mutual_followers, 0);

    h.finish().await;
}
