//! Social feed and likes.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use fitlog_common::{AppError, AppResult, IdGenerator};
use fitlog_db::{
    entities::post_like,
    repositories::{FeedPostRow, PostLikeRepository, PostRepository, UserProfileRepository},
};
use sea_orm::Set;
use serde::Deserialize;

/// Maximum posts returned by one feed request.
pub const FEED_LIMIT: u64 = 20;

/// How far back the trending feed looks.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Posts by the viewer and everyone they follow, newest first.
    #[default]
    Following,
    /// Recent posts ranked by like count.
    Trending,
}

/// A post as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub workout_log_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub author_name: Option<String>,
    pub like_count: u64,
    pub comment_count: u64,
    pub has_liked: bool,
}

impl From<FeedPostRow> for FeedPost {
    fn from(row: FeedPostRow) -> Self {
        let author_name = match (row.author_first_name, row.author_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        };

        Self {
            id: row.id,
            content: row.content,
            user_id: row.user_id,
            workout_log_id: row.workout_log_id,
            created_at: row.created_at,
            author_name,
            like_count: u64::try_from(row.like_count).unwrap_or_default(),
            comment_count: u64::try_from(row.comment_count).unwrap_or_default(),
            has_liked: row.has_liked,
        }
    }
}

/// Feed service.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    like_repo: PostLikeRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        like_repo: PostLikeRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            post_repo,
            like_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List up to [`FEED_LIMIT`] posts for the caller.
    pub async fn list_feed(&self, caller_id: &str, mode: FeedMode) -> AppResult<Vec<FeedPost>> {
        self.list_feed_at(caller_id, mode, Utc::now()).await
    }

    /// Same as [`Self::list_feed`] with an explicit request time.
    pub async fn list_feed_at(
        &self,
        caller_id: &str,
        mode: FeedMode,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<FeedPost>> {
        self.profile_repo.get_by_user_id(caller_id).await?;

        let rows = match mode {
            FeedMode::Following => {
                self.post_repo
                    .find_following_feed(caller_id, FEED_LIMIT)
                    .await?
            }
            FeedMode::Trending => {
                let since = now - Duration::days(TRENDING_WINDOW_DAYS);
                self.post_repo
                    .find_trending_feed(caller_id, since.into(), FEED_LIMIT)
                    .await?
            }
        };

        Ok(rows.into_iter().map(FeedPost::from).collect())
    }

    /// Like a post. A user can like a post at most once.
    pub async fn like_post(&self, caller_id: &str, post_id: &str) -> AppResult<post_like::Model> {
        self.profile_repo.get_by_user_id(caller_id).await?;
        self.post_repo.get_by_id(post_id).await?;

        if self.like_repo.has_liked(post_id, caller_id).await? {
            return Err(AppError::Conflict("Post already liked".to_string()));
        }

        // A concurrent like slipping past the check above still hits the
        // unique index and comes back as Conflict.
        let like = self
            .like_repo
            .create(post_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                user_id: Set(caller_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(user = caller_id, post = post_id, "Post liked");

        Ok(like)
    }

    /// Remove the caller's like from a post.
    pub async fn unlike_post(&self, caller_id: &str, post_id: &str) -> AppResult<()> {
        self.profile_repo.get_by_user_id(caller_id).await?;
        self.post_repo.get_by_id(post_id).await?;

        let deleted = self
            .like_repo
            .delete_by_post_and_user(post_id, caller_id)
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Like not found".to_string()));
        }

        tracing::info!(user = caller_id, post = post_id, "Post unliked");

        Ok(())
    }
}
