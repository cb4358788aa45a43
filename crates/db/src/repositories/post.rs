//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use fitlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, Statement,
    prelude::DateTimeWithTimeZone,
};

/// A post as shown in a feed, with author and live interaction counts.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct FeedPostRow {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub workout_log_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub has_liked: bool,
}

// $1 is always the viewer. Counts are aggregated from the like and comment
// tables at read time.
const FEED_COLUMNS: &str = r"
    SELECT p.id, p.content, p.user_id, p.workout_log_id, p.created_at,
           author.first_name AS author_first_name,
           author.last_name AS author_last_name,
           (SELECT COUNT(*) FROM post_like pl WHERE pl.post_id = p.id) AS like_count,
           (SELECT COUNT(*) FROM comment c WHERE c.post_id = p.id) AS comment_count,
           EXISTS (
               SELECT 1 FROM post_like own
               WHERE own.post_id = p.id AND own.user_id = $1
           ) AS has_liked
    FROM post p
    LEFT JOIN user_profile author ON author.user_id = p.user_id
";

/// Repository for post operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning `PostNotFound` if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Newest posts authored by the viewer or by anyone the viewer follows.
    pub async fn find_following_feed(
        &self,
        viewer_id: &str,
        limit: u64,
    ) -> AppResult<Vec<FeedPostRow>> {
        let sql = format!(
            "{FEED_COLUMNS}
             WHERE p.user_id = $1
                OR p.user_id IN (SELECT f.following_id FROM follow f WHERE f.follower_id = $1)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $2"
        );

        self.query_feed(&sql, vec![viewer_id.into(), limit_value(limit)])
            .await
    }

    /// Most liked posts created at or after `since`, ties broken by recency.
    pub async fn find_trending_feed(
        &self,
        viewer_id: &str,
        since: DateTimeWithTimeZone,
        limit: u64,
    ) -> AppResult<Vec<FeedPostRow>> {
        let sql = format!(
            "{FEED_COLUMNS}
             WHERE p.created_at >= $2
             ORDER BY like_count DESC, p.created_at DESC, p.id DESC
             LIMIT $3"
        );

        self.query_feed(
            &sql,
            vec![viewer_id.into(), since.into(), limit_value(limit)],
        )
        .await
    }

    async fn query_feed(
        &self,
        sql: &str,
        values: Vec<sea_orm::Value>,
    ) -> AppResult<Vec<FeedPostRow>> {
        FeedPostRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            values,
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn limit_value(limit: u64) -> sea_orm::Value {
    i64::try_from(limit).unwrap_or(i64::MAX).into()
}
