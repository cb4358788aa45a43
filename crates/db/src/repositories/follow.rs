//! Follow repository.

use std::{collections::HashMap, sync::Arc};

use super::insert_error;
use crate::entities::{Follow, UserProfile, follow, user_profile};
use fitlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Statement,
};

/// A follow edge together with the profile on the far end of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowWithProfile {
    pub follow: follow::Model,
    pub profile: Option<user_profile::Model>,
}

/// A profile the user does not follow yet, with the number of users they
/// follow who already follow it.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct RecommendedRow {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub mutual_followers: i64,
}

// $1 is the viewer.
const RECOMMENDED_SQL: &str = r"
    WITH followed AS (
        SELECT following_id FROM follow WHERE follower_id = $1
    )
    SELECT p.user_id, p.first_name, p.last_name,
           (SELECT COUNT(*) FROM follow mf
            WHERE mf.following_id = p.user_id
              AND mf.follower_id IN (SELECT following_id FROM followed)) AS mutual_followers
    FROM user_profile p
    WHERE p.user_id <> $1
      AND p.user_id NOT IN (SELECT following_id FROM followed)
    ORDER BY mutual_followers DESC, p.user_id
    LIMIT $2
";

/// Repository for the follow graph.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow edge by follower and followed user.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, following_id).await?.is_some())
    }

    /// Create a follow edge. An existing edge for the pair is a `Conflict`.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Already following"))
    }

    /// Delete a follow edge by pair, returning how many rows went away.
    pub async fn delete_by_pair(&self, follower_id: &str, following_id: &str) -> AppResult<u64> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// IDs of every user `user_id` follows.
    pub async fn find_following_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Follow::find()
            .select_only()
            .column(follow::Column::FollowingId)
            .filter(follow::Column::FollowerId.eq(user_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users that `user_id` follows, newest edge first.
    pub async fn find_following(&self, user_id: &str) -> AppResult<Vec<FollowWithProfile>> {
        let edges = Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ids = edges.iter().map(|e| e.following_id.clone()).collect();
        self.attach_profiles(edges, ids).await
    }

    /// Users following `user_id`, newest edge first.
    pub async fn find_followers(&self, user_id: &str) -> AppResult<Vec<FollowWithProfile>> {
        let edges = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ids = edges.iter().map(|e| e.follower_id.clone()).collect();
        self.attach_profiles(edges, ids).await
    }

    /// Profiles `user_id` could follow, most shared connections first.
    pub async fn find_recommended(&self, user_id: &str, limit: u64) -> AppResult<Vec<RecommendedRow>> {
        RecommendedRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            RECOMMENDED_SQL,
            [
                user_id.into(),
                i64::try_from(limit).unwrap_or(i64::MAX).into(),
            ],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the profiles on the far side of `edges` in one query.
    ///
    /// `far_ids[i]` is the far-end user of `edges[i]`.
    async fn attach_profiles(
        &self,
        edges: Vec<follow::Model>,
        far_ids: Vec<String>,
    ) -> AppResult<Vec<FollowWithProfile>> {
        if edges.is_empty() {
            return Ok(Vec::new());
        }

        let profiles: HashMap<String, user_profile::Model> = UserProfile::find()
            .filter(user_profile::Column::UserId.is_in(far_ids.clone()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();

        Ok(edges
            .into_iter()
            .zip(far_ids)
            .map(|(follow, far_id)| FollowWithProfile {
                profile: profiles.get(&far_id).cloned(),
                follow,
            })
            .collect())
    }
}
