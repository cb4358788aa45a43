//! Follow graph service.

use std::collections::HashSet;

use chrono::Utc;
use fitlog_common::{AppError, AppResult, IdGenerator};
use fitlog_db::{
    entities::follow,
    repositories::{FollowRepository, FollowWithProfile, RecommendedRow, UserProfileRepository},
};
use sea_orm::Set;

/// A user on either end of a follow edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSummary {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user.
    pub is_following: bool,
}

/// How many users the recommendation list returns.
pub const RECOMMENDED_LIMIT: u64 = 5;

/// A user the caller does not follow yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Users the caller follows who already follow this user.
    pub mutual_followers: u64,
}

impl From<RecommendedRow> for RecommendedUser {
    fn from(row: RecommendedRow) -> Self {
        Self {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            mutual_followers: u64::try_from(row.mutual_followers).unwrap_or_default(),
        }
    }
}

/// Follow service.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, profile_repo: UserProfileRepository) -> Self {
        Self {
            follow_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow `target_id`.
    pub async fn follow(&self, caller_id: &str, target_id: &str) -> AppResult<follow::Model> {
        if caller_id == target_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        self.profile_repo.get_by_user_id(caller_id).await?;
        if !self.profile_repo.exists(target_id).await? {
            return Err(AppError::UserNotFound(target_id.to_string()));
        }

        if self.follow_repo.is_following(caller_id, target_id).await? {
            return Err(AppError::Conflict("Already following".to_string()));
        }

        let edge = self
            .follow_repo
            .create(follow::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(caller_id.to_string()),
                following_id: Set(target_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(follower = caller_id, following = target_id, "User followed");

        Ok(edge)
    }

    /// Stop following `target_id`.
    pub async fn unfollow(&self, caller_id: &str, target_id: &str) -> AppResult<()> {
        self.profile_repo.get_by_user_id(caller_id).await?;

        let deleted = self.follow_repo.delete_by_pair(caller_id, target_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Not following this user".to_string()));
        }

        tracing::info!(follower = caller_id, following = target_id, "User unfollowed");

        Ok(())
    }

    /// Users the caller follows.
    pub async fn list_following(&self, caller_id: &str) -> AppResult<Vec<FollowSummary>> {
        let edges = self.follow_repo.find_following(caller_id).await?;
        Ok(summarize(edges, |_| true))
    }

    /// Users following the caller, flagged by whether the caller follows back.
    pub async fn list_followers(&self, caller_id: &str) -> AppResult<Vec<FollowSummary>> {
        let edges = self.follow_repo.find_followers(caller_id).await?;
        let followed_back: HashSet<String> = self
            .follow_repo
            .find_following_ids(caller_id)
            .await?
            .into_iter()
            .collect();

        Ok(summarize(edges, |user_id| followed_back.contains(user_id)))
    }

    /// Up to [`RECOMMENDED_LIMIT`] users the caller could follow.
    ///
    /// Never includes the caller or anyone already followed.
    pub async fn list_recommended(&self, caller_id: &str) -> AppResult<Vec<RecommendedUser>> {
        self.profile_repo.get_by_user_id(caller_id).await?;

        let rows = self
            .follow_repo
            .find_recommended(caller_id, RECOMMENDED_LIMIT)
            .await?;

        Ok(rows.into_iter().map(RecommendedUser::from).collect())
    }
}

/// Edges whose far-end profile is gone are skipped.
fn summarize(
    edges: Vec<FollowWithProfile>,
    is_following: impl Fn(&str) -> bool,
) -> Vec<FollowSummary> {
    edges
        .into_iter()
        .filter_map(|edge| edge.profile)
        .map(|profile| FollowSummary {
            is_following: is_following(&profile.user_id),
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fitlog_db::entities::user_profile;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_profile(user_id: &str) -> user_profile::Model {
        user_profile::Model {
            user_id: user_id.to_string(),
            first_name: user_id.to_uppercase(),
            last_name: "Lifter".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_follow(id: &str, follower_id: &str, following_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(follow_db: MockDatabase, profile_db: MockDatabase) -> FollowService {
        FollowService::new(
            FollowRepository::new(Arc::new(follow_db.into_connection())),
            UserProfileRepository::new(Arc::new(profile_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_follow_self_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.follow("ann", "ann").await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("yourself")),
            other => panic!("Expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_follow_unknown_target() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("ann")]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Into::<Value>::into(0i64),
                }]]),
        );

        let result = service.follow("ann", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_follow_twice_is_conflict() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("f1", "ann", "ben")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("ann")]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Into::<Value>::into(1i64),
                }]]),
        );

        let result = service.follow("ann", "ben").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unfollow_not_following() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("ann")]]),
        );

        let result = service.unfollow("ann", "ben").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_following_marks_all_followed() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("f1", "ann", "ben")]])
                .append_query_results([[create_test_profile("ben")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let following = service.list_following("ann").await.unwrap();

        assert_eq!(following.len(), 1);
        assert_eq!(following[0].user_id, "ben");
        assert_eq!(following[0].first_name, "BEN");
        assert!(following[0].is_following);
    }

    #[tokio::test]
    async fn test_list_recommended() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                maplit::btreemap! {
                    "user_id" => Into::<Value>::into("cat"),
                    "first_name" => Into::<Value>::into("Cat"),
                    "last_name" => Into::<Value>::into("Stevens"),
                    "mutual_followers" => Into::<Value>::into(3i64),
                },
            ]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("ann")]]),
        );

        let recommended = service.list_recommended("ann").await.unwrap();

        assert_eq!(
            recommended,
            vec![RecommendedUser {
                user_id: "cat".to_string(),
                first_name: "Cat".to_string(),
                last_name: "Stevens".to_string(),
                mutual_followers: 3,
            }]
        );
    }

    #[tokio::test]
    async fn test_list_recommended_requires_profile() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()]),
        );

        let result = service.list_recommended("ann").await;

        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
    }

    #[test]
    fn test_summarize_skips_missing_profiles() {
        let edges = vec![
            FollowWithProfile {
                follow: create_test_follow("f1", "ben", "ann"),
                profile: Some(create_test_profile("ben")),
            },
            FollowWithProfile {
                follow: create_test_follow("f2", "cat", "ann"),
                profile: None,
            },
        ];

        let summaries = summarize(edges, |id| id == "ben");

        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_following);
    }
}
