//! User profile repository.

use std::sync::Arc;

use crate::entities::{UserProfile, user_profile};
use fitlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// User profile repository for database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl UserProfileRepository {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user profile by user ID, returning `ProfileNotFound` if absent.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(user_id.to_string()))
    }

    /// Check whether a profile exists for the user.
    pub async fn exists(&self, user_id: &str) -> AppResult<bool> {
        let count = UserProfile::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new user profile.
    pub async fn create(
        &self,
        model: user_profile::ActiveModel,
    ) -> AppResult<user_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user profile.
    pub async fn update(
        &self,
        model: user_profile::ActiveModel,
    ) -> AppResult<user_profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_profile(user_id: &str) -> user_profile::Model {
        user_profile::Model {
            user_id: user_id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_user_id_found() {
        let profile = create_test_profile("user_1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let found = repo.get_by_user_id("user_1").await.unwrap();

        assert_eq!(found.user_id, "user_1");
        assert_eq!(found.display_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_get_by_user_id_missing_is_profile_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_by_user_id("ghost").await;

        match result {
            Err(AppError::ProfileNotFound(id)) => assert_eq!(id, "ghost"),
            other => panic!("Expected ProfileNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exists() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Into::<Value>::into(1i64),
                }]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        assert!(repo.exists("user_1").await.unwrap());
    }
}
