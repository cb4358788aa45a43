//! User profile service.

use chrono::Utc;
use fitlog_common::AppResult;
use fitlog_db::{entities::user_profile, repositories::UserProfileRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating or replacing the caller's profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileInput {
    #[validate(length(min = 1, max = 64))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64))]
    pub last_name: String,
}

/// Profile service.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: UserProfileRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: UserProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// The caller's profile.
    pub async fn get_profile(&self, caller_id: &str) -> AppResult<user_profile::Model> {
        self.profile_repo.get_by_user_id(caller_id).await
    }

    /// Create the caller's profile, or update it if it already exists.
    pub async fn upsert_profile(
        &self,
        caller_id: &str,
        input: UpsertProfileInput,
    ) -> AppResult<user_profile::Model> {
        input.validate()?;

        let now = Utc::now();
        match self.profile_repo.find_by_user_id(caller_id).await? {
            Some(existing) => {
                let mut active: user_profile::ActiveModel = existing.into();
                active.first_name = Set(input.first_name);
                active.last_name = Set(input.last_name);
                active.updated_at = Set(Some(now.into()));
                self.profile_repo.update(active).await
            }
            None => {
                let profile = self
                    .profile_repo
                    .create(user_profile::ActiveModel {
                        user_id: Set(caller_id.to_string()),
                        first_name: Set(input.first_name),
                        last_name: Set(input.last_name),
                        created_at: Set(now.into()),
                        updated_at: Set(None),
                    })
                    .await?;

                tracing::info!(user = caller_id, "Profile created");
                Ok(profile)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fitlog_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_profile(first: &str) -> user_profile::Model {
        user_profile::Model {
            user_id: "u1".to_string(),
            first_name: first.to_string(),
            last_name: "Curie".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> ProfileService {
        ProfileService::new(UserProfileRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_name() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .upsert_profile(
                "u1",
                UpsertProfileInput {
                    first_name: String::new(),
                    last_name: "Curie".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upsert_creates_when_missing() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .append_query_results([[create_test_profile("Marie")]]),
        );

        let profile = service
            .upsert_profile(
                "u1",
                UpsertProfileInput {
                    first_name: "Marie".to_string(),
                    last_name: "Curie".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.display_name(), "Marie Curie");
    }

    #[tokio::test]
    async fn test_upsert_updates_existing() {
        let mut updated = create_test_profile("Maria");
        updated.updated_at = Some(Utc::now().into());

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("Marie")]])
                .append_query_results([[updated]]),
        );

        let profile = service
            .upsert_profile(
                "u1",
                UpsertProfileInput {
                    first_name: "Maria".to_string(),
                    last_name: "Curie".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.first_name, "Maria");
        assert!(profile.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_get_profile_missing() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()]),
        );

        assert!(matches!(
            service.get_profile("u1").await,
            Err(AppError::ProfileNotFound(_))
        ));
    }
}
