//! Post authoring and comments.

use chrono::{DateTime, FixedOffset, Utc};
use fitlog_common::{AppError, AppResult, IdGenerator};
use fitlog_db::{
    entities::{comment, post},
    repositories::{CommentRepository, CommentWithAuthor, PostRepository, UserProfileRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::feed::FeedPost;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub workout_log_id: Option<String>,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// A comment with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub author_name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.comment.id,
            content: row.comment.content,
            user_id: row.comment.user_id,
            author_name: row.author.map(|a| a.display_name()),
            created_at: row.comment.created_at,
        }
    }
}

fn reject_blank(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be blank".to_string()));
    }
    Ok(())
}

/// Post service.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a post as the caller.
    pub async fn create_post(&self, caller_id: &str, input: CreatePostInput) -> AppResult<FeedPost> {
        input.validate()?;
        reject_blank(&input.content)?;

        let author = self.profile_repo.get_by_user_id(caller_id).await?;

        let post = self
            .post_repo
            .create(post::ActiveModel {
                id: Set(self.id_gen.generate()),
                content: Set(input.content),
                user_id: Set(caller_id.to_string()),
                workout_log_id: Set(input.workout_log_id),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(post = %post.id, author = caller_id, "Post created");

        Ok(FeedPost {
            id: post.id,
            content: post.content,
            user_id: post.user_id,
            workout_log_id: post.workout_log_id,
            created_at: post.created_at,
            author_name: Some(author.display_name()),
            like_count: 0,
            comment_count: 0,
            has_liked: false,
        })
    }

    /// Comments on a post, newest first.
    pub async fn list_comments(&self, post_id: &str) -> AppResult<Vec<CommentView>> {
        self.post_repo.get_by_id(post_id).await?;

        let comments = self.comment_repo.find_by_post(post_id).await?;
        Ok(comments.into_iter().map(CommentView::from).collect())
    }

    /// Comment on a post as the caller.
    pub async fn create_comment(
        &self,
        caller_id: &str,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<CommentView> {
        input.validate()?;
        reject_blank(&input.content)?;

        let author = self.profile_repo.get_by_user_id(caller_id).await?;
        self.post_repo.get_by_id(post_id).await?;

        let comment = self
            .comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                content: Set(input.content),
                post_id: Set(post_id.to_string()),
                user_id: Set(caller_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(comment = %comment.id, post = post_id, author = caller_id, "Comment created");

        Ok(CommentView::from(CommentWithAuthor {
            comment,
            author: Some(author),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fitlog_db::entities::user_profile;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_profile(user_id: &str) -> user_profile::Model {
        user_profile::Model {
            user_id: user_id.to_string(),
            first_name: "Jo".to_string(),
            last_name: "March".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            content: "Morning swim".to_string(),
            user_id: user_id.to_string(),
            workout_log_id: Some("log9".to_string()),
            created_at: Utc::now().into(),
        }
    }

    fn service(post_db: MockDatabase, comment_db: MockDatabase, profile_db: MockDatabase) -> PostService {
        PostService::new(
            PostRepository::new(Arc::new(post_db.into_connection())),
            CommentRepository::new(Arc::new(comment_db.into_connection())),
            UserProfileRepository::new(Arc::new(profile_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_create_post_blank_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .create_post(
                "jo",
                CreatePostInput {
                    content: "  ".to_string(),
                    workout_log_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post_returns_zero_counts() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "jo")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("jo")]]),
        );

        let post = service
            .create_post(
                "jo",
                CreatePostInput {
                    content: "Morning swim".to_string(),
                    workout_log_id: Some("log9".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(post.author_name.as_deref(), Some("Jo March"));
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert!(!post.has_liked);
        assert_eq!(post.workout_log_id.as_deref(), Some("log9"));
    }

    #[tokio::test]
    async fn test_list_comments_unknown_post() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.list_comments("nope").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_comment() {
        let stored = comment::Model {
            id: "c1".to_string(),
            content: "Great pace".to_string(),
            post_id: "p1".to_string(),
            user_id: "jo".to_string(),
            created_at: Utc::now().into(),
        };

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "amy")]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[stored]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("jo")]]),
        );

        let view = service
            .create_comment(
                "jo",
                "p1",
                CreateCommentInput {
                    content: "Great pace".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(view.id, "c1");
        assert_eq!(view.author_name.as_deref(), Some("Jo March"));
    }
}
