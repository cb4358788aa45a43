//! Repositories over the record store.

mod comment;
mod follow;
mod message;
mod post;
mod post_like;
mod user_profile;

pub use comment::{CommentRepository, CommentWithAuthor};
pub use follow::{FollowRepository, FollowWithProfile, RecommendedRow};
pub use message::{ConversationRow, MessageRepository};
pub use post::{FeedPostRow, PostRepository};
pub use post_like::PostLikeRepository;
pub use user_profile::UserProfileRepository;

use fitlog_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert failure, turning a unique-key violation into `Conflict`.
///
/// The unique index is what serializes racing inserts of the same pair; the
/// loser of the race ends up here.
pub(crate) fn insert_error(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}
