//! Direct message repository.

use crate::entities::{Message, message};
use fitlog_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use std::sync::Arc;

/// One row per conversation peer, as produced by
/// [`MessageRepository::find_conversation_summaries`].
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ConversationRow {
    pub peer_id: String,
    pub peer_first_name: Option<String>,
    pub peer_last_name: Option<String>,
    pub last_message_content: String,
    pub last_message_timestamp: DateTimeWithTimeZone,
    pub unread_count: i64,
}

/// Latest message per peer joined with the per-peer unread count.
///
/// The peer is keyed on the unordered pair, so a conversation yields exactly
/// one row whichever side sent the latest message.
const CONVERSATION_SUMMARIES_SQL: &str = r"
    WITH conversation AS (
        SELECT id, content, timestamp,
               CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS peer_id
        FROM message
        WHERE sender_id = $1 OR receiver_id = $1
    ),
    latest AS (
        SELECT DISTINCT ON (peer_id) peer_id, content, timestamp
        FROM conversation
        ORDER BY peer_id, timestamp DESC, id DESC
    ),
    unread AS (
        SELECT sender_id AS peer_id, COUNT(*) AS unread_count
        FROM message
        WHERE receiver_id = $1 AND read = false
        GROUP BY sender_id
    )
    SELECT latest.peer_id,
           profile.first_name AS peer_first_name,
           profile.last_name AS peer_last_name,
           latest.content AS last_message_content,
           latest.timestamp AS last_message_timestamp,
           COALESCE(unread.unread_count, 0) AS unread_count
    FROM latest
    LEFT JOIN unread ON unread.peer_id = latest.peer_id
    LEFT JOIN user_profile AS profile ON profile.user_id = latest.peer_id
    ORDER BY latest.timestamp DESC, latest.peer_id
";

/// Repository for direct message operations.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Messages exchanged between the two users, in either direction.
    fn between(user_id: &str, peer_id: &str) -> Condition {
        Condition::any()
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(user_id))
                    .add(message::Column::ReceiverId.eq(peer_id)),
            )
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(peer_id))
                    .add(message::Column::ReceiverId.eq(user_id)),
            )
    }

    /// Create a new message.
    pub async fn create(&self, model: message::ActiveModel) -> AppResult<message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of a conversation, newest first.
    ///
    /// Ordered by `(timestamp, id)` descending so that the order is total and
    /// identical for both participants.
    pub async fn find_conversation_page(
        &self,
        user_id: &str,
        peer_id: &str,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(Self::between(user_id, peer_id))
            .order_by_desc(message::Column::Timestamp)
            .order_by_desc(message::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all messages in a conversation.
    pub async fn count_conversation(&self, user_id: &str, peer_id: &str) -> AppResult<u64> {
        Message::find()
            .filter(Self::between(user_id, peer_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark every unread message from `sender_id` to `receiver_id` as read.
    ///
    /// A single conditional update: concurrent callers cannot double-apply it
    /// and rows already read are never touched. Returns the number of
    /// messages that transitioned.
    pub async fn mark_conversation_read(
        &self,
        receiver_id: &str,
        sender_id: &str,
    ) -> AppResult<u64> {
        let result = Message::update_many()
            .col_expr(message::Column::Read, Expr::value(true))
            .filter(message::Column::SenderId.eq(sender_id))
            .filter(message::Column::ReceiverId.eq(receiver_id))
            .filter(message::Column::Read.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count all unread messages addressed to a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        Message::find()
            .filter(message::Column::ReceiverId.eq(user_id))
            .filter(message::Column::Read.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Conversation list for a user, most recently active first.
    pub async fn find_conversation_summaries(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<ConversationRow>> {
        ConversationRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            CONVERSATION_SUMMARIES_SQL,
            [user_id.into()],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
