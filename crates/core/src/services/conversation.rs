//! Direct-message conversations between two users.
//!
//! A conversation is not stored: it is every message whose sender/receiver
//! pair equals `{caller, peer}`. The only mutation besides sending is the
//! one-way `read` transition, applied when the receiver opens the
//! conversation.

use std::time::SystemTime;

use crate::services::pagination::{PageInfo, PageRequest};
use chrono::{DateTime, FixedOffset, Utc};
use fitlog_common::{AppError, AppResult, IdGenerator};
use fitlog_db::{
    entities::message,
    repositories::{ConversationRow, MessageRepository, UserProfileRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for sending a message.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageInput {
    #[validate(length(min = 1, max = 4096))]
    pub content: String,
}

/// One page of a conversation, oldest message first.
#[derive(Debug, Clone)]
pub struct ConversationPage {
    pub messages: Vec<message::Model>,
    pub pagination: PageInfo,
}

/// Conversation list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub peer_id: String,
    /// `None` when the peer has no profile.
    pub peer_name: Option<String>,
    pub last_message_content: String,
    pub last_message_timestamp: DateTime<FixedOffset>,
    pub unread_count: u64,
}

impl From<ConversationRow> for ConversationSummary {
    fn from(row: ConversationRow) -> Self {
        let peer_name = match (row.peer_first_name, row.peer_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        };

        Self {
            peer_id: row.peer_id,
            peer_name,
            last_message_content: row.last_message_content,
            last_message_timestamp: row.last_message_timestamp,
            unread_count: u64::try_from(row.unread_count).unwrap_or_default(),
        }
    }
}

/// Conversation service.
#[derive(Clone)]
pub struct ConversationService {
    message_repo: MessageRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl ConversationService {
    /// Create a new conversation service.
    #[must_use]
    pub fn new(message_repo: MessageRepository, profile_repo: UserProfileRepository) -> Self {
        Self {
            message_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a message from `caller_id` to `peer_id`.
    ///
    /// Every call creates a new message; there is no deduplication.
    pub async fn send_message(
        &self,
        caller_id: &str,
        peer_id: &str,
        input: SendMessageInput,
    ) -> AppResult<message::Model> {
        input.validate()?;
        if input.content.trim().is_empty() {
            return Err(AppError::Validation(
                "Message content must not be blank".to_string(),
            ));
        }

        self.profile_repo.get_by_user_id(caller_id).await?;
        if !self.profile_repo.exists(peer_id).await? {
            return Err(AppError::UserNotFound(peer_id.to_string()));
        }

        let now = Utc::now();
        let model = message::ActiveModel {
            id: Set(self.id_gen.generate_at(SystemTime::from(now))),
            content: Set(input.content),
            sender_id: Set(caller_id.to_string()),
            receiver_id: Set(peer_id.to_string()),
            timestamp: Set(now.into()),
            read: Set(false),
        };

        let message = self.message_repo.create(model).await?;

        tracing::info!(
            message_id = %message.id,
            sender = caller_id,
            recipient = peer_id,
            "Message sent"
        );

        Ok(message)
    }

    /// Open a conversation page.
    ///
    /// Marks everything `peer_id` sent to the caller as read first, so the
    /// returned page already reflects the transition. Messages come back
    /// oldest first; page 1 holds the most recent `limit` messages.
    pub async fn get_conversation(
        &self,
        caller_id: &str,
        peer_id: &str,
        page: PageRequest,
    ) -> AppResult<ConversationPage> {
        self.profile_repo.get_by_user_id(caller_id).await?;

        let marked = self
            .message_repo
            .mark_conversation_read(caller_id, peer_id)
            .await?;
        if marked > 0 {
            tracing::debug!(reader = caller_id, sender = peer_id, marked, "Marked messages read");
        }

        let mut messages = self
            .message_repo
            .find_conversation_page(caller_id, peer_id, page.offset(), page.limit())
            .await?;
        messages.reverse();

        let total = self
            .message_repo
            .count_conversation(caller_id, peer_id)
            .await?;

        Ok(ConversationPage {
            messages,
            pagination: PageInfo::new(page, total),
        })
    }

    /// Every conversation the caller takes part in, most recent first.
    ///
    /// Read-only: unread counts are reported, never reset.
    pub async fn list_conversations(&self, caller_id: &str) -> AppResult<Vec<ConversationSummary>> {
        self.profile_repo.get_by_user_id(caller_id).await?;

        let rows = self
            .message_repo
            .find_conversation_summaries(caller_id)
            .await?;

        Ok(rows.into_iter().map(ConversationSummary::from).collect())
    }

    /// Total unread messages addressed to the caller.
    pub async fn get_unread_count(&self, caller_id: &str) -> AppResult<u64> {
        self.message_repo.count_unread(caller_id).await
    }
}
