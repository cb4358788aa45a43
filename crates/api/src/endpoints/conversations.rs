//! Direct message endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use fitlog_common::AppResult;
use fitlog_core::{
    ConversationPage, ConversationSummary, PageInfo, PageRequest, SendMessageInput,
};
use fitlog_db::entities::message;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ApiResponse,
};

/// Create conversations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_conversations))
        .route("/unread/count", get(get_unread_count))
        .route("/{peer_id}", get(get_conversation).post(send_message))
}

/// Message response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub read: bool,
}

impl From<message::Model> for MessageResponse {
    fn from(msg: message::Model) -> Self {
        Self {
            id: msg.id,
            content: msg.content,
            sender_id: msg.sender_id,
            receiver_id: msg.receiver_id,
            timestamp: msg.timestamp,
            read: msg.read,
        }
    }
}

/// Pagination block of a conversation page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_messages: u64,
}

impl From<PageInfo> for PaginationResponse {
    fn from(info: PageInfo) -> Self {
        Self {
            current_page: info.current_page,
            total_pages: info.total_pages,
            total_messages: info.total_items,
        }
    }
}

/// Conversation page response.
#[derive(Debug, Serialize)]
pub struct ConversationPageResponse {
    pub messages: Vec<MessageResponse>,
    pub pagination: PaginationResponse,
}

impl From<ConversationPage> for ConversationPageResponse {
    fn from(page: ConversationPage) -> Self {
        Self {
            messages: page.messages.into_iter().map(MessageResponse::from).collect(),
            pagination: page.pagination.into(),
        }
    }
}

/// Conversation list entry response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryResponse {
    pub peer_id: String,
    pub peer_name: Option<String>,
    pub last_message_content: String,
    pub last_message_timestamp: DateTime<FixedOffset>,
    pub unread_count: u64,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(s: ConversationSummary) -> Self {
        Self {
            peer_id: s.peer_id,
            peer_name: s.peer_name,
            last_message_content: s.last_message_content,
            last_message_timestamp: s.last_message_timestamp,
            unread_count: s.unread_count,
        }
    }
}

/// Unread count response.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Raw pagination query. Kept as strings so bad values fall back to defaults
/// instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// List the caller's conversations.
async fn list_conversations(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ConversationSummaryResponse>>> {
    let summaries = state
        .conversation_service
        .list_conversations(&caller)
        .await?;

    Ok(ApiResponse::ok(
        summaries
            .into_iter()
            .map(ConversationSummaryResponse::from)
            .collect(),
    ))
}

/// Total unread messages for the caller.
async fn get_unread_count(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.conversation_service.get_unread_count(&caller).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

/// Open a conversation page, marking the peer's messages read.
async fn get_conversation(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(peer_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<ConversationPageResponse>> {
    let page = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());

    let result = state
        .conversation_service
        .get_conversation(&caller, &peer_id, page)
        .await?;

    Ok(ApiResponse::ok(result.into()))
}

/// Send a message to a peer.
async fn send_message(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(peer_id): Path<String>,
    JsonBody(input): JsonBody<SendMessageInput>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let message = state
        .conversation_service
        .send_message(&caller, &peer_id, input)
        .await?;

    Ok(ApiResponse::ok(message.into()))
}
