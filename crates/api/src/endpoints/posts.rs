//! Feed, post, like and comment endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use fitlog_common::AppResult;
use fitlog_core::{CommentView, CreateCommentInput, CreatePostInput, FeedMode, FeedPost};
use fitlog_db::entities::post_like;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_feed).post(create_post))
        .route("/likes", post(like_post).delete(unlike_post))
        .route("/{post_id}/comments", get(list_comments).post(create_comment))
}

/// Author block embedded in posts and comments.
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: String,
    pub name: Option<String>,
}

/// Post response, scoped to the viewer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub workout_log_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub user: AuthorResponse,
    pub like_count: u64,
    pub comment_count: u64,
    pub has_liked: bool,
}

impl From<FeedPost> for PostResponse {
    fn from(post: FeedPost) -> Self {
        Self {
            user: AuthorResponse {
                id: post.user_id.clone(),
                name: post.author_name,
            },
            id: post.id,
            content: post.content,
            user_id: post.user_id,
            workout_log_id: post.workout_log_id,
            created_at: post.created_at,
            like_count: post.like_count,
            comment_count: post.comment_count,
            has_liked: post.has_liked,
        }
    }
}

/// Like response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<post_like::Model> for LikeResponse {
    fn from(like: post_like::Model) -> Self {
        Self {
            id: like.id,
            post_id: like.post_id,
            user_id: like.user_id,
            created_at: like.created_at,
        }
    }
}

/// Comment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub user: AuthorResponse,
}

impl From<CommentView> for CommentResponse {
    fn from(comment: CommentView) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            user: AuthorResponse {
                id: comment.user_id,
                name: comment.author_name,
            },
        }
    }
}

/// Feed query.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub feed: FeedMode,
}

/// Like/unlike request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub post_id: String,
}

/// List the caller's feed.
async fn list_feed(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.feed_service.list_feed(&caller, query.feed).await?;
    Ok(ApiResponse::ok(
        posts.into_iter().map(PostResponse::from).collect(),
    ))
}

/// Publish a post.
async fn create_post(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create_post(&caller, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Like a post.
async fn like_post(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LikeRequest>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let like = state.feed_service.like_post(&caller, &req.post_id).await?;
    Ok(ApiResponse::ok(like.into()))
}

/// Remove the caller's like.
async fn unlike_post(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LikeRequest>,
) -> AppResult<StatusCode> {
    state
        .feed_service
        .unlike_post(&caller, &req.post_id)
        .await?;
    Ok(no_content())
}

/// Comments on a post, newest first.
async fn list_comments(
    AuthUser(_caller): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.post_service.list_comments(&post_id).await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// Comment on a post.
async fn create_comment(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    JsonBody(input): JsonBody<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .post_service
        .create_comment(&caller, &post_id, input)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}
