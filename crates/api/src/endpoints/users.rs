//! Follow graph endpoints.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use fitlog_common::AppResult;
use fitlog_core::{FollowSummary, RecommendedUser};
use fitlog_db::entities::follow;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow", post(follow_user).delete(unfollow_user))
        .route("/following", get(list_following))
        .route("/followers", get(list_followers))
        .route("/recommended", get(list_recommended))
}

/// Follow request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow edge response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<follow::Model> for FollowResponse {
    fn from(edge: follow::Model) -> Self {
        Self {
            id: edge.id,
            follower_id: edge.follower_id,
            following_id: edge.following_id,
            created_at: edge.created_at,
        }
    }
}

/// User summary in following/follower lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub is_following: bool,
}

impl From<FollowSummary> for FollowUserResponse {
    fn from(s: FollowSummary) -> Self {
        Self {
            user_id: s.user_id,
            first_name: s.first_name,
            last_name: s.last_name,
            is_following: s.is_following,
        }
    }
}

/// Suggested user response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedUserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub mutual_followers: u64,
    pub is_following: bool,
}

impl From<RecommendedUser> for RecommendedUserResponse {
    fn from(u: RecommendedUser) -> Self {
        Self {
            user_id: u.user_id,
            first_name: u.first_name,
            last_name: u.last_name,
            mutual_followers: u.mutual_followers,
            is_following: false,
        }
    }
}

/// Follow a user.
async fn follow_user(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let edge = state.follow_service.follow(&caller, &req.user_id).await?;
    Ok(ApiResponse::ok(edge.into()))
}

/// Unfollow a user.
async fn unfollow_user(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FollowRequest>,
) -> AppResult<StatusCode> {
    state.follow_service.unfollow(&caller, &req.user_id).await?;
    Ok(no_content())
}

/// Users the caller follows.
async fn list_following(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FollowUserResponse>>> {
    let users = state.follow_service.list_following(&caller).await?;
    Ok(ApiResponse::ok(
        users.into_iter().map(FollowUserResponse::from).collect(),
    ))
}

/// Users following the caller.
async fn list_followers(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FollowUserResponse>>> {
    let users = state.follow_service.list_followers(&caller).await?;
    Ok(ApiResponse::ok(
        users.into_iter().map(FollowUserResponse::from).collect(),
    ))
}

/// Users the caller might want to follow.
async fn list_recommended(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<RecommendedUserResponse>>> {
    let users = state.follow_service.list_recommended(&caller).await?;
    Ok(ApiResponse::ok(
        users.into_iter().map(RecommendedUserResponse::from).collect(),
    ))
}
