//! Profile endpoints.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, FixedOffset};
use fitlog_common::AppResult;
use fitlog_core::UpsertProfileInput;
use fitlog_db::entities::user_profile;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ApiResponse,
};

/// Create profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(upsert_profile))
}

/// Profile response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<user_profile::Model> for ProfileResponse {
    fn from(p: user_profile::Model) -> Self {
        Self {
            user_id: p.user_id,
            first_name: p.first_name,
            last_name: p.last_name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

async fn get_profile(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.get_profile(&caller).await?;
    Ok(ApiResponse::ok(profile.into()))
}

async fn upsert_profile(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UpsertProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .upsert_profile(&caller, input)
        .await?;
    Ok(ApiResponse::ok(profile.into()))
}
