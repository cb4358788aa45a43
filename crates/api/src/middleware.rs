//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use fitlog_core::{ConversationService, FeedService, FollowService, PostService, ProfileService};
use fitlog_db::repositories::{
    CommentRepository, FollowRepository, MessageRepository, PostLikeRepository, PostRepository,
    UserProfileRepository,
};
use sea_orm::DatabaseConnection;

use crate::identity::IdentityResolver;

/// The authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub conversation_service: ConversationService,
    pub feed_service: FeedService,
    pub post_service: PostService,
    pub follow_service: FollowService,
    pub profile_service: ProfileService,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Wire every repository and service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, identity: Arc<dyn IdentityResolver>) -> Self {
        let profile_repo = UserProfileRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));

        Self {
            conversation_service: ConversationService::new(
                MessageRepository::new(Arc::clone(&db)),
                profile_repo.clone(),
            ),
            feed_service: FeedService::new(
                post_repo.clone(),
                PostLikeRepository::new(Arc::clone(&db)),
                profile_repo.clone(),
            ),
            post_service: PostService::new(
                post_repo,
                CommentRepository::new(Arc::clone(&db)),
                profile_repo.clone(),
            ),
            follow_service: FollowService::new(
                FollowRepository::new(Arc::clone(&db)),
                profile_repo.clone(),
            ),
            profile_service: ProfileService::new(profile_repo),
            identity,
        }
    }
}

/// Authentication middleware.
///
/// Never rejects on its own; handlers that need a caller use
/// [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(user_id) = state.identity.resolve_caller(req.headers()).await {
        req.extensions_mut().insert(Caller(user_id));
    }

    next.run(req).await
}
