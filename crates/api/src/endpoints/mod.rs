//! API endpoints.

mod conversations;
mod health;
mod posts;
mod profile;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
///
/// Authentication is enforced per handler through
/// [`crate::extractors::AuthUser`]; `/health` is public.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/conversations", conversations::router())
        .nest("/posts", posts::router())
        .nest("/users", users::router())
        .nest("/profile", profile::router())
}
