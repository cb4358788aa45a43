//! HTTP API layer for fitlog.
//!
//! - **Endpoints**: conversations, posts, follow graph, profile
//! - **Identity**: bearer-token caller resolution
//! - **Extractors**: authenticated caller, JSON bodies
//!
//! Built on Axum 0.8. Every successful body is wrapped as `{"data": ...}`;
//! failures render through [`fitlog_common::AppError`].

pub mod endpoints;
pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use identity::{IdentityResolver, JwtIdentityResolver};
pub use middleware::{AppState, Caller, auth_middleware};
