//! Caller identity resolution.
//!
//! Identities are issued by an external provider; this service only verifies
//! the bearer token and reads the subject out of it.

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use fitlog_common::config::AuthConfig;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

/// Maps an inbound request to the authenticated caller's user ID.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns `None` when the request carries no valid identity.
    async fn resolve_caller(&self, headers: &HeaderMap) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies HS256 bearer tokens and yields their `sub` claim.
#[derive(Clone)]
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    /// Build a resolver from the `auth` configuration section.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    fn verify(&self, token: &str) -> Option<String> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) if !data.claims.sub.is_empty() => Some(data.claims.sub),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve_caller(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))?;

        self.verify(token.trim())
    }
}
