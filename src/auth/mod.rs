use std::sync::Arc;

use axum::async_trait;

use crate::types::principal::Principal;

pub mod jwks;
pub mod jwt;
pub mod static_token;

#[cfg(test)]
mod test_keys;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token rejected: {reason}")]
    Rejected { reason: String },
    #[error("Token expired")]
    Expired,
    #[error("Authentication failed: {0:#}")]
    Internal(#[source] anyhow::Error),
}

/// Turns a bearer credential into a [`Principal`].
#[async_trait]
pub trait BearerAuthenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError>;
}

pub trait AuthenticatorProvider {
    /// Returns the authenticator guarding the protected routes.
    fn authenticator(&self) -> Arc<dyn BearerAuthenticator>;
}
