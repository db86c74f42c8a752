use serde::Serialize;

/// The caller authenticated by a [`BearerAuthenticator`](crate::auth::BearerAuthenticator).
///
/// Put as a request extension by [`require_bearer`](crate::middleware::require_bearer::require_bearer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub subject: String,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}
