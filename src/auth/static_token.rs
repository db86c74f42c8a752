use std::collections::HashMap;

use axum::async_trait;
use derivative::Derivative;
use serde::Deserialize;

use crate::{types::principal::Principal, utils::mask_fmt};

use super::{AuthError, BearerAuthenticator};

#[derive(Derivative, Clone, Deserialize)]
#[derivative(Debug)]
pub struct StaticToken {
    #[derivative(Debug(format_with = "mask_fmt"))]
    pub token: String,
    pub subject: String,
}

/// Accepts a fixed set of tokens, each mapped to a subject.
///
/// Lookup is a plain hash map hit and not constant time. Not meant for production secrets.
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuthenticator {
    pub fn new(tokens: impl IntoIterator<Item = StaticToken>) -> Self {
        let tokens = tokens
            .into_iter()
            .map(|StaticToken { token, subject }| (token, subject))
            .collect();

        Self { tokens }
    }
}

#[async_trait]
impl BearerAuthenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        match self.tokens.get(token) {
            Some(subject) => Ok(Principal::new(subject.as_str())),
            None => Err(AuthError::Rejected {
                reason: "Unknown token".to_string(),
            }),
        }
    }
}
