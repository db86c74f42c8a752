use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    error::{ApiError, BearerError, BearerErrorType, ErrorVerbosity, ErrorVerbosityProvider},
    types::used_bearer_token::UsedBearerToken,
};

/// Extracts the bearer token from the request headers.
///
/// The scheme is matched case-insensitively.
///
/// The token is not validated. See [`ApiPrincipal`](super::principal::ApiPrincipal) for that.
#[derive(Debug, Clone)]
pub struct ApiBearerToken(pub UsedBearerToken);

impl ApiBearerToken {
    fn extract_authorization(parts: &Parts, verbosity: ErrorVerbosity) -> Result<&str, ApiError> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                tracing::warn!("Rejection. Authorization header not found");

                BearerError::new(verbosity, BearerErrorType::AuthMissing)
            })?
            .to_str()
            .map_err(|err| {
                tracing::warn!(%err, "Rejection. Authorization header contains invalid characters");

                BearerError::new(
                    verbosity,
                    BearerErrorType::AuthInvalidChars {
                        reason: err.to_string(),
                    },
                )
            })?;

        Ok(authorization)
    }

    fn extract_bearer_token(
        authorization: &str,
        verbosity: ErrorVerbosity,
    ) -> Result<&str, ApiError> {
        let bearer_token = authorization
            .trim()
            .split_once(char::is_whitespace)
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
            .map(|(_, bearer_token)| bearer_token.trim());

        match bearer_token {
            Some(bearer_token) if !bearer_token.is_empty() => Ok(bearer_token),
            _ => {
                tracing::warn!("Rejection. Authorization header is invalid Bearer");

                Err(BearerError::new(verbosity, BearerErrorType::InvalidBearer).into())
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiBearerToken
where
    S: Send + Sync + ErrorVerbosityProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "bearer_token_extractor", skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verbosity = state.error_verbosity();

        let authorization = Self::extract_authorization(parts, verbosity)?;
        let bearer_token = Self::extract_bearer_token(authorization, verbosity)?;

        let used_bearer_token = UsedBearerToken {
            value: bearer_token.to_string(),
        };

        tracing::trace!(?used_bearer_token, "Extracted");

        Ok(ApiBearerToken(used_bearer_token))
    }
}
