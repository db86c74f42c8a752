use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    auth::{AuthError, AuthenticatorProvider},
    error::{ApiError, BearerError, BearerErrorType, ErrorVerbosityProvider, InternalServerError},
    types::{principal::Principal, used_bearer_token::UsedBearerToken},
};

use super::bearer_token::ApiBearerToken;

/// Extracts the bearer token and authenticates it with the state's authenticator.
#[derive(Debug, Clone)]
pub struct ApiPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for ApiPrincipal
where
    S: Send + Sync + AuthenticatorProvider + ErrorVerbosityProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "principal_extractor", skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verbosity = state.error_verbosity();

        let ApiBearerToken(UsedBearerToken { value }) =
            ApiBearerToken::from_request_parts(parts, state).await?;

        let principal = state
            .authenticator()
            .authenticate(&value)
            .await
            .map_err(|err| {
                tracing::warn!(%err, "Rejection");

                match err {
                    AuthError::Rejected { reason } => ApiError::from(BearerError::new(
                        verbosity,
                        BearerErrorType::Rejected { reason },
                    )),
                    AuthError::Expired => {
                        BearerError::new(verbosity, BearerErrorType::Expired).into()
                    }
                    AuthError::Internal(err) => {
                        InternalServerError::from_generic_error(verbosity, err).into()
                    }
                }
            })?;

        tracing::trace!(subject = %principal.subject, "Authenticated");

        Ok(ApiPrincipal(principal))
    }
}
