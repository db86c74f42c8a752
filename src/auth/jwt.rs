use axum::async_trait;
use derivative::Derivative;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use validation::{JwtValidationError, JwtValidator};

use crate::{types::principal::Principal, utils::mask_fmt};

use super::{jwks::JwkRefresher, AuthError, BearerAuthenticator};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub key: JwtKeyConfig,
    #[serde(default)]
    pub audience: Vec<String>,
    #[serde(default)]
    pub issuer: Vec<String>,
    #[serde(default = "default_validate_nbf")]
    pub validate_nbf: bool,
}

fn default_validate_nbf() -> bool {
    true
}

#[derive(Derivative, Clone, Deserialize)]
#[derivative(Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JwtKeyConfig {
    /// HMAC shared secret, tokens are signed with `HS256`.
    Secret {
        #[derivative(Debug(format_with = "mask_fmt"))]
        secret: String,
    },
    /// Remote RSA keys, looked up by the token's `kid`.
    Jwks {
        jwks_uri: String,
        time_to_live_in_seconds: u64,
    },
}

enum JwtKeys {
    Secret(DecodingKey),
    Jwks(JwkRefresher),
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Validates bearer JWTs and uses the `sub` claim as the subject.
pub struct JwtAuthenticator {
    keys: JwtKeys,
    audience: Vec<String>,
    issuer: Vec<String>,
    validate_nbf: bool,
}

impl JwtAuthenticator {
    pub async fn from_config(config: JwtConfig) -> anyhow::Result<Self> {
        let keys = match config.key {
            JwtKeyConfig::Secret { secret } => {
                JwtKeys::Secret(DecodingKey::from_secret(secret.as_bytes()))
            }
            JwtKeyConfig::Jwks {
                jwks_uri,
                time_to_live_in_seconds,
            } => JwtKeys::Jwks(
                JwkRefresher::new(time_to_live_in_seconds, jwks_uri, reqwest::Client::new())
                    .await?,
            ),
        };

        Ok(Self {
            keys,
            audience: config.audience,
            issuer: config.issuer,
            validate_nbf: config.validate_nbf,
        })
    }

    pub fn with_secret(secret: &[u8], audience: Vec<String>, issuer: Vec<String>) -> Self {
        Self {
            keys: JwtKeys::Secret(DecodingKey::from_secret(secret)),
            audience,
            issuer,
            validate_nbf: true,
        }
    }

    pub fn with_jwks(refresher: JwkRefresher, audience: Vec<String>, issuer: Vec<String>) -> Self {
        Self {
            keys: JwtKeys::Jwks(refresher),
            audience,
            issuer,
            validate_nbf: true,
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);

        if self.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(self.audience.as_slice());
        }

        if !self.issuer.is_empty() {
            validation.set_issuer(self.issuer.as_slice());
        }

        validation.validate_nbf = self.validate_nbf;

        validation
    }

    async fn claims(&self, jwt: &str) -> Result<Claims, AuthError> {
        let result: Result<Claims, JwtValidationError> = match &self.keys {
            JwtKeys::Secret(key) => {
                JwtValidator::decode(jwt, key, &self.validation(Algorithm::HS256))
            }
            JwtKeys::Jwks(refresher) => {
                let jwks = refresher
                    .jwks()
                    .await
                    .map_err(|err| AuthError::Internal(err.into()))?;

                JwtValidator::resolve_key(jwt, jwks.as_ref()).and_then(|(key, algorithm)| {
                    JwtValidator::decode(jwt, &key, &self.validation(algorithm))
                })
            }
        };

        result.map_err(|err| {
            if err.is_expired() {
                return AuthError::Expired;
            }

            AuthError::Rejected {
                reason: err.to_string(),
            }
        })
    }
}

#[async_trait]
impl BearerAuthenticator for JwtAuthenticator {
    #[tracing::instrument(name = "jwt_authenticator", skip_all)]
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.claims(token).await?;

        tracing::trace!(?claims, "Validated");

        Ok(Principal::new(claims.sub))
    }
}

pub mod validation {
    use std::str::FromStr;

    use jsonwebtoken::{
        decode, decode_header,
        jwk::{AlgorithmParameters, JwkSet},
        Algorithm, DecodingKey, Validation,
    };
    use serde::de::DeserializeOwned;

    pub struct JwtValidator;

    impl JwtValidator {
        /// Finds the RSA key matching the token's `kid` and the algorithm it was published for.
        pub fn resolve_key(
            jwt: &str,
            jwks: &JwkSet,
        ) -> Result<(DecodingKey, Algorithm), JwtValidationError> {
            let header = decode_header(jwt).map_err(JwtValidationError::DecodeHeader)?;
            let kid = header.kid.ok_or(JwtValidationError::NoKid)?;

            let jwk = jwks
                .find(&kid)
                .ok_or(JwtValidationError::NoMatchingJWK { kid })?;
            let AlgorithmParameters::RSA(ref rsa) = jwk.algorithm else {
                return Err(JwtValidationError::UnsupportedAlgorithm);
            };

            let decoding_key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(JwtValidationError::DecodingKey)?;

            let key_algorithm = jwk
                .common
                .key_algorithm
                .ok_or(JwtValidationError::KeyAlgorithmNotFound)?;

            let algorithm = Algorithm::from_str(key_algorithm.to_string().as_str())
                .map_err(|err| JwtValidationError::ValidationAlgorithm { key_algorithm, err })?;

            Ok((decoding_key, algorithm))
        }

        pub fn decode<C>(
            jwt: &str,
            key: &DecodingKey,
            validation: &Validation,
        ) -> Result<C, JwtValidationError>
        where
            C: DeserializeOwned,
        {
            let token_data = decode::<C>(jwt, key, validation)?;

            Ok(token_data.claims)
        }
    }

    #[derive(Debug, thiserror::Error)]
    pub enum JwtValidationError {
        #[error("Error decoding header: {0}")]
        DecodeHeader(#[source] jsonwebtoken::errors::Error),
        #[error("Token doesn't have a kid header field")]
        NoKid,
        #[error("No matching JWK found for the given kid: {kid}")]
        NoMatchingJWK { kid: String },
        #[error("JWK algorithm is not supported")]
        UnsupportedAlgorithm,
        #[error("Error creating decoding key: {0}")]
        DecodingKey(#[source] jsonwebtoken::errors::Error),
        #[error("No key algorithm found in JWK")]
        KeyAlgorithmNotFound,
        #[error("Error creating validation algorithm from Key Algorithm: {key_algorithm}, {err}")]
        ValidationAlgorithm {
            key_algorithm: jsonwebtoken::jwk::KeyAlgorithm,
            #[source]
            err: jsonwebtoken::errors::Error,
        },
        #[error("Error validating token: {0}")]
        TokenInvalid(#[from] jsonwebtoken::errors::Error),
    }

    impl JwtValidationError {
        pub fn is_expired(&self) -> bool {
            match self {
                JwtValidationError::TokenInvalid(err) => matches!(
                    err.kind(),
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature
                ),
                _ => false,
            }
        }
    }
}
