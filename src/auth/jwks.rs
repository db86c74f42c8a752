use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use tokio::sync::{RwLock, RwLockReadGuard};

#[derive(Debug, thiserror::Error)]
pub enum JwkError {
    #[error("Failed to fetch Jwk from the Jwks URI: {0}")]
    Fetch(#[source] reqwest::Error),
    #[error("Failed to parse Jwk from the Jwks URI: {0}")]
    Parse(#[source] reqwest::Error),
}

/// Caches a remote [`JwkSet`] and refetches it once it is older than the time to live.
pub struct JwkRefresher {
    time_to_live_in_seconds: u64,
    jwks_uri: String,
    http_client: reqwest::Client,
    holder: RwLock<JwkHolder>,
}

impl JwkRefresher {
    #[tracing::instrument(skip_all)]
    async fn obtain_jwks(
        jwks_uri: &str,
        http_client: &reqwest::Client,
    ) -> Result<JwkSet, JwkError> {
        tracing::debug!(%jwks_uri, "Obtaining Jwks");

        let jwks = http_client
            .get(jwks_uri)
            .send()
            .await
            .map_err(JwkError::Fetch)?
            .error_for_status()
            .map_err(JwkError::Fetch)?
            .json::<JwkSet>()
            .await
            .map_err(JwkError::Parse)?;

        Ok(jwks)
    }

    pub async fn new(
        time_to_live_in_seconds: u64,
        jwks_uri: String,
        http_client: reqwest::Client,
    ) -> Result<Self, JwkError> {
        let jwks = Self::obtain_jwks(&jwks_uri, &http_client).await?;

        Ok(Self::from_jwks(
            time_to_live_in_seconds,
            jwks_uri,
            http_client,
            jwks,
        ))
    }

    /// Creates a refresher from an already obtained [`JwkSet`].
    pub fn from_jwks(
        time_to_live_in_seconds: u64,
        jwks_uri: String,
        http_client: reqwest::Client,
        jwks: JwkSet,
    ) -> Self {
        Self {
            time_to_live_in_seconds,
            jwks_uri,
            http_client,
            holder: RwLock::new(JwkHolder {
                last_updated: Instant::now(),
                jwks,
            }),
        }
    }

    fn is_stale(&self, last_updated: Instant) -> bool {
        last_updated.elapsed() >= Duration::from_secs(self.time_to_live_in_seconds)
    }

    /// Refetches the [`JwkSet`] while holding the write lock.
    ///
    /// Requests queued behind the lock find the holder fresh and skip the fetch.
    #[tracing::instrument(skip_all)]
    async fn refresh_jwks(&self) -> Result<(), JwkError> {
        let mut inner = self.holder.write().await;

        if !self.is_stale(inner.last_updated) {
            tracing::trace!("Jwks already refreshed");

            return Ok(());
        }

        tracing::debug!("Refreshing Jwks");

        inner.jwks = Self::obtain_jwks(&self.jwks_uri, &self.http_client).await?;
        inner.last_updated = Instant::now();

        Ok(())
    }

    /// Returns the cached [`JwkSet`], refreshing it first if it is stale.
    #[tracing::instrument(skip_all)]
    pub async fn jwks(&self) -> Result<RwLockReadGuard<'_, JwkHolder>, JwkError> {
        let last_updated = self.holder.read().await.last_updated;

        if self.is_stale(last_updated) {
            self.refresh_jwks().await?;
        }

        Ok(self.holder.read().await)
    }
}

pub struct JwkHolder {
    last_updated: Instant,
    jwks: JwkSet,
}

impl AsRef<JwkSet> for JwkHolder {
    fn as_ref(&self) -> &JwkSet {
        &self.jwks
    }
}
