//! Fetching and refreshing a published JWK set.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use tokio::task::JoinHandle;

use folio_core::ports::AuthError;

use super::jwt::JwtTokenVerifier;

/// Google's published signing keys for Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// HTTP source of a JWK set.
#[derive(Clone)]
pub struct JwksSource {
    url: String,
    client: reqwest::Client,
}

impl JwksSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the current key set.
    pub async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let fetch_err = |e: reqwest::Error| {
            AuthError::Misconfigured(format!("failed to fetch key set from {}: {e}", self.url))
        };

        self.client
            .get(&self.url)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?
            .json::<JwkSet>()
            .await
            .map_err(fetch_err)
    }

    /// Periodically refetch the key set into `verifier`.
    ///
    /// Failed refreshes are logged and the previous keys stay in use.
    pub fn spawn_refresh(self, verifier: Arc<JwtTokenVerifier>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick fires immediately; the caller already loaded the set.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let refreshed = match self.fetch().await {
                    Ok(set) => verifier.replace_key_set(&set),
                    Err(e) => Err(e),
                };

                match refreshed {
                    Ok(keys) => tracing::debug!(url = %self.url, keys, "Refreshed token signing keys"),
                    Err(e) => tracing::warn!(url = %self.url, error = %e, "Keeping previous token signing keys"),
                }
            }
        })
    }
}
