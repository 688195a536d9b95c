//! Application state - shared across all handlers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use folio_core::ports::{AuthError, ContentService, PostRepository, TokenVerifier};
use folio_infra::{
    DocumentPostRepository, FilesystemContentService, InMemoryContentService, InMemoryDocumentStore,
};

use crate::config::{AppConfig, ContentStore, PostsBackend};
use crate::middleware::error::{AppError, AppResult};

/// Failures while wiring backends at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{0} support is not compiled in; rebuild with the `{0}` feature")]
    FeatureDisabled(&'static str),

    #[error("{0} is required for the selected backend")]
    MissingSetting(&'static str),

    #[error("failed to connect posts backend: {0}")]
    Backend(String),

    #[error("failed to configure token verification: {0}")]
    Auth(#[from] AuthError),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub content: Arc<dyn ContentService>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub repository_timeout: Duration,
}

impl AppState {
    /// Assemble state from already-built parts.
    pub fn from_parts(
        posts: Arc<dyn PostRepository>,
        content: Arc<dyn ContentService>,
        verifier: Arc<dyn TokenVerifier>,
        repository_timeout: Duration,
    ) -> Self {
        Self {
            posts,
            content,
            verifier,
            repository_timeout,
        }
    }

    /// Build the application state with the configured implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let posts: Arc<dyn PostRepository> = match config.posts_backend {
            PostsBackend::Postgres => postgres_posts(config).await?,
            PostsBackend::Redis => redis_posts(config).await?,
            PostsBackend::Memory => {
                tracing::warn!("Using in-memory posts backend; posts are lost on restart");
                Arc::new(DocumentPostRepository::with_collection(
                    InMemoryDocumentStore::new(),
                    config.posts_collection.clone(),
                ))
            }
        };

        let content: Arc<dyn ContentService> = match config.content_store {
            ContentStore::Local => Arc::new(FilesystemContentService::new(&config.posts_directory)),
            ContentStore::S3 => s3_content(config).await?,
            ContentStore::Memory => Arc::new(InMemoryContentService::new()),
        };

        let verifier = token_verifier(config).await?;

        tracing::info!(
            posts_backend = posts.backend_name(),
            content_store = content.store_name(),
            "Application state initialized"
        );

        Ok(Self::from_parts(
            posts,
            content,
            verifier,
            config.repository_timeout,
        ))
    }

    /// Run a storage call under the configured timeout.
    ///
    /// Elapsing drops the call's future, which cancels it.
    pub async fn bounded<T, E>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, E>>,
    ) -> AppResult<T>
    where
        E: Into<AppError>,
    {
        tokio::time::timeout(self.repository_timeout, call)
            .await
            .map_err(|_| AppError::Timeout(operation))?
            .map_err(Into::into)
    }
}

#[cfg(feature = "postgres")]
async fn postgres_posts(config: &AppConfig) -> Result<Arc<dyn PostRepository>, StartupError> {
    let db_config = config
        .database
        .as_ref()
        .ok_or(StartupError::MissingSetting("DATABASE_URL"))?;

    let db = folio_infra::connect(db_config)
        .await
        .map_err(|e| StartupError::Backend(e.to_string()))?;

    Ok(Arc::new(folio_infra::PostgresPostRepository::new(db)))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_posts(_config: &AppConfig) -> Result<Arc<dyn PostRepository>, StartupError> {
    Err(StartupError::FeatureDisabled("postgres"))
}

#[cfg(feature = "redis")]
async fn redis_posts(config: &AppConfig) -> Result<Arc<dyn PostRepository>, StartupError> {
    use folio_infra::{RedisConfig, RedisDocumentStore};

    let store = RedisDocumentStore::new(&RedisConfig::from_env())
        .await
        .map_err(|e| StartupError::Backend(e.to_string()))?;

    Ok(Arc::new(DocumentPostRepository::with_collection(
        store,
        config.posts_collection.clone(),
    )))
}

#[cfg(not(feature = "redis"))]
async fn redis_posts(_config: &AppConfig) -> Result<Arc<dyn PostRepository>, StartupError> {
    Err(StartupError::FeatureDisabled("redis"))
}

#[cfg(feature = "s3")]
async fn s3_content(config: &AppConfig) -> Result<Arc<dyn ContentService>, StartupError> {
    use folio_infra::{S3ContentConfig, S3ContentService};

    let settings = config
        .s3
        .as_ref()
        .ok_or(StartupError::MissingSetting("S3_BUCKET"))?;

    let s3_config = S3ContentConfig {
        bucket: settings.bucket.clone(),
        prefix: settings.prefix.clone(),
        region: settings.region.clone(),
        endpoint: settings.endpoint.clone(),
    };

    Ok(Arc::new(S3ContentService::new(s3_config).await))
}

#[cfg(not(feature = "s3"))]
async fn s3_content(_config: &AppConfig) -> Result<Arc<dyn ContentService>, StartupError> {
    Err(StartupError::FeatureDisabled("s3"))
}

#[cfg(feature = "auth")]
async fn token_verifier(config: &AppConfig) -> Result<Arc<dyn TokenVerifier>, StartupError> {
    use crate::config::TokenKey;
    use folio_infra::{FIREBASE_JWKS_URL, JwksSource, JwtConfig, JwtKey, JwtTokenVerifier};

    let (key, refresh) = match &config.token_key {
        TokenKey::Secret(secret) => (JwtKey::Secret(secret.clone()), None),
        TokenKey::PublicKeyPem(pem) => (JwtKey::RsaPem(pem.clone()), None),
        TokenKey::KeySet { url, refresh } => {
            let source = JwksSource::new(url.as_deref().unwrap_or(FIREBASE_JWKS_URL));
            let set = source.fetch().await?;
            tracing::info!(url = source.url(), keys = set.keys.len(), "Loaded token signing keys");
            (JwtKey::KeySet(set), Some((source, *refresh)))
        }
    };

    let verifier = Arc::new(JwtTokenVerifier::new(JwtConfig {
        project_id: config.project_id.clone(),
        key,
    })?);

    if let Some((source, every)) = refresh {
        source.spawn_refresh(verifier.clone(), every);
    }

    let verifier: Arc<dyn TokenVerifier> = verifier;
    Ok(verifier)
}

#[cfg(not(feature = "auth"))]
async fn token_verifier(_config: &AppConfig) -> Result<Arc<dyn TokenVerifier>, StartupError> {
    tracing::warn!("Built without the auth feature; admin routes will reject every request");
    Ok(Arc::new(RejectAllVerifier))
}

/// Verifier used when token verification is not compiled in.
#[cfg(any(test, not(feature = "auth")))]
pub struct RejectAllVerifier;

#[cfg(any(test, not(feature = "auth")))]
impl TokenVerifier for RejectAllVerifier {
    fn verify(&self, _token: &str) -> Result<folio_core::ports::TokenClaims, AuthError> {
        Err(AuthError::Misconfigured(
            "token verification is disabled in this build".to_string(),
        ))
    }
}
