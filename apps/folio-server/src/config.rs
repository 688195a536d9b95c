//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use folio_infra::DatabaseConfig;

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Which posts backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostsBackend {
    Postgres,
    Redis,
    Memory,
}

impl FromStr for PostsBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Where post HTML is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStore {
    Local,
    S3,
    Memory,
}

impl FromStr for ContentStore {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "filesystem" => Ok(Self::Local),
            "s3" | "gcs" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Object storage settings, used when `CONTENT_STORE=s3`.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub prefix: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

/// Signature key for admin ID tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKey {
    Secret(String),
    PublicKeyPem(String),
    /// Published key set, refetched every `refresh`. `None` means the
    /// identity provider's default endpoint.
    KeySet {
        url: Option<String>,
        refresh: Duration,
    },
}

impl TokenKey {
    fn from_env() -> Result<Self, ConfigError> {
        if let Ok(pem) = env::var("AUTH_JWT_PUBLIC_KEY_PEM") {
            return Ok(Self::PublicKeyPem(pem));
        }
        if let Ok(secret) = env::var("AUTH_JWT_SECRET") {
            return Ok(Self::Secret(secret));
        }

        Ok(Self::KeySet {
            url: env::var("AUTH_JWKS_URL").ok(),
            refresh: Duration::from_secs(parsed("AUTH_JWKS_REFRESH_SECS", 3600)?),
        })
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub repository_timeout: Duration,
    pub posts_backend: PostsBackend,
    pub database: Option<DatabaseConfig>,
    pub posts_collection: String,
    pub content_store: ContentStore,
    pub posts_directory: String,
    pub s3: Option<S3Settings>,
    pub project_id: String,
    pub token_key: TokenKey,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let posts_backend = parsed("POSTS_BACKEND", PostsBackend::Postgres)?;
        let content_store = parsed("CONTENT_STORE", ContentStore::Local)?;

        let database = match env::var("DATABASE_URL").ok() {
            Some(url) => {
                let mut db = DatabaseConfig::new(url);
                db.max_connections = parsed("DB_MAX_CONNECTIONS", db.max_connections)?;
                db.min_connections = parsed("DB_MIN_CONNECTIONS", db.min_connections)?;
                Some(db)
            }
            None if posts_backend == PostsBackend::Postgres => {
                return Err(ConfigError::Missing("DATABASE_URL"));
            }
            None => None,
        };

        let s3 = match env::var("S3_BUCKET").ok() {
            Some(bucket) => Some(S3Settings {
                bucket,
                prefix: env::var("S3_PREFIX").unwrap_or_default(),
                region: env::var("S3_REGION").ok(),
                endpoint: env::var("S3_ENDPOINT").ok(),
            }),
            None if content_store == ContentStore::S3 => {
                return Err(ConfigError::Missing("S3_BUCKET"));
            }
            None => None,
        };

        let token_key = TokenKey::from_env()?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080)?,
            repository_timeout: Duration::from_secs(parsed("REPOSITORY_TIMEOUT_SECS", 10)?),
            posts_backend,
            database,
            posts_collection: env::var("POSTS_COLLECTION").unwrap_or_else(|_| "posts".to_string()),
            content_store,
            posts_directory: env::var("POSTS_DIRECTORY").unwrap_or_else(|_| "posts".to_string()),
            s3,
            project_id: env::var("PROJECT_ID").map_err(|_| ConfigError::Missing("PROJECT_ID"))?,
            token_key,
        })
    }
}

/// Read `var`, falling back to `default` when unset and failing when unparsable.
fn parsed<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
