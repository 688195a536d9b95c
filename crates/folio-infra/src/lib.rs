//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`.
//! This crate contains the posts backends, content stores and token verification.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL posts backend via SeaORM
//! - `auth` - JWT verification of admin ID tokens, with published key sets
//! - `redis` - Redis as the document store behind the document posts backend
//! - `s3` - S3-compatible object storage for post content

pub mod content;
pub mod database;
pub mod docstore;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use content::{FilesystemContentService, InMemoryContentService};
pub use docstore::{DocumentError, DocumentPostRepository, DocumentStore, InMemoryDocumentStore};

#[cfg(feature = "auth")]
pub use auth::{FIREBASE_JWKS_URL, JwksSource, JwtConfig, JwtKey, JwtTokenVerifier};

// Re-exports - Database
pub use database::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, connect};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use docstore::{RedisConfig, RedisDocumentStore};

// Re-exports - Object storage
#[cfg(feature = "s3")]
pub use content::{S3ContentConfig, S3ContentService};
