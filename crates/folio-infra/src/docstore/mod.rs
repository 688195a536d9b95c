//! Document-store posts backend.
//!
//! Posts live as JSON documents keyed by their decimal id inside a named
//! collection. The [`DocumentStore`] seam has an in-memory implementation
//! and, with the `redis` feature, a Redis one.

mod memory;
mod repository;
mod store;

#[cfg(feature = "redis")]
mod redis;

pub use memory::InMemoryDocumentStore;
pub use repository::DocumentPostRepository;
pub use store::{DocumentError, DocumentStore};

#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisDocumentStore};
