use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Document store errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("document store connection failed: {0}")]
    Connection(String),

    #[error("document store operation failed: {0}")]
    Operation(String),

    #[error("malformed document: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Keyed JSON document storage grouped into collections.
///
/// Ids are opaque strings; callers decide what they mean.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, `None` when the id is unknown.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, DocumentError>;

    /// Every document of the collection with its id, in no particular order.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, DocumentError>;

    /// Every id of the collection, in no particular order.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, DocumentError>;

    /// Number of documents, answered by the store without a scan.
    async fn count(&self, collection: &str) -> Result<u64, DocumentError>;

    /// Insert a new document. Fails with [`DocumentError::AlreadyExists`]
    /// rather than overwrite.
    async fn create(&self, collection: &str, id: &str, doc: Value) -> Result<(), DocumentError>;

    /// Write a document, overwriting whatever is stored under the id.
    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<(), DocumentError>;

    /// Remove a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DocumentError>;

    /// Short name reported by health checks.
    fn store_name(&self) -> &'static str;
}
