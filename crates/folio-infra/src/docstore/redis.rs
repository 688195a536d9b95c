//! Redis document store.
//!
//! Each document is a JSON string at `<collection>:<id>`; the set
//! `<collection>:ids` indexes the collection so listing and counting never
//! need a keyspace scan.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use serde_json::Value;

use super::store::{DocumentError, DocumentStore};

/// Writes the document only if absent and indexes it in the same step.
const CREATE_SCRIPT: &str = r#"
if redis.call('SET', KEYS[1], ARGV[1], 'NX') then
    redis.call('SADD', KEYS[2], ARGV[2])
    return 1
end
return 0
"#;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

/// Redis-backed document store.
///
/// Uses connection manager for automatic reconnection.
pub struct RedisDocumentStore {
    conn: ConnectionManager,
    create_script: Script,
}

impl RedisDocumentStore {
    pub async fn new(config: &RedisConfig) -> Result<Self, DocumentError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DocumentError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| DocumentError::Connection("Connection timed out".to_string()))?
            .map_err(|e| DocumentError::Connection(e.to_string()))?;

        tracing::info!("Connected to Redis document store");

        Ok(Self {
            conn,
            create_script: Script::new(CREATE_SCRIPT),
        })
    }

    fn doc_key(collection: &str, id: &str) -> String {
        format!("{collection}:{id}")
    }

    fn index_key(collection: &str) -> String {
        format!("{collection}:ids")
    }
}

fn op_err(err: redis::RedisError) -> DocumentError {
    DocumentError::Operation(err.to_string())
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, DocumentError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::doc_key(collection, id))
            .await
            .map_err(op_err)?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, DocumentError> {
        let ids = self.list_ids(collection).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| Self::doc_key(collection, id)).collect();
        let mut conn = self.conn.clone();
        let raw: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(op_err)?;

        let mut docs = Vec::with_capacity(ids.len());
        for (id, json) in ids.into_iter().zip(raw) {
            match json {
                Some(json) => docs.push((id, serde_json::from_str(&json)?)),
                // Indexed but gone: deleted between SMEMBERS and MGET.
                None => tracing::warn!(collection, id = %id, "Indexed document is missing"),
            }
        }

        Ok(docs)
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, DocumentError> {
        let mut conn = self.conn.clone();
        conn.smembers::<_, Vec<String>>(Self::index_key(collection))
            .await
            .map_err(op_err)
    }

    async fn count(&self, collection: &str) -> Result<u64, DocumentError> {
        let mut conn = self.conn.clone();
        conn.scard::<_, u64>(Self::index_key(collection))
            .await
            .map_err(op_err)
    }

    async fn create(&self, collection: &str, id: &str, doc: Value) -> Result<(), DocumentError> {
        let json = serde_json::to_string(&doc)?;
        let mut conn = self.conn.clone();

        let created: i64 = self
            .create_script
            .key(Self::doc_key(collection, id))
            .key(Self::index_key(collection))
            .arg(json)
            .arg(id)
            .invoke_async(&mut conn)
            .await
            .map_err(op_err)?;

        if created == 0 {
            return Err(DocumentError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<(), DocumentError> {
        let json = serde_json::to_string(&doc)?;
        let mut conn = self.conn.clone();

        let _: () = redis::pipe()
            .atomic()
            .set(Self::doc_key(collection, id), json)
            .ignore()
            .sadd(Self::index_key(collection), id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(op_err)?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DocumentError> {
        let mut conn = self.conn.clone();

        let (deleted, _unindexed): (u64, u64) = redis::pipe()
            .atomic()
            .del(Self::doc_key(collection, id))
            .srem(Self::index_key(collection), id)
            .query_async(&mut conn)
            .await
            .map_err(op_err)?;

        Ok(deleted > 0)
    }

    fn store_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn get_test_store() -> Option<RedisDocumentStore> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
        };

        RedisDocumentStore::new(&config).await.ok()
    }

    fn test_collection(name: &str) -> String {
        format!(
            "test_{name}_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        )
    }

    #[tokio::test]
    async fn test_redis_create_list_count() {
        let Some(store) = get_test_store().await else {
            tracing::warn!("Redis not available, skipping test");
            return;
        };
        let collection = test_collection("list");

        store.create(&collection, "1", json!({"title": "A"})).await.unwrap();
        store.create(&collection, "2", json!({"title": "B"})).await.unwrap();

        assert_eq!(store.count(&collection).await.unwrap(), 2);
        let mut docs = store.list(&collection).await.unwrap();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(docs[0].1["title"], "A");
        assert_eq!(docs[1].1["title"], "B");

        store.delete(&collection, "1").await.unwrap();
        store.delete(&collection, "2").await.unwrap();
        assert_eq!(store.count(&collection).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_redis_create_refuses_to_overwrite() {
        let Some(store) = get_test_store().await else {
            tracing::warn!("Redis not available, skipping test");
            return;
        };
        let collection = test_collection("nx");

        store.create(&collection, "1", json!({"title": "A"})).await.unwrap();
        let err = store
            .create(&collection, "1", json!({"title": "B"}))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::AlreadyExists { .. }));
        assert_eq!(store.list_ids(&collection).await.unwrap(), vec!["1".to_string()]);

        store.replace(&collection, "1", json!({"title": "C"})).await.unwrap();
        let doc = store.get(&collection, "1").await.unwrap().unwrap();
        assert_eq!(doc["title"], "C");

        assert!(store.delete(&collection, "1").await.unwrap());
        assert!(!store.delete(&collection, "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_redis_create_indexes_document_atomically() {
        let Some(store) = get_test_store().await else {
            tracing::warn!("Redis not available, skipping test");
            return;
        };
        let collection = test_collection("index");

        store.create(&collection, "7", json!({"title": "A"})).await.unwrap();

        // Document and index entry land together; a failed create adds neither.
        assert_eq!(store.list_ids(&collection).await.unwrap(), vec!["7".to_string()]);
        assert_eq!(store.count(&collection).await.unwrap(), 1);

        let mut conn = store.conn.clone();
        let _: () = conn.set(RedisDocumentStore::doc_key(&collection, "8"), "{}").await.unwrap();
        assert!(store.create(&collection, "8", json!({"title": "B"})).await.is_err());
        assert_eq!(store.count(&collection).await.unwrap(), 1);

        let _: () = conn.del(RedisDocumentStore::doc_key(&collection, "8")).await.unwrap();
        store.delete(&collection, "7").await.unwrap();
    }
}
