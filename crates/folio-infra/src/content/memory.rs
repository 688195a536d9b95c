use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use folio_core::ContentError;
use folio_core::ports::{ContentService, validate_content_key};

/// Map-backed content service for tests and local development.
#[derive(Default)]
pub struct InMemoryContentService {
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemoryContentService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentService for InMemoryContentService {
    async fn get_content(&self, key: &str) -> Result<String, ContentError> {
        validate_content_key(key)?;
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(key.to_string()))
    }

    async fn save_content(&self, key: &str, html: &str) -> Result<(), ContentError> {
        validate_content_key(key)?;
        self.blobs
            .write()
            .await
            .insert(key.to_string(), html.to_string());
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
