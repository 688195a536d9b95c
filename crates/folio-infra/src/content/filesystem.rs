use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use folio_core::ContentError;
use folio_core::ports::{ContentService, validate_content_key};

/// Content service reading and writing HTML files under one directory.
pub struct FilesystemContentService {
    root: PathBuf,
}

impl FilesystemContentService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ContentError> {
        validate_content_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ContentService for FilesystemContentService {
    async fn get_content(&self, key: &str) -> Result<String, ContentError> {
        let path = self.path_for(key)?;

        tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ContentError::NotFound(key.to_string()),
            _ => ContentError::Storage(format!("reading {key}: {e}")),
        })
    }

    async fn save_content(&self, key: &str, html: &str) -> Result<(), ContentError> {
        let path = self.path_for(key)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ContentError::Storage(format!("creating content directory: {e}")))?;
        tokio::fs::write(&path, html)
            .await
            .map_err(|e| ContentError::Storage(format!("writing {key}: {e}")))?;

        tracing::debug!(key, bytes = html.len(), "Saved post content");
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "local"
    }
}
