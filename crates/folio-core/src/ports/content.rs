use async_trait::async_trait;

use crate::error::ContentError;

/// Content service - resolves a post's `body` key to its HTML.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Load the HTML stored under `key`.
    async fn get_content(&self, key: &str) -> Result<String, ContentError>;

    /// Store `html` under `key`, replacing any previous blob.
    async fn save_content(&self, key: &str, html: &str) -> Result<(), ContentError>;

    /// Short store name for logs and health output.
    fn store_name(&self) -> &'static str;
}

/// Reject keys that could escape the content root.
///
/// Keys are bare file names: no path separators and no `..`.
pub fn validate_content_key(key: &str) -> Result<(), ContentError> {
    if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
        return Err(ContentError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_names_are_accepted() {
        assert!(validate_content_key("hello-world.html").is_ok());
        assert!(validate_content_key("2024.notes.html").is_ok());
    }

    #[test]
    fn test_traversal_keys_are_rejected() {
        for key in ["", "../secret", "a/b.html", "..", "dir\\file.html", "/etc/passwd"] {
            assert!(
                matches!(validate_content_key(key), Err(ContentError::InvalidKey(_))),
                "{key} should be rejected"
            );
        }
    }
}
