//! Domain-level error types.

use thiserror::Error;

/// Repository-level errors.
///
/// `NotFound` is kept apart from `Backend` so callers can answer
/// "not found" instead of reporting a server failure.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("post with id {0} not found")]
    NotFound(i32),

    #[error("error {operation}{}: {message}", target(.id))]
    Backend {
        operation: &'static str,
        id: Option<i32>,
        message: String,
    },
}

impl RepoError {
    /// Wrap a lower-level failure of `operation`.
    pub fn backend(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            operation,
            id: None,
            message: err.to_string(),
        }
    }

    /// Wrap a lower-level failure of `operation` on post `id`.
    pub fn backend_for(operation: &'static str, id: i32, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            operation,
            id: Some(id),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn target(id: &Option<i32>) -> String {
    id.map(|id| format!(" (post {id})")).unwrap_or_default()
}

/// Content store errors.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("post content not found: {0}")]
    NotFound(String),

    #[error("invalid content key: {0}")]
    InvalidKey(String),

    #[error("content storage failure: {0}")]
    Storage(String),
}
