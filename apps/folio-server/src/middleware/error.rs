//! Error handling - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use folio_core::{ContentError, RepoError};
use folio_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timed out {0}")]
    Timeout(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Timeout(operation) => {
                tracing::warn!(operation, "Storage call timed out");
                ErrorResponse::gateway_timeout(format!("Timed out {operation}"))
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => AppError::NotFound(err.to_string()),
            RepoError::Backend { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(key) => {
                tracing::warn!(key = %key, "Post content missing");
                AppError::NotFound("Post content not available".to_string())
            }
            ContentError::InvalidKey(_) => AppError::BadRequest(err.to_string()),
            ContentError::Storage(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_errors_map_to_status() {
        let not_found: AppError = RepoError::NotFound(4).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let backend: AppError = RepoError::backend("getting posts", "boom").into();
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_content_errors_map_to_status() {
        let missing: AppError = ContentError::NotFound("a.html".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "Not found: Post content not available");

        let invalid: AppError = ContentError::InvalidKey("../a".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_is_gateway_timeout() {
        assert_eq!(
            AppError::Timeout("getting posts").status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
