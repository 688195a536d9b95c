//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod content;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenVerifier};
pub use content::{ContentService, validate_content_key};
pub use repository::PostRepository;
