//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One post as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Content key of the post's HTML.
    pub body: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub edited: DateTime<Utc>,
}

/// A post together with its resolved HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithContentResponse {
    pub post: PostResponse,
    pub content: String,
}

/// Page navigation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_page: u64,
    pub prev_page: u64,
}

/// One page of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsPageResponse {
    pub posts: Vec<PostResponse>,
    pub pagination: PaginationResponse,
}

/// Query string of the public listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Raw so that malformed values can be redirected instead of rejected.
    pub page: Option<String>,
}

/// Request to edit an existing post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// New content key; empty keeps the current one.
    #[serde(default)]
    pub body: String,
}

/// Request to upload post HTML and create or update the post pointing at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPostRequest {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub filename: String,
    pub html: String,
    /// Existing post to update instead of creating a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i32>,
}

/// Identity of a verified admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub posts_backend: String,
    pub content_store: String,
}
