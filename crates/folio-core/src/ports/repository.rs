use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostPage, PostUpdate};
use crate::error::RepoError;

/// Post repository - the storage contract every posts backend satisfies.
///
/// Calls never retry and never swallow a store failure. Each call may
/// suspend on network I/O with no internal timeout; callers own timeout
/// and cancellation by bounding or dropping the returned future.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch one post, or `RepoError::NotFound`.
    async fn get_post(&self, id: i32) -> Result<Post, RepoError>;

    /// All posts, newest `created` first.
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError>;

    /// One page of posts, newest first. Out-of-range pages are clamped,
    /// so a page past the end yields the last page.
    async fn list_posts_paginated(&self, page: i64) -> Result<PostPage, RepoError>;

    /// Total number of stored posts.
    async fn count_posts(&self) -> Result<u64, RepoError>;

    /// Persist a new post. The backend assigns the id and sets
    /// `created == edited`.
    async fn create_post(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite title and description, and body unless it is empty.
    /// Refreshes `edited`.
    async fn update_post(&self, id: i32, update: PostUpdate) -> Result<(), RepoError>;

    /// Permanently remove a post.
    async fn delete_post(&self, id: i32) -> Result<(), RepoError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
