use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PaginationInfo;

/// Post entity - one blog entry.
///
/// `body` is the key of the HTML blob held by the content service,
/// not the HTML itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub edited: DateTime<Utc>,
}

/// Fields supplied when creating a post. The backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub body: String,
    pub author: String,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            body: body.into(),
            author: author.into(),
        }
    }

    /// Materialize the post a backend stores for this input.
    pub fn into_post(self, id: i32, now: DateTime<Utc>) -> Post {
        Post {
            id,
            title: self.title,
            description: self.description,
            body: self.body,
            author: self.author,
            created: now,
            edited: now,
        }
    }
}

/// Partial update of a post. An empty `body` keeps the stored body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: String,
    pub description: String,
    pub body: String,
}

impl PostUpdate {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            body: body.into(),
        }
    }

    /// The new body key, or `None` when the stored one must be kept.
    pub fn body_change(&self) -> Option<&str> {
        (!self.body.is_empty()).then_some(self.body.as_str())
    }

    /// Apply this update to `post`, stamping `edited` with `now`.
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(body) = self.body_change() {
            post.body = body.to_string();
        }
        post.title = self.title;
        post.description = self.description;
        post.edited = now;
    }
}

/// One page of posts together with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub pagination: PaginationInfo,
}
