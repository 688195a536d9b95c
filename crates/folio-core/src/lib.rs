//! # Folio Core
//!
//! The domain layer of the Folio blog backend.
//! Posts, pagination math and the ports that storage, content and auth
//! adapters implement. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;

pub use domain::{NewPost, POSTS_PER_PAGE, PaginationInfo, Post, PostPage, PostUpdate};
pub use error::{ContentError, RepoError};
