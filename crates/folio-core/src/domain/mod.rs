//! Domain entities - the core business objects.

mod pagination;
mod post;

pub use pagination::{POSTS_PER_PAGE, PaginationInfo};
pub use post::{NewPost, Post, PostPage, PostUpdate};
