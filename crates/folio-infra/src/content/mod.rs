//! Content stores - where post HTML lives.
//!
//! A post's `body` column holds a key; these services turn the key into
//! HTML and back.

mod filesystem;
mod memory;

#[cfg(feature = "s3")]
mod s3;

pub use filesystem::FilesystemContentService;
pub use memory::InMemoryContentService;

#[cfg(feature = "s3")]
pub use s3::{S3ContentConfig, S3ContentService};
