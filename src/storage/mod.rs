//! Object storage for produced media files
//!
//! The relay uploads each produced file once and hands out a presigned GET
//! link to it. The storage backend sits behind the [`ObjectStore`] trait:
//!
//! - [`S3ObjectStore`]: AWS S3 or any S3-compatible store (MinIO, R2, ...)

mod s3;

pub use s3::S3ObjectStore;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream the file at `path` into the store under `key`
    ///
    /// The object is marked for attachment-style delivery.
    async fn upload(&self, key: &str, path: &Path, content_type: &str) -> crate::Result<()>;

    /// Issue a presigned GET URL for `key`, valid for `expires_in`
    async fn presign_get(&self, key: &str, expires_in: Duration) -> crate::Result<String>;

    /// Get the name of this backend for logging
    fn name(&self) -> &'static str;
}

/// Derive the object key for a produced file
///
/// The key is the file name, optionally behind a prefix. A prefix without a
/// trailing slash is used as-is.
pub fn object_key(prefix: Option<&str>, file: &Path) -> Option<String> {
    let name = file.file_name()?.to_string_lossy();
    Some(match prefix {
        Some(prefix) => format!("{prefix}{name}"),
        None => name.into_owned(),
    })
}
