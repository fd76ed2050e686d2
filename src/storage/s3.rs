//! S3 storage backend
//!
//! Uploads produced media files to an S3 bucket and presigns GET links for
//! them. Works against AWS and S3-compatible endpoints.

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::StorageError;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// S3 storage backend
///
/// The client is built once from [`StorageConfig`] with static credentials
/// and retries disabled, and is shared read-only by all requests.
///
/// # Example
/// ```no_run
/// use media_relay::config::StorageConfig;
/// use media_relay::storage::{ObjectStore, S3ObjectStore};
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example(config: StorageConfig) -> media_relay::Result<()> {
/// let store = S3ObjectStore::new(&config);
/// store.upload("clip.mp4", Path::new("/tmp/clip.mp4"), "video/mp4").await?;
/// let link = store.presign_get("clip.mp4", Duration::from_secs(3600)).await?;
/// # Ok(())
/// # }
/// ```
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build the S3 client from storage configuration
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "media-relay",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .force_path_style(config.force_path_style);

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint.clone());
        }

        debug!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "configured S3 client"
        );

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }

    /// Bucket the store writes to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, key: &str, path: &Path, content_type: &str) -> crate::Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                message: format!("cannot read {}: {}", path.display(), e),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .content_disposition("attachment")
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!(bucket = %self.bucket, key, "uploaded object");
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> crate::Result<String> {
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::PresignFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::PresignFailed {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(request.uri().to_string())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
