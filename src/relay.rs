//! The download-and-deliver pipeline
//!
//! [`Relay::deliver`] runs one request end to end:
//!
//! 1. optionally probe the media title
//! 2. select downloader options
//! 3. create a fresh workspace
//! 4. run the downloader into it
//! 5. discover the single produced file
//! 6. upload it
//! 7. presign a GET link (only after the upload succeeded)
//! 8. remove the workspace
//!
//! The workspace is removed on every exit path. A failure to remove it is
//! logged and does not affect the outcome.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{CliMediaDownloader, MediaDownloader};
use crate::options::OptionPolicy;
use crate::storage::{ObjectStore, S3ObjectStore, object_key};
use crate::types::{DeliveryRecord, DownloadRequest};
use crate::workspace::Workspace;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Download-and-deliver handler
///
/// Built once at startup and shared read-only by all requests.
pub struct Relay {
    downloader: Arc<dyn MediaDownloader>,
    store: Arc<dyn ObjectStore>,
    policy: OptionPolicy,
    temp_root: PathBuf,
    key_prefix: Option<String>,
    link_expiry: Duration,
    probe_title: bool,
}

impl Relay {
    /// Create a relay from explicit collaborators
    pub fn new(
        config: &Config,
        downloader: Arc<dyn MediaDownloader>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            downloader,
            store,
            policy: OptionPolicy::from_config(&config.downloader),
            temp_root: config.downloader.temp_dir.clone(),
            key_prefix: config.storage.key_prefix.clone(),
            link_expiry: config.storage.link_expiry,
            probe_title: config.downloader.probe_title,
        }
    }

    /// Create a relay backed by the yt-dlp CLI and S3
    pub fn from_config(config: &Config) -> Result<Self> {
        let downloader = CliMediaDownloader::from_config(&config.downloader)?;
        info!(
            binary = %downloader.binary_path().display(),
            "using external downloader"
        );
        let store = S3ObjectStore::new(&config.storage);

        Ok(Self::new(config, Arc::new(downloader), Arc::new(store)))
    }

    /// Name of the downloader in use
    pub fn downloader_name(&self) -> &'static str {
        self.downloader.name()
    }

    /// Name of the storage backend in use
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Download, upload and sign one request
    pub async fn deliver(&self, request: &DownloadRequest) -> Result<DeliveryRecord> {
        let title = if self.probe_title {
            Some(self.downloader.probe_title(&request.url).await?)
        } else {
            None
        };

        let workspace = Workspace::create(&self.temp_root).await?;
        let outcome = self.deliver_in(&workspace, request).await;

        let workdir = workspace.path().to_path_buf();
        if let Err(e) = workspace.cleanup().await {
            warn!(workdir = %workdir.display(), error = %e, "failed to remove workspace");
        }

        let (key, download_link, issued_at) = outcome?;
        let expires_at = issued_at + chrono::Duration::seconds(self.link_expiry.as_secs() as i64);

        Ok(DeliveryRecord {
            download_link,
            key,
            issued_at,
            expires_at,
            title,
        })
    }

    async fn deliver_in(
        &self,
        workspace: &Workspace,
        request: &DownloadRequest,
    ) -> Result<(String, String, chrono::DateTime<Utc>)> {
        let options = self
            .policy
            .select(request.format, request.watermark, &request.url);
        debug!(?options, workdir = %workspace.path().display(), "selected download options");

        info!(url = %request.url, format = %request.format, "starting download");
        self.downloader
            .download(&request.url, &options, workspace.path())
            .await?;

        let produced = workspace.discover_output().await?;
        let key = object_key(self.key_prefix.as_deref(), &produced).ok_or_else(|| {
            Error::Other(format!("produced file {} has no name", produced.display()))
        })?;

        self.store
            .upload(&key, &produced, request.format.content_type())
            .await?;

        let issued_at = Utc::now();
        let download_link = self.store.presign_get(&key, self.link_expiry).await?;
        info!(key = %key, "issued download link");

        Ok((key, download_link, issued_at))
    }
}
