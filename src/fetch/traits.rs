//! Trait for external media downloaders

use crate::options::DownloadOptions;
use async_trait::async_trait;
use std::path::Path;

/// Trait for invoking a media downloader
///
/// A call is blocking from the caller's point of view: it resolves only once
/// the downloader has exited. There is no retry and no timeout.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download `url` into `workdir` using `options`
    ///
    /// On success the downloader is expected to have written exactly one media
    /// file into `workdir`; the caller verifies that.
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        workdir: &Path,
    ) -> crate::Result<()>;

    /// Look up the media title without downloading anything
    async fn probe_title(&self, url: &str) -> crate::Result<String>;

    /// Get the name of this downloader for logging
    fn name(&self) -> &'static str;
}
