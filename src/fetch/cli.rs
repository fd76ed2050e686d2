//! CLI-based downloader using an external yt-dlp binary

use super::traits::MediaDownloader;
use crate::config::DownloaderConfig;
use crate::error::DownloadError;
use crate::options::{ArgsHelper, DownloadOptions};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Binary searched on `PATH`; the argument set relies on yt-dlp-only flags
const BINARY_NAME: &str = "yt-dlp";

/// How much of the downloader's stderr is kept in error messages
const STDERR_TAIL: usize = 2000;

/// CLI-based downloader using an external yt-dlp binary
///
/// # Examples
///
/// ```no_run
/// use media_relay::fetch::CliMediaDownloader;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let downloader = CliMediaDownloader::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let downloader = CliMediaDownloader::from_path()
///     .expect("yt-dlp not found in PATH");
/// ```
pub struct CliMediaDownloader {
    binary_path: PathBuf,
    extra_args: Vec<String>,
}

/// The part of `--dump-single-json` output we care about
#[derive(Debug, Deserialize)]
struct MediaInfo {
    title: String,
}

impl CliMediaDownloader {
    /// Create a new CLI downloader with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            extra_args: Vec::new(),
        }
    }

    /// Append `args` to every invocation (before the URL)
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        Self::from_search_path(std::env::var_os("PATH")?)
    }

    /// Look for yt-dlp in a `PATH`-style list of directories
    pub fn from_search_path(paths: impl AsRef<OsStr>) -> Option<Self> {
        let cwd = std::env::current_dir().ok()?;
        which::which_in(BINARY_NAME, Some(paths), cwd)
            .ok()
            .map(Self::new)
    }

    /// Build the downloader from configuration
    ///
    /// An explicit `binary_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    pub fn from_config(config: &DownloaderConfig) -> crate::Result<Self> {
        let downloader = match &config.binary_path {
            Some(path) => Self::new(path.clone()),
            None if config.search_path => Self::from_path().ok_or_else(|| {
                crate::Error::NotSupported(format!("{BINARY_NAME} not found in PATH"))
            })?,
            None => {
                return Err(crate::Error::NotSupported(
                    "no downloader binary configured and PATH search disabled".to_string(),
                ));
            }
        };

        Ok(downloader.with_extra_args(config.extra_args.clone()))
    }

    /// Path of the binary this downloader runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Assemble the full argument list for a download
    ///
    /// The URL always comes last, after `--`, so it is never parsed as an option.
    fn download_args(&self, url: &str, options: &DownloadOptions, workdir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = options.to_args();

        let mut rest = ArgsHelper::new();
        rest.arg("--no-playlist").arg("--no-progress");
        rest.arg("--paths").arg(workdir);
        for extra in &self.extra_args {
            rest.arg(extra.as_str());
        }
        rest.arg("--").arg(url);

        args.extend(Vec::<OsString>::from(rest));
        args
    }

    fn probe_args(&self, url: &str) -> Vec<OsString> {
        let mut args = ArgsHelper::new();
        args.arg("--dump-single-json")
            .arg("--skip-download")
            .arg("--no-playlist");
        for extra in &self.extra_args {
            args.arg(extra.as_str());
        }
        args.arg("--").arg(url);
        args.into()
    }

    async fn run(&self, args: Vec<OsString>) -> crate::Result<Vec<u8>> {
        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!(
                    "Failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            warn!(
                binary = %self.binary_path.display(),
                exit_code = ?output.status.code(),
                %stderr,
                "downloader failed"
            );
            return Err(DownloadError::ToolFailed {
                exit_code: output.status.code(),
                stderr,
            }
            .into());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaDownloader for CliMediaDownloader {
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        workdir: &Path,
    ) -> crate::Result<()> {
        let args = self.download_args(url, options, workdir);
        debug!(binary = %self.binary_path.display(), ?args, "running downloader");

        let stdout = self.run(args).await?;
        debug!(
            output = %String::from_utf8_lossy(&stdout).trim_end(),
            "downloader finished"
        );
        Ok(())
    }

    async fn probe_title(&self, url: &str) -> crate::Result<String> {
        let stdout = self.run(self.probe_args(url)).await?;

        let info: MediaInfo = serde_json::from_slice(&stdout)
            .map_err(|e| DownloadError::InvalidMetadata(e.to_string()))?;
        Ok(info.title)
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}

/// Keep the last [`STDERR_TAIL`] bytes of stderr, on a char boundary
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}
