//! Request-scoped temporary workspaces
//!
//! Every delivery gets its own freshly created directory under the configured
//! temp root. The directory is owned by a [`Workspace`] and is removed when the
//! workspace is cleaned up or dropped, so concurrent requests never see each
//! other's files and nothing is left behind on error paths.

use crate::error::{DownloadError, Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const PREFIX: &str = "media-relay-";

/// An exclusively owned temporary directory for one request
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a new uniquely named workspace under `root`
    ///
    /// `root` is created if it does not exist yet.
    pub async fn create(root: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir_in(root)?;
        debug!(workdir = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    /// Path of the workspace directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Find the single file the downloader produced
    ///
    /// Fails with [`DownloadError::EmptyOutput`] when there is no file and with
    /// [`DownloadError::AmbiguousOutput`] when there is more than one.
    /// Subdirectories are ignored.
    pub async fn discover_output(&self) -> Result<PathBuf> {
        let mut entries = tokio::fs::read_dir(self.path()).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }

        match files.len() {
            0 => Err(DownloadError::EmptyOutput {
                workdir: self.path().to_path_buf(),
            }
            .into()),
            1 => Ok(files.remove(0)),
            _ => {
                let mut names: Vec<String> = files
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();
                names.sort();
                Err(DownloadError::AmbiguousOutput {
                    workdir: self.path().to_path_buf(),
                    files: names,
                }
                .into())
            }
        }
    }

    /// Delete the workspace and everything in it
    ///
    /// The recursive removal runs on the blocking pool.
    pub async fn cleanup(self) -> Result<()> {
        let path = self.path().to_path_buf();
        tokio::task::spawn_blocking(move || self.dir.close())
            .await
            .map_err(|e| Error::Other(format!("workspace cleanup task failed: {e}")))??;
        debug!(workdir = %path.display(), "removed workspace");
        Ok(())
    }
}
