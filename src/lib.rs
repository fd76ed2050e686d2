//! # media-relay
//!
//! Download media from a URL with yt-dlp, store the result in S3 and hand
//! back a time-limited download link.
//!
//! A request names a media URL and an output format (`mp4` or `mp3`). The
//! service runs the downloader into a fresh per-request workspace, uploads
//! the single file it produced, presigns a GET link valid for one hour and
//! removes the workspace whatever the outcome.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_relay::{Config, relay::Relay};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::from_env()?);
//!     let relay = Arc::new(Relay::from_config(&config)?);
//!
//!     media_relay::api::start_api_server(relay, config, media_relay::shutdown_signal()).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// External downloader invocation
pub mod fetch;
/// Download option selection
pub mod options;
/// The download-and-deliver pipeline
pub mod relay;
/// Object storage
pub mod storage;
/// Request and response types
pub mod types;
/// Per-request temporary workspaces
pub mod workspace;

// Re-export commonly used types
pub use config::Config;
pub use error::{
    ApiError, DownloadError, Error, Result, StorageError, ToHttpStatus, ValidationError,
};
pub use fetch::{CliMediaDownloader, MediaDownloader};
pub use relay::Relay;
pub use storage::{ObjectStore, S3ObjectStore};
pub use types::{DeliveryRecord, DownloadRequest, DownloadResponse, MediaFormat};

/// Resolve when the process is asked to stop
///
/// Waits for SIGTERM (container stop) or Ctrl+C on Unix, and for Ctrl+C
/// elsewhere. Pass it to [`api::start_api_server`] to drain in-flight requests
/// before exiting.
pub async fn shutdown_signal() {
    let received = wait_for_signal().await;
    tracing::info!(signal = received, "shutting down");
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = interrupted() => "SIGINT",
        },
        Err(e) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for Ctrl+C only");
            interrupted().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    interrupted().await;
    "Ctrl+C"
}

/// Ctrl+C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
