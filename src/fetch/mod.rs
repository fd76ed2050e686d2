//! External media downloader invocation
//!
//! The relay never fetches or transcodes media itself. It hands the source URL
//! and the selected [`DownloadOptions`](crate::options::DownloadOptions) to an
//! implementation of [`MediaDownloader`], which leaves the produced file in the
//! request workspace.
//!
//! - [`CliMediaDownloader`]: runs an external `yt-dlp` binary
//!
//! ## Usage
//!
//! ```no_run
//! use media_relay::fetch::{CliMediaDownloader, MediaDownloader};
//! use media_relay::options::OptionPolicy;
//! use media_relay::types::MediaFormat;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = CliMediaDownloader::from_path()
//!         .expect("yt-dlp not found in PATH");
//!
//!     let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
//!     let options = OptionPolicy::default().select(MediaFormat::Mp3, false, url);
//!     downloader.download(url, &options, Path::new("/tmp/work")).await?;
//!     Ok(())
//! }
//! ```

mod cli;
mod traits;

pub use cli::CliMediaDownloader;
pub use traits::MediaDownloader;
