//! Download option selection
//!
//! Maps `(format, watermark, url)` to the options handed to the external
//! downloader. The whole policy is a small table:
//!
//! | format | watermark | selection |
//! |--------|-----------|-----------|
//! | mp3    | any       | extract audio, mp3, embed thumbnail + metadata |
//! | mp4    | true      | pre-watermarked rendition, merged to mp4 |
//! | mp4    | false     | best video+audio under the height ceiling, merged to mp4 |
//!
//! Watermark-free video skips thumbnail embedding for sources on the
//! thumbnail blocklist.

use crate::config::DownloaderConfig;
use crate::types::MediaFormat;
use std::ffi::OsString;

/// What the downloader should fetch and how to package it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Extract the audio track and transcode it
    ExtractAudio {
        /// Target audio codec, e.g. "mp3"
        codec: &'static str,
    },
    /// Download video and audio and merge them into one container
    Video {
        /// yt-dlp format selector expression
        selector: String,
        /// Merge container, e.g. "mp4"
        container: &'static str,
    },
}

/// Options passed opaquely to the downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Stream selection and packaging
    pub selection: Selection,
    /// Embed the thumbnail as cover art
    pub embed_thumbnail: bool,
    /// Write title/artist/... tags into the container
    pub embed_metadata: bool,
    /// Output file name template, relative to the workspace
    pub output_template: String,
}

impl DownloadOptions {
    /// The format selector, if this is a video selection
    pub fn format_selector(&self) -> Option<&str> {
        match &self.selection {
            Selection::Video { selector, .. } => Some(selector),
            Selection::ExtractAudio { .. } => None,
        }
    }

    /// Whether the selection caps the video resolution
    pub fn has_height_ceiling(&self) -> bool {
        self.format_selector()
            .is_some_and(|selector| selector.contains("height<="))
    }

    /// Render the options as downloader command-line arguments
    ///
    /// Workspace path and URL are not included; the caller appends them.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = ArgsHelper::new();

        match &self.selection {
            Selection::ExtractAudio { codec } => {
                args.arg("-f").arg("bestaudio/best");
                args.arg("--extract-audio");
                args.arg("--audio-format").arg(*codec);
            }
            Selection::Video {
                selector,
                container,
            } => {
                args.arg("-f").arg(selector.as_str());
                args.arg("--merge-output-format").arg(*container);
            }
        }

        if self.embed_thumbnail {
            args.arg("--embed-thumbnail");
        } else {
            args.arg("--no-embed-thumbnail");
        }

        if self.embed_metadata {
            args.arg("--add-metadata");
        }

        args.arg("-o").arg(self.output_template.as_str());

        args.into()
    }
}

/// Read-only parameters of the selection table
#[derive(Debug, Clone)]
pub struct OptionPolicy {
    /// Resolution ceiling for watermark-free video
    pub max_height: u32,
    /// Selector of the pre-watermarked rendition
    pub watermarked_format: String,
    /// URL substrings that disable thumbnail embedding for video
    pub thumbnail_blocklist: Vec<String>,
    /// Output file name template
    pub output_template: String,
}

impl Default for OptionPolicy {
    fn default() -> Self {
        Self::from_config(&DownloaderConfig::default())
    }
}

impl OptionPolicy {
    /// Take the policy parameters from the downloader configuration
    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self {
            max_height: config.max_height,
            watermarked_format: config.watermarked_format.clone(),
            thumbnail_blocklist: config.thumbnail_blocklist.clone(),
            output_template: config.output_template.clone(),
        }
    }

    /// Select the download options for a request
    pub fn select(&self, format: MediaFormat, watermark: bool, url: &str) -> DownloadOptions {
        let output_template = self.output_template.clone();

        match (format, watermark) {
            (MediaFormat::Mp3, _) => DownloadOptions {
                selection: Selection::ExtractAudio {
                    codec: MediaFormat::Mp3.extension(),
                },
                embed_thumbnail: true,
                embed_metadata: true,
                output_template,
            },
            (MediaFormat::Mp4, true) => DownloadOptions {
                selection: Selection::Video {
                    selector: self.watermarked_format.clone(),
                    container: MediaFormat::Mp4.extension(),
                },
                embed_thumbnail: false,
                embed_metadata: false,
                output_template,
            },
            (MediaFormat::Mp4, false) => DownloadOptions {
                selection: Selection::Video {
                    selector: format!(
                        "bestvideo[height<={h}]+bestaudio/best[height<={h}]",
                        h = self.max_height
                    ),
                    container: MediaFormat::Mp4.extension(),
                },
                embed_thumbnail: !self.thumbnail_blocked(url),
                embed_metadata: false,
                output_template,
            },
        }
    }

    fn thumbnail_blocked(&self, url: &str) -> bool {
        self.thumbnail_blocklist
            .iter()
            .any(|domain| url.contains(domain.as_str()))
    }
}

/// Small builder collecting arguments as [`OsString`]
#[derive(Debug, Default)]
pub(crate) struct ArgsHelper(Vec<OsString>);

impl ArgsHelper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append one argument, returning `self` for chaining
    pub(crate) fn arg<U>(&mut self, arg: U) -> &mut Self
    where
        U: Into<OsString>,
    {
        self.0.push(arg.into());
        self
    }
}

impl From<ArgsHelper> for Vec<OsString> {
    fn from(v: ArgsHelper) -> Self {
        v.0
    }
}
