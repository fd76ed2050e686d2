//! Core request and response types

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// Target container of a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Audio only, transcoded to MP3
    Mp3,
    /// Video with audio, merged into MP4
    Mp4,
}

impl MediaFormat {
    /// File extension (and downloader codec/container name)
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }

    /// MIME type stored with the uploaded object
    pub fn content_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::Mp4 => "video/mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MediaFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp3" => Ok(MediaFormat::Mp3),
            "mp4" => Ok(MediaFormat::Mp4),
            other => Err(ValidationError::InvalidFormat(other.to_string())),
        }
    }
}

/// Raw query parameters of `GET /api/download`
///
/// Every field is optional at this level so that missing parameters produce
/// the plain-text 400 instead of axum's query rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Media page URL handed to the downloader
    pub url: Option<String>,
    /// Output format: "mp4" or "mp3"
    pub format: Option<String>,
    /// "true" keeps the platform watermark; anything else avoids it
    pub watermark: Option<String>,
}

/// A validated download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Source URL, passed to the downloader untouched
    pub url: String,
    /// Requested output format
    pub format: MediaFormat,
    /// Keep the watermarked rendition
    pub watermark: bool,
}

impl DownloadRequest {
    /// Validate raw query parameters
    ///
    /// `url` and `format` must both be present and non-empty, and `format`
    /// must be `mp4` or `mp3`. Only the exact string `"true"` enables the
    /// watermark flag.
    pub fn from_query(query: DownloadQuery) -> Result<Self, ValidationError> {
        let (Some(url), Some(format)) = (
            query.url.filter(|u| !u.is_empty()),
            query.format.filter(|f| !f.is_empty()),
        ) else {
            return Err(ValidationError::MissingParameters);
        };

        Ok(Self {
            url,
            format: format.parse()?,
            watermark: query.watermark.as_deref() == Some("true"),
        })
    }
}

/// The outcome of a successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    /// Presigned GET URL for the uploaded object
    pub download_link: String,
    /// Object key inside the bucket
    pub key: String,
    /// When the link was signed
    pub issued_at: DateTime<Utc>,
    /// When the link stops working
    pub expires_at: DateTime<Utc>,
    /// Media title, when title probing is enabled
    pub title: Option<String>,
}

/// JSON body of a successful `GET /api/download`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// Time-limited signed link to the uploaded file
    pub download_link: String,
    /// Link expiry (RFC 3339)
    pub expires_at: DateTime<Utc>,
    /// Original media title
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
}

impl From<DeliveryRecord> for DownloadResponse {
    fn from(record: DeliveryRecord) -> Self {
        Self {
            download_link: record.download_link,
            expires_at: record.expires_at,
            title: record.title,
        }
    }
}
