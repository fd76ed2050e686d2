//! Configuration types for media-relay

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Lifetime of every signed download link
pub const LINK_EXPIRY: Duration = Duration::from_secs(3600);

/// Object storage configuration (credentials, bucket, endpoint)
///
/// Used as a nested sub-config within [`Config`]. The credentials are never
/// serialized back out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Access key id
    #[serde(skip_serializing)]
    pub access_key_id: String,

    /// Secret access key
    #[serde(skip_serializing)]
    pub secret_access_key: String,

    /// Bucket the media files are uploaded to
    pub bucket: String,

    /// Bucket region (default: "us-east-1")
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint` (default: false)
    #[serde(default)]
    pub force_path_style: bool,

    /// Prefix prepended to every object key, e.g. "downloads/"
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// How long signed links stay valid (fixed at one hour)
    #[serde(default = "default_link_expiry")]
    pub link_expiry: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket: String::new(),
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
            key_prefix: None,
            link_expiry: default_link_expiry(),
        }
    }
}

/// External downloader configuration (binary, workspace, format policy)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Whether to search PATH for the downloader if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Directory under which per-request workspaces are created (default: system temp dir)
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Resolution ceiling for watermark-free video downloads (default: 1080)
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Format selector for the pre-watermarked rendition (default: "download/best")
    #[serde(default = "default_watermarked_format")]
    pub watermarked_format: String,

    /// URL substrings whose thumbnails cannot be embedded into video containers
    #[serde(default = "default_thumbnail_blocklist")]
    pub thumbnail_blocklist: Vec<String>,

    /// Output file name template handed to the downloader
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Probe the media title before downloading and return it to the client (default: false)
    #[serde(default)]
    pub probe_title: bool,

    /// Extra arguments appended to every downloader invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            search_path: true,
            temp_dir: default_temp_dir(),
            max_height: default_max_height(),
            watermarked_format: default_watermarked_format(),
            thumbnail_blocklist: default_thumbnail_blocklist(),
            output_template: default_output_template(),
            probe_title: false,
            extra_args: Vec::new(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6789)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for media-relay
///
/// Built once at startup (usually with [`Config::from_env`]) and shared
/// read-only between requests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Object storage settings
    pub storage: StorageConfig,

    /// Downloader settings
    #[serde(default)]
    pub downloader: DownloaderConfig,

    /// API settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `BUCKET_NAME` are
    /// required; everything else falls back to its default.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::Config {
                message: format!("{key} is not set in environment variables"),
                key: Some(key.to_string()),
            })
        };

        let storage = StorageConfig {
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            bucket: require("BUCKET_NAME")?,
            region: get("AWS_REGION").unwrap_or_else(default_region),
            endpoint_url: get("S3_ENDPOINT_URL"),
            force_path_style: parse_var(&get, "S3_FORCE_PATH_STYLE")?.unwrap_or(false),
            key_prefix: get("S3_KEY_PREFIX"),
            link_expiry: default_link_expiry(),
        };

        let mut downloader = DownloaderConfig {
            binary_path: get("YTDLP_PATH").map(PathBuf::from),
            probe_title: parse_var(&get, "MEDIA_RELAY_PROBE_TITLE")?.unwrap_or(false),
            ..Default::default()
        };
        if let Some(dir) = get("MEDIA_RELAY_TEMP_DIR") {
            downloader.temp_dir = PathBuf::from(dir);
        }
        if let Some(height) = parse_var(&get, "MEDIA_RELAY_MAX_HEIGHT")? {
            downloader.max_height = height;
        }

        let mut api = ApiConfig {
            api_key: get("MEDIA_RELAY_API_KEY"),
            ..Default::default()
        };
        if let Some(bind) = parse_var(&get, "MEDIA_RELAY_BIND")? {
            api.bind_address = bind;
        }
        if let Some(origins) = get("MEDIA_RELAY_CORS_ORIGINS") {
            api.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(swagger) = parse_var(&get, "MEDIA_RELAY_SWAGGER_UI")? {
            api.swagger_ui = swagger;
        }

        Ok(Self {
            storage,
            downloader,
            server: ServerIntegrationConfig { api },
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| Error::Config {
                message: format!("invalid value {raw:?} for {key}: {e}"),
                key: Some(key.to_string()),
            })
        })
        .transpose()
}

fn default_region() -> String {
    "us-east-1".into()
}

fn default_link_expiry() -> Duration {
    LINK_EXPIRY
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_max_height() -> u32 {
    1080
}

fn default_watermarked_format() -> String {
    "download/best".into()
}

fn default_thumbnail_blocklist() -> Vec<String> {
    vec!["tiktok.com".into()]
}

fn default_output_template() -> String {
    "%(title)s.%(ext)s".into()
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6789))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 3] = [
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI/K7MDENG"),
        ("BUCKET_NAME", "download-aio"),
    ];

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&CREDENTIALS)).unwrap();

        assert_eq!(config.storage.bucket, "download-aio");
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.storage.link_expiry, Duration::from_secs(3600));
        assert!(config.storage.endpoint_url.is_none());
        assert!(!config.storage.force_path_style);
        assert_eq!(config.downloader.max_height, 1080);
        assert_eq!(config.downloader.thumbnail_blocklist, vec!["tiktok.com"]);
        assert!(!config.downloader.probe_title);
        assert_eq!(
            config.server.api.bind_address,
            "127.0.0.1:6789".parse().unwrap()
        );
        assert!(config.server.api.api_key.is_none());
    }

    #[test]
    fn missing_credentials_fail_fast_naming_the_key() {
        for missing in ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "BUCKET_NAME"] {
            let vars: Vec<_> = CREDENTIALS
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();

            match Config::from_lookup(lookup(&vars)) {
                Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some(missing)),
                other => panic!("expected config error for {missing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_credential_counts_as_missing() {
        let mut vars = CREDENTIALS.to_vec();
        vars[1] = ("AWS_SECRET_ACCESS_KEY", "  ");
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn optional_variables_override_defaults() {
        let mut vars = CREDENTIALS.to_vec();
        vars.extend([
            ("AWS_REGION", "eu-central-1"),
            ("S3_ENDPOINT_URL", "http://localhost:9000"),
            ("S3_FORCE_PATH_STYLE", "true"),
            ("S3_KEY_PREFIX", "media/"),
            ("YTDLP_PATH", "/opt/yt-dlp"),
            ("MEDIA_RELAY_TEMP_DIR", "/var/tmp/relay"),
            ("MEDIA_RELAY_MAX_HEIGHT", "720"),
            ("MEDIA_RELAY_PROBE_TITLE", "true"),
            ("MEDIA_RELAY_BIND", "0.0.0.0:8080"),
            ("MEDIA_RELAY_API_KEY", "secret"),
            ("MEDIA_RELAY_CORS_ORIGINS", "https://a.example, https://b.example"),
            ("MEDIA_RELAY_SWAGGER_UI", "false"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.storage.region, "eu-central-1");
        assert_eq!(
            config.storage.endpoint_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(config.storage.force_path_style);
        assert_eq!(config.storage.key_prefix.as_deref(), Some("media/"));
        assert_eq!(
            config.downloader.binary_path,
            Some(PathBuf::from("/opt/yt-dlp"))
        );
        assert_eq!(config.downloader.temp_dir, PathBuf::from("/var/tmp/relay"));
        assert_eq!(config.downloader.max_height, 720);
        assert!(config.downloader.probe_title);
        assert_eq!(config.server.api.bind_address.port(), 8080);
        assert_eq!(config.server.api.api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.server.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.server.api.swagger_ui);
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("MEDIA_RELAY_MAX_HEIGHT", "tall"));

        match Config::from_lookup(lookup(&vars)) {
            Err(Error::Config { key, message }) => {
                assert_eq!(key.as_deref(), Some("MEDIA_RELAY_MAX_HEIGHT"));
                assert!(message.contains("tall"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn serialized_config_omits_secrets() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("MEDIA_RELAY_API_KEY", "hunter2"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("AKIDEXAMPLE"));
        assert!(!json.contains("wJalrXUtnFEMI"));
        assert!(!json.contains("hunter2"));
        assert!(json.contains("download-aio"));
    }
}
