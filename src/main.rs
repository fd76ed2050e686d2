//! media-relay server binary
//!
//! Reads configuration from the environment (and `.env`), then serves the
//! HTTP API until SIGTERM/SIGINT.

use media_relay::{Config, Relay, api};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "media_relay=info,tower_http=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    let relay = Arc::new(Relay::from_config(&config)?);
    tracing::info!(
        downloader = relay.downloader_name(),
        store = relay.store_name(),
        bucket = %config.storage.bucket,
        "media-relay ready"
    );

    api::start_api_server(relay, config, media_relay::shutdown_signal()).await?;
    Ok(())
}
