//! REST API server module
//!
//! Exposes the download-and-deliver pipeline over HTTP, plus health and
//! OpenAPI endpoints.

use crate::{Config, Result, relay::Relay};
use axum::{Router, http::HeaderValue, middleware, routing::get};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

const OPENAPI_PATH: &str = "/api/openapi.json";

/// Create the API router
///
/// # Routes
///
/// - `GET /api/download?url=..&format=mp4|mp3[&watermark=true]` - Download and sign
/// - `GET /api/health` - Health check (never requires the API key)
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(relay: Arc<Relay>, config: Arc<Config>) -> Router {
    let api = &config.server.api;
    let state = AppState::new(relay);

    let protected = Router::new().route("/api/download", get(routes::download));

    // SwaggerUi serves the document itself; registering both would overlap
    let protected = if api.swagger_ui {
        protected.merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()))
    } else {
        protected.route(OPENAPI_PATH, get(routes::openapi_spec))
    };

    let protected = if api.api_key.is_some() {
        protected.layer(middleware::from_fn_with_state(
            api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        protected
    };

    let router = Router::new()
        .route("/api/health", get(routes::health_check))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if api.cors_enabled {
        router.layer(build_cors_layer(&api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin. Unparseable origins are skipped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Serve the API on the configured bind address until `shutdown` resolves
///
/// In-flight requests are allowed to finish after `shutdown` fires.
///
/// # Example
///
/// ```no_run
/// use media_relay::{Config, relay::Relay};
/// use std::sync::Arc;
///
/// # async fn example() -> media_relay::Result<()> {
/// let config = Arc::new(Config::from_env()?);
/// let relay = Arc::new(Relay::from_config(&config)?);
///
/// media_relay::api::start_api_server(relay, config, media_relay::shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(relay: Arc<Relay>, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(relay, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
