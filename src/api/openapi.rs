//! OpenAPI documentation and schema generation
//!
//! Generated at compile time with utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-relay REST API
///
/// Served at `/api/openapi.json` and rendered at `/swagger-ui` when enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-relay REST API",
        version = "0.1.0",
        description = "Downloads media from a URL with yt-dlp, stores it in S3 and returns a time-limited download link",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6789", description = "Local development server")
    ),
    paths(
        crate::api::routes::download,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::MediaFormat,
        crate::types::DownloadResponse,
        crate::error::ApiError,
    )),
    tags(
        (name = "download", description = "Download media and receive a signed link"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the `X-Api-Key` header scheme to the document
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
