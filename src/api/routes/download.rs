//! Download handler: `GET /api/download`

use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::{DownloadQuery, DownloadRequest, DownloadResponse};
use axum::{
    Json,
    extract::{Query, State},
};

/// GET /api/download - Download media and return a signed link to it
///
/// Validates the query, runs the downloader in a fresh workspace, uploads the
/// single produced file and answers with a presigned GET URL valid for one
/// hour. The workspace is removed whatever the outcome.
#[utoipa::path(
    get,
    path = "/api/download",
    tag = "download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File uploaded, signed link issued", body = DownloadResponse),
        (status = 400, description = "Missing url/format or invalid format", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 500, description = "Download, upload or signing failed", body = ApiError)
    ),
    security(
        (),
        ("api_key" = [])
    )
)]
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Json<DownloadResponse>, Error> {
    let request = DownloadRequest::from_query(query).inspect_err(|e| {
        tracing::debug!(error = %e, "rejected download request");
    })?;

    match state.relay.deliver(&request).await {
        Ok(record) => Ok(Json(record.into())),
        Err(e) => {
            tracing::error!(
                url = %request.url,
                format = %request.format,
                error = %e,
                "download request failed"
            );
            Err(e)
        }
    }
}
