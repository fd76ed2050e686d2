//! HTTP error response handling for the API
//!
//! Validation failures become a plain-text 400 carrying just the message.
//! Every other error becomes a JSON [`ApiError`] with the mapped status code.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let Error::Validation(e) = &self {
            return (status_code, e.to_string()).into_response();
        }

        let api_error: ApiError = self.into();
        (status_code, Json(api_error)).into_response()
    }
}
