use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::adapters::AdapterError;

// Taken from https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub struct RelayError {
    pub status: StatusCode,
    pub message: HttpErrorResponse,
}

#[derive(Debug, Serialize)]
pub struct HttpErrorResponse {
    error: String,
}

impl From<String> for HttpErrorResponse {
    fn from(message: String) -> Self {
        HttpErrorResponse { error: message }
    }
}

impl From<&str> for HttpErrorResponse {
    fn from(message: &str) -> Self {
        HttpErrorResponse {
            error: message.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let mut res = Json(self.message).into_response();
        *res.status_mut() = self.status;
        res
    }
}

/// Validation failures are the caller's fault, everything else is reported
/// as an internal failure of the relay or the endpoint behind it.
impl From<AdapterError> for RelayError {
    fn from(err: AdapterError) -> Self {
        let status = match err {
            AdapterError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AdapterError::Encode(_) | AdapterError::Endpoint(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        RelayError {
            status,
            message: HttpErrorResponse::from(err.to_string()),
        }
    }
}

pub type RelayResult<T, E = RelayError> = Result<T, E>;
