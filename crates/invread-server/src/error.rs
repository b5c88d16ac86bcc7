//! Relay error taxonomy and its translation into HTTP responses.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use invread_core::ErrorBody;

/// Every way a relay request can fail.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Request used a verb other than POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No provider API key is available.
    #[error("{0}")]
    Configuration(String),

    /// The request is unusable, e.g. no file was uploaded.
    #[error("{0}")]
    BadRequest(String),

    /// The uploaded file exceeds the size cap.
    #[error("maxFileSize exceeded: file is larger than {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// The extraction service answered with a non-2xx status.
    #[error("upstream request failed: {detail}")]
    Upstream { status: Option<u16>, detail: String },

    /// Unexpected local failure (filesystem, multipart stream, network).
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// Translate a multipart stream failure, keeping body limit violations distinct.
    pub fn from_multipart(err: MultipartError, limit: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge { limit }
        } else {
            RelayError::Internal(err.body_text())
        }
    }

    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            RelayError::Configuration(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Normalized `{ message, error }` body.
    pub fn body(&self) -> ErrorBody {
        match self {
            RelayError::MethodNotAllowed | RelayError::BadRequest(_) => {
                ErrorBody::message(self.to_string())
            }
            RelayError::Upstream { detail, .. } => ErrorBody::processing(detail.as_str()),
            RelayError::Configuration(_)
            | RelayError::PayloadTooLarge { .. }
            | RelayError::Internal(_) => ErrorBody::processing(self.to_string()),
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RelayError::Upstream {
                status: Some(status.as_u16()),
                detail: err.to_string(),
            },
            None => RelayError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "relay request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "relay request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
