use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::state::RelayState;
use crate::upload::read_upload;

const MISSING_KEY: &str = "Vision Parser API key not configured";
const NO_FILE: &str = "No file uploaded";

/// `POST /api/parse-invoice`: relay one uploaded file to the provider.
pub async fn parse_invoice(
    State(state): State<RelayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, RelayError> {
    info!("parse request started");

    let mut multipart = multipart.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "request is not a multipart upload");
        RelayError::BadRequest(NO_FILE.to_string())
    })?;

    let config = &state.config;
    let upload = read_upload(&mut multipart, &config.upload_dir, config.max_upload_bytes).await?;
    debug!(
        has_file = upload.file.is_some(),
        key_override = upload.api_key.is_some(),
        "form data processed"
    );

    let api_key = upload
        .api_key
        .as_deref()
        .or(state.api_key.as_deref())
        .ok_or_else(|| RelayError::Configuration(MISSING_KEY.to_string()))?;

    let file = upload
        .file
        .as_ref()
        .ok_or_else(|| RelayError::BadRequest(NO_FILE.to_string()))?;

    info!(file = %file.file_name, size = file.size, "sending request to Vision Parser");
    let body = state.provider.extract(file, api_key).await?;
    info!(bytes = body.len(), "provider response received");

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Any other verb on the parse endpoint.
pub async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

pub async fn health() -> &'static str {
    "OK"
}
