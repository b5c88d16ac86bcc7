//! Upload relay for invoice extraction.
//!
//! Accepts one multipart file upload, stages it in a temporary file,
//! forwards it to the Vision Parser API and returns the provider's JSON
//! response or a normalized `{ message, error }` body.

pub mod error;
pub mod handlers;
pub mod provider;
pub mod state;
pub mod upload;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use error::RelayError;
pub use provider::{ExtractionProvider, VisionParserClient};
pub use state::RelayState;
pub use upload::{StagedUpload, UploadRequest};

/// Path of the parse endpoint.
pub const PARSE_INVOICE_PATH: &str = "/api/parse-invoice";

/// Allowance for multipart boundaries, headers and text fields on top of
/// the file size cap.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Build the relay router.
pub fn router(state: RelayState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route(
            PARSE_INVOICE_PATH,
            post(handlers::parse_invoice).fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
