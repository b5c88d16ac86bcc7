//! Client for the remote extraction service.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use invread_core::RelayConfig;

use crate::error::RelayError;
use crate::upload::StagedUpload;

/// Header carrying the provider API key.
pub const API_KEY_HEADER: &str = "api_key";

/// Response format requested from the provider.
pub const RESPONSE_TYPE: &str = "simple";

/// Trait for extraction providers, enabling mocking in tests.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Send a staged file for extraction and return the raw JSON body.
    async fn extract(&self, upload: &StagedUpload, api_key: &str) -> Result<Bytes, RelayError>;
}

/// Vision Parser API client. The API key is supplied per call.
pub struct VisionParserClient {
    http: reqwest::Client,
    endpoint: String,
}

impl VisionParserClient {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder();

        if config.accept_invalid_certs {
            warn!(
                endpoint = %config.upstream_url,
                "TLS certificate validation is disabled for the upstream connection"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(secs) = config.upstream_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http = builder
            .build()
            .map_err(|e| RelayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.upstream_url.clone(),
        })
    }
}

#[async_trait]
impl ExtractionProvider for VisionParserClient {
    async fn extract(&self, upload: &StagedUpload, api_key: &str) -> Result<Bytes, RelayError> {
        let file = tokio::fs::File::open(upload.path()).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let part = Part::stream_with_length(body, upload.size)
            .file_name(upload.upload_name())
            .mime_str(upload.mime_type())?;
        let form = Form::new()
            .part("file", part)
            .text("response_type", RESPONSE_TYPE);

        debug!(endpoint = %self.endpoint, size = upload.size, "posting file to provider");

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(body);
        }

        debug!(status = status.as_u16(), body = %String::from_utf8_lossy(&body), "provider error details");
        Err(RelayError::Upstream {
            status: Some(status.as_u16()),
            detail: upstream_detail(&body, status),
        })
    }
}

/// The provider's `detail` field, or a generic message naming the status.
pub fn upstream_detail(body: &[u8], status: StatusCode) -> String {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
            format!("Request failed with status code {}", status.as_u16())
        }
        Some(other) => other.to_string(),
    }
}
