//! HTTP client for the upload relay.

use std::path::Path;

use anyhow::Context;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use invread_core::{ErrorBody, ParseResponse};

/// Shown when the relay fails without a usable error body.
pub const FALLBACK_ERROR: &str = "Failed to process invoice";

/// Successful relay reply.
#[derive(Debug)]
pub struct RelayReply {
    /// Body exactly as returned by the relay.
    pub raw: String,
    /// Parsed form of `raw`.
    pub response: ParseResponse,
}

/// Client submitting invoice files to the relay endpoint.
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
}

impl RelayClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("invread-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Upload `file`, forwarding `api_key` when one is given.
    ///
    /// A non-2xx reply becomes an error carrying the relay's `error`, or
    /// its `message`, or [`FALLBACK_ERROR`].
    pub async fn submit(&self, file: &Path, api_key: Option<&str>) -> anyhow::Result<RelayReply> {
        let content = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "invoice".to_string());

        let mut form = Form::new().part("file", Part::bytes(content).file_name(file_name));
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            form = form.text("apiKey", key.to_string());
        }

        debug!(url = %self.url, "submitting invoice to relay");
        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Failed to reach relay at {}", self.url))?;

        let status = response.status();
        let raw = response.text().await?;
        debug!(status = status.as_u16(), bytes = raw.len(), "relay replied");

        if !status.is_success() {
            anyhow::bail!("{}", relay_error_message(&raw));
        }

        let response: ParseResponse =
            serde_json::from_str(&raw).context("Relay returned an unexpected response")?;

        Ok(RelayReply { raw, response })
    }
}

/// Pick the text to show for a failed relay call.
fn relay_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .as_ref()
        .and_then(ErrorBody::display_text)
        .unwrap_or(FALLBACK_ERROR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn invoice_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .unwrap();
        file.write_all(b"fake png").unwrap();
        file
    }

    #[test]
    fn test_relay_error_message() {
        assert_eq!(
            relay_error_message(r#"{"message": "Error processing invoice", "error": "Invalid API key"}"#),
            "Invalid API key"
        );
        assert_eq!(
            relay_error_message(r#"{"message": "No file uploaded"}"#),
            "No file uploaded"
        );
        assert_eq!(relay_error_message("<html>oops</html>"), FALLBACK_ERROR);
        assert_eq!(relay_error_message("{}"), FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn test_submit_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/parse-invoice"))
            .and(body_string_contains("name=\"apiKey\""))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"data": {"totalAmount": {"value": 150.0, "confidence": 0.98}}}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(&format!("{}/api/parse-invoice", server.uri())).unwrap();
        let file = invoice_file();
        let reply = client.submit(file.path(), Some("user-key")).await.unwrap();

        assert_eq!(reply.response.data.total_amount.confidence, Some(0.98));
        assert!(reply.raw.contains("totalAmount"));
    }

    #[tokio::test]
    async fn test_submit_omits_blank_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("apiKey"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"data": {}}"#, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(&server.uri()).unwrap();
        let file = invoice_file();
        assert!(client.submit(file.path(), Some("  ")).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_surfaces_relay_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(413).set_body_json(serde_json::json!({
                "message": "Error processing invoice",
                "error": "maxFileSize exceeded: file is larger than 10485760 bytes"
            })))
            .mount(&server)
            .await;

        let client = RelayClient::new(&server.uri()).unwrap();
        let file = invoice_file();
        let err = client.submit(file.path(), None).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "maxFileSize exceeded: file is larger than 10485760 bytes"
        );
    }
}
