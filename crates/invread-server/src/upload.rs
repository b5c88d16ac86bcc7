//! Staging of uploaded files in the upload directory.

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::RelayError;

/// Multipart field carrying the invoice file.
pub const FILE_FIELD: &str = "file";

/// Optional multipart field carrying a caller-supplied provider key.
pub const API_KEY_FIELD: &str = "apiKey";

/// An uploaded file written to a temporary location.
///
/// The file is removed when the value is dropped, on every exit path of
/// the request. Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct StagedUpload {
    file: Option<NamedTempFile>,
    path: PathBuf,
    /// File name sent by the client, possibly empty.
    pub file_name: String,
    /// Number of bytes written.
    pub size: u64,
}

impl StagedUpload {
    fn new(file: NamedTempFile, file_name: String) -> Self {
        Self {
            path: file.path().to_path_buf(),
            file: Some(file),
            file_name,
            size: 0,
        }
    }

    /// Location of the staged copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name to present upstream: the client's file name, else the staged one.
    pub fn upload_name(&self) -> String {
        if !self.file_name.trim().is_empty() {
            return self.file_name.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| FILE_FIELD.to_string())
    }

    /// A browser submitting an empty file input sends a nameless, empty part.
    fn is_empty_selection(&self) -> bool {
        self.file_name.trim().is_empty() && self.size == 0
    }

    /// MIME type derived from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("pdf") => "application/pdf",
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => debug!(path = %self.path.display(), "removed staged upload"),
                Err(e) => warn!(
                    path = %self.path.display(),
                    error = %e,
                    "error deleting temp file"
                ),
            }
        }
    }
}

/// Parsed form of one relay request.
#[derive(Debug, Default)]
pub struct UploadRequest {
    /// The staged `file` field, if one was sent.
    pub file: Option<StagedUpload>,
    /// Non-empty `apiKey` field, if one was sent.
    pub api_key: Option<String>,
}

/// Read the multipart body, staging the `file` field in `upload_dir`.
///
/// Fails with [`RelayError::PayloadTooLarge`] as soon as more than `limit`
/// bytes of file content have been received.
pub async fn read_upload(
    multipart: &mut Multipart,
    upload_dir: &Path,
    limit: u64,
) -> Result<UploadRequest, RelayError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let mut request = UploadRequest::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::from_multipart(e, limit))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) if request.file.is_none() => {
                let staged = stage_file(&mut field, upload_dir, limit).await?;
                if staged.is_empty_selection() {
                    debug!("ignoring empty file part");
                } else {
                    request.file = Some(staged);
                }
            }
            Some(API_KEY_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| RelayError::from_multipart(e, limit))?;
                let value = value.trim();
                if !value.is_empty() {
                    request.api_key = Some(value.to_string());
                }
            }
            other => debug!(field = ?other, "ignoring form field"),
        }
    }

    Ok(request)
}

async fn stage_file(
    field: &mut Field<'_>,
    upload_dir: &Path,
    limit: u64,
) -> Result<StagedUpload, RelayError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let suffix = Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let temp = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(upload_dir)?;
    let mut out = tokio::fs::File::from_std(temp.as_file().try_clone()?);
    let mut staged = StagedUpload::new(temp, file_name);

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| RelayError::from_multipart(e, limit))?
    {
        staged.size += chunk.len() as u64;
        if staged.size > limit {
            return Err(RelayError::PayloadTooLarge { limit });
        }
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    debug!(path = %staged.path.display(), size = staged.size, "staged upload");
    Ok(staged)
}
