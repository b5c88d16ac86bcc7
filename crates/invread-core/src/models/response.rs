//! Normalized error body returned by the relay.

use serde::{Deserialize, Serialize};

/// Message used for every failure that happens while processing an upload.
pub const PROCESSING_FAILED: &str = "Error processing invoice";

/// Error payload of the relay: `{ message, error }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short, stable description of what failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Detail of the failure, e.g. the upstream `detail` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Body carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    /// Processing failure with a detail string.
    pub fn processing(error: impl Into<String>) -> Self {
        Self {
            message: Some(PROCESSING_FAILED.to_string()),
            error: Some(error.into()),
        }
    }

    /// Text to show the user: the detail if any, else the message.
    pub fn display_text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
    }
}
