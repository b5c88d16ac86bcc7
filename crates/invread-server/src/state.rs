use std::sync::Arc;

use invread_core::RelayConfig;

use crate::error::RelayError;
use crate::provider::{ExtractionProvider, VisionParserClient};

/// Shared, read-only state of the relay.
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<RelayConfig>,
    /// Configured provider key. Must never be logged.
    pub api_key: Option<Arc<str>>,
    pub provider: Arc<dyn ExtractionProvider>,
}

impl RelayState {
    /// State backed by the Vision Parser client described by `config`.
    pub fn new(config: RelayConfig, api_key: Option<String>) -> Result<Self, RelayError> {
        let provider = VisionParserClient::new(&config)?;
        Ok(Self::with_provider(config, api_key, Arc::new(provider)))
    }

    pub fn with_provider(
        config: RelayConfig,
        api_key: Option<String>,
        provider: Arc<dyn ExtractionProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
            provider,
        }
    }
}
