//! Shared application state for middleware and handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::provider::ConfigProvider;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the single [`ConfigProvider`] that supplies the canonical host to the
/// redirect middleware.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ConfigProvider>,
}

impl AppState {
    /// Creates the state, backing the provider with the record in the data directory.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_provider(ConfigProvider::from_path(config.data.configuration_path()))
    }

    pub fn with_provider(provider: ConfigProvider) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}
