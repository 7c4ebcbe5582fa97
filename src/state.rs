//! Shared application state for the dashboard server.

use std::sync::Arc;
use std::time::Instant;

use crate::config::UserConfig;
use crate::provider::ProviderClient;

/// State shared across all HTTP request handlers.
///
/// Cheap to clone; the provider client and configuration are behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Shared HTTP client for provider communication
    pub provider: Arc<ProviderClient>,
    /// Resolved user configuration (basic-auth credentials live here)
    pub config: Arc<UserConfig>,
    /// Server start time, reported by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    pub fn new(provider: ProviderClient, config: UserConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
