//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, the locale catalog, the session store and the API proxy.

use std::sync::Arc;

use crate::config::ConfigV1;
use crate::i18n::{MessageSource, SharedCatalog};
use crate::metrics::Metrics;
use crate::proxy::ApiProxy;
use crate::session::SessionStore;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Loaded locales and their messages.
    pub catalog: Arc<SharedCatalog>,
    /// Where session records (and their tokens) are looked up.
    pub sessions: Arc<dyn SessionStore>,
    /// Client and classifier for the remote API.
    pub proxy: Arc<ApiProxy>,
    pub metrics: Metrics,
}

impl AppState {
    /// Wires the state together and loads the catalog once, before any
    /// request can race for it.
    pub fn build(
        config: Arc<ConfigV1>,
        messages: Arc<dyn MessageSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let metrics = Metrics::new()?;
        let proxy = ApiProxy::new(&config.api, Arc::new(metrics.clone()))?;
        let catalog = SharedCatalog::new(messages);
        catalog.load(&config.locales.types, &config.locales.names)?;

        Ok(AppState {
            config,
            catalog: Arc::new(catalog),
            sessions,
            proxy: Arc::new(proxy),
            metrics,
        })
    }
}
