//! Application startup and server initialization.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::i18n::DirectorySource;
use crate::routes;
use crate::session::create_session_store;
use crate::state::AppState;

/// Initializes and runs the application server.
///
/// Loads the locale catalog, creates the session store and the shared API
/// client, then serves the router on the configured address.
///
/// # Errors
///
/// Returns an error if any component fails to initialize, if the server
/// fails to bind to the specified address, or on a runtime server error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let sessions = create_session_store(&config.session)?;
    let messages = Arc::new(DirectorySource::new(&config.locales.directory));
    let state = AppState::build(config.clone(), messages, sessions)?;

    info!(
        "Loaded {} of {} configured locales",
        state.catalog.snapshot().list().len(),
        config.locales.types.len()
    );

    let app = routes::create_router(state);

    info!("Starting server on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
