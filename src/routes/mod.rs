//! HTTP route definitions and handlers.
//!
//! This module organizes all HTTP endpoints into logical groups:
//! proxied API calls, locale negotiation, health checks and metrics.

mod health_routes;
mod locale_routes;
mod metrics;
mod proxy_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router and attaches
/// the application state for access in handlers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(proxy_routes::routes())
        .merge(locale_routes::routes())
        .merge(health_routes::routes())
        .merge(metrics::routes())
        .with_state(state)
}
