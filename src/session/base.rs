use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{memory_store::MemorySessionStore, no_store::NoSessionStore};
use crate::config::{SessionBackend, SessionConfig};
use crate::models::AuthToken;
use crate::state::AppState;
use crate::utils::http_helpers::cookie_value;

/// The SessionStore trait abstracts where per-user session records live.
///
/// Records are opaque JSON; [`extract_token`] decides whether one holds a token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<Value>, String>;
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Creates a concrete session store based on the SessionConfig.
/// If `session.enabled = false`, returns NoSessionStore.
pub fn create_session_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>, String> {
    if !config.enabled {
        info!("Sessions are disabled. Every request is unauthenticated.");
        return Ok(Arc::new(NoSessionStore::new()));
    }

    match &config.backend {
        Some(SessionBackend::Memory) => {
            info!("Using in-memory session store.");
            Ok(Arc::new(MemorySessionStore::new()))
        }
        None => Err("Sessions are enabled, but no backend is configured".to_string()),
    }
}

/// Decodes a session record into a token.
///
/// No session and a malformed session are the same thing to callers: both
/// mean "unauthenticated".
pub fn extract_token(record: Option<&Value>) -> Option<AuthToken> {
    let record = record?;
    match AuthToken::from_session(record) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!(
                event_name = "session.token.malformed",
                event_domain = "session",
                "{}",
                e
            );
            None
        }
    }
}

/// The token bound to the caller's session, if any. Never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub Option<AuthToken>);

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        if !state.sessions.is_enabled() {
            return Ok(SessionToken(None));
        }
        let Some(session_id) = cookie_value(&parts.headers, &state.config.session.cookie_name)
        else {
            debug!("Request carries no session cookie.");
            return Ok(SessionToken(None));
        };

        let record = match state.sessions.load(session_id).await {
            Ok(record) => record,
            Err(e) => {
                error!("Error while loading session: {}", e);
                None
            }
        };
        Ok(SessionToken(extract_token(record.as_ref())))
    }
}
