use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::SessionStore;
use crate::models::AuthToken;

/// Session records kept in process memory.
///
/// The login flow writes records with [`MemorySessionStore::insert`]; the proxy
/// only reads them.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an arbitrary record under `session_id`, replacing any previous one.
    pub async fn insert(&self, session_id: &str, record: Value) {
        debug!("Storing session record for session_id='{}'", session_id);
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), record);
    }

    pub async fn insert_token(&self, session_id: &str, token: &AuthToken) {
        self.insert(session_id, token.to_session()).await;
    }

    pub async fn remove(&self, session_id: &str) -> Option<Value> {
        self.sessions.write().await.remove(session_id)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<Value>, String> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }
}
