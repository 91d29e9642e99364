use async_trait::async_trait;
use serde_json::Value;

use super::SessionStore;

/// Used when sessions are disabled: every request is unauthenticated.
pub struct NoSessionStore;

impl NoSessionStore {
    pub fn new() -> Self {
        NoSessionStore
    }
}

impl Default for NoSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for NoSessionStore {
    async fn load(&self, _session_id: &str) -> Result<Option<Value>, String> {
        Ok(None)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
