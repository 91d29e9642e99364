use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The authentication token a login flow stores in the user's session.
///
/// The session record has the shape `{"Token": "...", "Expires": "..."}`.
/// The proxy only ever reads it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuthToken {
    #[serde(rename = "Token")]
    pub value: String,
    #[serde(rename = "Expires")]
    pub expires_at: String,
}

impl AuthToken {
    pub fn new(value: impl Into<String>, expires_at: impl Into<String>) -> Self {
        AuthToken {
            value: value.into(),
            expires_at: expires_at.into(),
        }
    }

    /// Validates an opaque session record and decodes it into a token.
    pub fn from_session(record: &Value) -> Result<Self, String> {
        let token = AuthToken::deserialize(record)
            .map_err(|e| format!("Session record is not a token: {}", e))?;
        if token.value.is_empty() {
            return Err("Session record carries an empty token".to_string());
        }
        Ok(token)
    }

    /// Session record form, as written by the login flow.
    pub fn to_session(&self) -> Value {
        serde_json::json!({
            "Token": self.value,
            "Expires": self.expires_at,
        })
    }
}
