use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Session store configuration:
/// - enabled: if false, every request is treated as having no session.
/// - cookie_name: the cookie carrying the session id.
/// - backend: the store that maps session ids to token records.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct SessionConfig {
    pub enabled: bool,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(flatten)]
    pub backend: Option<SessionBackend>,
}

/// Session backends, differentiated via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
#[serde(tag = "type")]
pub enum SessionBackend {
    #[serde(rename = "memory")]
    Memory,
}

fn default_cookie_name() -> String {
    "session_id".to_string()
}
