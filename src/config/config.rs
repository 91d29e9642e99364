use std::collections::HashMap;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::session::SessionConfig;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "LANGPROXY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub locales: LocalesConfig,
    pub session: SessionConfig,
    /// Upper bound for captured inbound request bodies.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// The remote API every proxied call goes to.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ApiConfig {
    /// Prefix for every relative path, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
    /// Named relative paths, so handlers can refer to `user_details` rather
    /// than a literal path.
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

/// Which locales to load and where their messages live.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct LocalesConfig {
    /// Locale codes, e.g. `["en-US", "pl-PL"]`.
    pub types: Vec<String>,
    /// Display names paired positionally with `types`.
    pub names: Vec<String>,
    /// Directory holding `locale_<code>.yaml` message files.
    #[serde(default = "default_locale_directory")]
    pub directory: String,
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

fn default_locale_directory() -> String {
    "./locales".to_string()
}

impl ConfigV1 {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locales.types.len() != self.locales.names.len() {
            return Err(ConfigError::Invalid(format!(
                "locales.types has {} entries but locales.names has {}",
                self.locales.types.len(),
                self.locales.names.len()
            )));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".to_string()));
        }
        Ok(())
    }
}

/// Builds the figment: the YAML file, then `LANGPROXY_`-prefixed env vars
/// (`LANGPROXY_API__BASE_URL` overrides `api.base_url`).
pub fn figment() -> Figment {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("LANGPROXY_").split("__"))
}

pub fn extract_config(figment: &Figment) -> Result<ConfigV1, ConfigError> {
    let config = figment
        .extract::<Config>()
        .map_err(|e| ConfigError::Load(Box::new(e)))?;
    let Config::ConfigV1(config) = config;
    config.validate()?;
    Ok(config)
}

/// Load config from `./config.yaml` (or `$LANGPROXY_CONFIG`) and the environment.
pub fn load_config() -> Result<ConfigV1, ConfigError> {
    extract_config(&figment())
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
