#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use langproxy::config::{extract_config, ConfigV1};
use langproxy::i18n::StaticSource;
use langproxy::models::AuthToken;
use langproxy::routes::create_router;
use langproxy::session::memory_store::MemorySessionStore;
use langproxy::state::AppState;
use serde_json::Value;

pub const SESSION_ID: &str = "s-123";
pub const TOKEN: &str = "raw-token-value";

pub fn test_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
logging:
  level: debug
  format: console
api:
  base_url: {base_url}
  timeout_in_ms: 2000
  endpoints:
    user_details: /users/me
locales:
  types: ["en-US", "pl-PL"]
  names: ["English", "Polski"]
session:
  enabled: true
  cookie_name: sid
  type: memory
body_limit_bytes: 256
"#
    );
    extract_config(&Figment::new().merge(Yaml::string(&yaml))).expect("test config is valid")
}

pub fn messages() -> StaticSource {
    StaticSource::new()
        .with_locale(
            "en-US",
            [
                ("AuthSessionExpired", "Your session has expired"),
                ("NoDataFound", "Nothing to show"),
                ("NoOrdersFound", "No orders found"),
                ("LongDayNameSunday", "Sunday"),
            ],
        )
        .with_locale(
            "pl-PL",
            [
                ("AuthSessionExpired", "Twoja sesja wygasła"),
                ("NoDataFound", "Brak danych"),
                ("NoOrdersFound", "Nie znaleziono zamówień"),
                ("LongDayNameSunday", "Niedziela"),
                ("LongMonthNameJanuary", "styczeń"),
            ],
        )
}

/// Builds the router against `base_url`, with one logged-in session
/// (`sid=SESSION_ID`) holding `TOKEN`.
pub async fn build_app(base_url: &str) -> Router {
    let config = Arc::new(test_config(base_url));
    let sessions = Arc::new(MemorySessionStore::new());
    sessions
        .insert_token(SESSION_ID, &AuthToken::new(TOKEN, "2099-01-01T00:00:00Z"))
        .await;
    let state = AppState::build(config, Arc::new(messages()), sessions)
        .expect("failed to build state");
    create_router(state)
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).expect("failed to build request")
}

pub fn logged_in() -> String {
    format!("sid={}", SESSION_ID)
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

pub fn header_value<'a>(response: &'a Response<Body>, name: header::HeaderName) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
