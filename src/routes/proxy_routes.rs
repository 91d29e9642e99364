//! Proxied calls to the remote API.
//!
//! Each handler negotiates the locale, recovers the session token and hands
//! the call to [`ApiProxy`]; the resulting [`RequestOutcome`] is the response.

use std::borrow::Cow;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::body::CapturedBody;
use crate::i18n::negotiator::strip_override;
use crate::i18n::LocalePreference;
use crate::models::RequestOutcome;
use crate::proxy::ApiProxy;
use crate::session::SessionToken;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Request header naming the message shown when the API returns no data.
pub const EMPTY_MESSAGE_HEADER: &str = "x-empty-message-key";
pub const DEFAULT_EMPTY_MESSAGE_KEY: &str = "NoDataFound";
/// Optional request header: milliseconds the remote call may take.
pub const DEADLINE_HEADER: &str = "x-request-timeout-ms";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/{*path}", get(proxied_get).post(proxied_post))
        .route("/public/{*path}", get(public_get))
}

fn absent_data_key(headers: &HeaderMap) -> &str {
    headers
        .get(EMPTY_MESSAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty())
        .unwrap_or(DEFAULT_EMPTY_MESSAGE_KEY)
}

/// The proxy to use for this request, bounded by [`DEADLINE_HEADER`] when
/// the caller sent a usable one.
fn scoped_proxy<'a>(proxy: &'a ApiProxy, headers: &HeaderMap) -> Cow<'a, ApiProxy> {
    let deadline = headers
        .get(DEADLINE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|millis| *millis > 0);
    match deadline {
        Some(millis) => Cow::Owned(proxy.with_deadline(Duration::from_millis(millis))),
        None => Cow::Borrowed(proxy),
    }
}

/// Re-encodes the decoded route capture so that it stays a relative path
/// below the API base URL.
///
/// `.` and `..` segments, `?` and `#` are refused rather than encoded.
fn encode_path(path: &str) -> Result<String, HTTPError> {
    let segments: Vec<&str> = path.split('/').collect();
    let refused = segments
        .iter()
        .any(|segment| matches!(*segment, "." | "..") || segment.contains(['?', '#']));
    if refused {
        warn!(
            event_name = "proxy.path.rejected",
            event_domain = "proxy",
            "Refusing to forward path '{}'",
            path
        );
        return Err(HTTPError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid API path '{}'", path),
        ));
    }

    let mut url = Url::parse("http://api.invalid/")
        .map_err(|e| HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "Error encoding path"))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// The remote path for a captured route segment: a configured endpoint name
/// or the encoded segment itself, with the inbound query minus `lang`
/// appended.
fn remote_path(proxy: &ApiProxy, path: &str, uri: &Uri) -> Result<String, HTTPError> {
    let base = match proxy.endpoint(path) {
        Some(endpoint) => endpoint.to_string(),
        None => encode_path(path)?,
    };
    Ok(match strip_override(uri).split_once('?') {
        Some((_, query)) => format!("{}?{}", base, query),
        None => base,
    })
}

async fn proxied_get(
    State(state): State<AppState>,
    preference: LocalePreference,
    SessionToken(token): SessionToken,
    Path(path): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<(LocalePreference, RequestOutcome), HTTPError> {
    let target = remote_path(&state.proxy, &path, &uri)?;
    let catalog = state.catalog.snapshot();
    let outcome = scoped_proxy(&state.proxy, &headers)
        .fetch(
            token.as_ref(),
            &target,
            absent_data_key(&headers),
            catalog.translator(preference.code()),
        )
        .await;
    Ok((preference, outcome))
}

async fn public_get(
    State(state): State<AppState>,
    preference: LocalePreference,
    Path(path): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<(LocalePreference, RequestOutcome), HTTPError> {
    let target = remote_path(&state.proxy, &path, &uri)?;
    let catalog = state.catalog.snapshot();
    let outcome = scoped_proxy(&state.proxy, &headers)
        .fetch_public(
            &target,
            absent_data_key(&headers),
            catalog.translator(preference.code()),
        )
        .await;
    Ok((preference, outcome))
}

/// Forwards the captured JSON body. An empty body is posted as nothing at all.
async fn proxied_post(
    State(state): State<AppState>,
    preference: LocalePreference,
    SessionToken(token): SessionToken,
    Path(path): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: CapturedBody,
) -> Response {
    if body.failed() {
        return HTTPError::new(body.status(), "Error reading request body").into_response();
    }

    let payload = if body.bytes().is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(body.bytes()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Rejecting request body that is not JSON: {}", e);
                return HTTPError::new(
                    StatusCode::BAD_REQUEST,
                    format!("Request body is not valid JSON: {}", e),
                )
                .into_response();
            }
        }
    };

    let target = match remote_path(&state.proxy, &path, &uri) {
        Ok(target) => target,
        Err(e) => return e.into_response(),
    };
    let catalog = state.catalog.snapshot();
    let outcome = scoped_proxy(&state.proxy, &headers)
        .submit(
            token.as_ref(),
            &target,
            &payload,
            absent_data_key(&headers),
            catalog.translator(preference.code()),
        )
        .await;
    (preference, outcome).into_response()
}
