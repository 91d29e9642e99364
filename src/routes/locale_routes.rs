//! Locale negotiation endpoint.
//!
//! `GET /locales` reports the negotiated locale for the request and the
//! alternatives a language menu would offer. When the locale was chosen with
//! `?lang=`, the response is a 302 to the same URL without the parameter and
//! the choice is persisted in the `lang` cookie.

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::i18n::negotiator::strip_override;
use crate::i18n::{CalendarNames, LocalePreference};
use crate::state::AppState;

const TODAY_PATTERN: &str = "%A, %d %B %Y";

pub fn routes() -> Router<AppState> {
    Router::new().route("/locales", get(current_locale))
}

async fn current_locale(
    State(state): State<AppState>,
    preference: LocalePreference,
    uri: Uri,
) -> Response {
    if preference.needs_redirect {
        let target = strip_override(&uri);
        debug!(locale = preference.code(), "redirecting to {}", target);
        return (StatusCode::FOUND, preference, [(header::LOCATION, target)]).into_response();
    }

    let catalog = state.catalog.snapshot();
    let calendar = CalendarNames::for_locale(catalog.translator(preference.code()));
    let body = json!({
        "locale": preference.locale,
        "source": preference.source,
        "alternatives": preference.alternatives,
        "today": calendar.format_date(Utc::now().date_naive(), TODAY_PATTERN),
        "calendar": calendar,
    });

    (preference, Json(body)).into_response()
}
