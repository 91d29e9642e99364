//! Per-request locale negotiation.
//!
//! Candidates are tried in a fixed order: the `lang` query parameter, the
//! `lang` cookie, the first five characters of `Accept-Language`, and finally
//! [`DEFAULT_LOCALE`]. A candidate the catalog does not know is dropped as if
//! it had never been sent.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::{HeaderValue, ACCEPT_LANGUAGE, SET_COOKIE};
use axum::http::Uri;
use axum::response::{IntoResponseParts, ResponseParts};
use http::request::Parts;
use serde::Serialize;
use tracing::{debug, error};

use super::catalog::{Locale, LocaleCatalog, DEFAULT_LOCALE};
use crate::state::AppState;
use crate::utils::http_helpers::cookie_value;

/// Query parameter carrying an explicit locale override.
pub const LANG_PARAM: &str = "lang";
/// Cookie holding the stored locale preference.
pub const LANG_COOKIE: &str = "lang";
/// `2^31 - 1` seconds, roughly 68 years.
pub const PREFERENCE_MAX_AGE: u32 = 2_147_483_647;
const ACCEPT_LANGUAGE_PREFIX: usize = 5;

/// The raw locale hints found on a request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NegotiationInputs {
    pub override_code: Option<String>,
    pub stored_preference: Option<String>,
    pub accept_language: Option<String>,
}

impl NegotiationInputs {
    pub fn from_parts(parts: &Parts) -> Self {
        let override_code = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(mut params)| params.remove(LANG_PARAM));
        let stored_preference = cookie_value(&parts.headers, LANG_COOKIE).map(str::to_string);
        let accept_language = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        NegotiationInputs {
            override_code: override_code.filter(|code| !code.is_empty()),
            stored_preference: stored_preference.filter(|code| !code.is_empty()),
            accept_language,
        }
    }
}

/// Which hint the negotiated locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocaleSource {
    Override,
    StoredPreference,
    AcceptLanguage,
    Default,
}

/// The outcome of negotiation for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalePreference {
    pub locale: Locale,
    /// Every other catalog locale, for language menus.
    pub alternatives: Vec<Locale>,
    pub source: LocaleSource,
    /// Set when the locale came from the query override. The caller is
    /// expected to redirect to the same URL without the `lang` parameter.
    pub needs_redirect: bool,
}

impl LocalePreference {
    pub fn code(&self) -> &str {
        &self.locale.code
    }

    pub fn display_name(&self) -> &str {
        &self.locale.display_name
    }

    /// The `Set-Cookie` value to persist this choice, unless it already came
    /// from the cookie.
    pub fn preference_cookie(&self) -> Option<String> {
        if self.source == LocaleSource::StoredPreference {
            return None;
        }
        Some(format!(
            "{}={}; Path=/; Max-Age={}",
            LANG_COOKIE, self.locale.code, PREFERENCE_MAX_AGE
        ))
    }
}

/// Picks the active locale for a request.
pub fn negotiate(catalog: &LocaleCatalog, inputs: &NegotiationInputs) -> LocalePreference {
    let (code, source) = if let Some(code) = known(catalog, inputs.override_code.as_deref()) {
        (code, LocaleSource::Override)
    } else if let Some(code) = known(catalog, inputs.stored_preference.as_deref()) {
        (code, LocaleSource::StoredPreference)
    } else if let Some(code) = accept_language_match(catalog, inputs.accept_language.as_deref()) {
        (code, LocaleSource::AcceptLanguage)
    } else {
        (DEFAULT_LOCALE, LocaleSource::Default)
    };

    if let Some(rejected) = inputs.override_code.as_deref().filter(|c| !catalog.is_known(c)) {
        debug!(locale = rejected, "ignoring unknown locale override");
    }

    let locale = catalog.get(code).cloned().unwrap_or_else(|| Locale {
        code: code.to_string(),
        display_name: code.to_string(),
    });
    let alternatives = catalog
        .list()
        .iter()
        .filter(|candidate| candidate.code != code)
        .cloned()
        .collect();

    LocalePreference {
        locale,
        alternatives,
        source,
        needs_redirect: source == LocaleSource::Override,
    }
}

fn known<'a>(catalog: &LocaleCatalog, code: Option<&'a str>) -> Option<&'a str> {
    code.filter(|c| catalog.is_known(c))
}

/// Only the first five characters of the header are compared, and they must
/// equal a known code exactly (`pl-PL,pl;q=0.9` matches `pl-PL`).
fn accept_language_match<'a>(catalog: &LocaleCatalog, header: Option<&'a str>) -> Option<&'a str> {
    header
        .and_then(|value| value.get(..ACCEPT_LANGUAGE_PREFIX))
        .filter(|prefix| catalog.is_known(prefix))
}

/// The request URI with the `lang` override removed, as a redirect target.
pub fn strip_override(uri: &Uri) -> String {
    let path = uri.path();
    let remaining: Vec<&str> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(LANG_PARAM))
        .collect();

    if remaining.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, remaining.join("&"))
    }
}

/// Negotiates from the request, re-running the (idempotent) catalog load first.
impl FromRequestParts<AppState> for LocalePreference {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        let locales = &state.config.locales;
        let catalog = match state.catalog.load(&locales.types, &locales.names) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Locale catalog load failed: {}", e);
                state.catalog.snapshot()
            }
        };
        Ok(negotiate(&catalog, &NegotiationInputs::from_parts(parts)))
    }
}

/// Returning the preference from a handler persists it as the `lang` cookie.
impl IntoResponseParts for LocalePreference {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Infallible> {
        if let Some(cookie) = self.preference_cookie() {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    res.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => error!("Locale cookie is not a valid header value: {}", e),
            }
        }
        Ok(res)
    }
}
