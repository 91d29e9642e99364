use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

pub const LOGIN_PATH: &str = "/account/login";
pub const LOGOUT_PATH: &str = "/account/logout";

/// What a handler should do after an authenticated remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The remote call returned data.
    Proceed(Value),
    /// No token was available locally; no call was made.
    RedirectLogin,
    /// The remote API rejected the token. `warning` is already localized.
    RedirectLogout { warning: String },
    /// The call succeeded but had nothing to show.
    AbortWithWarning(String),
    /// Transport or decoding failure.
    AbortWithError(String),
}

impl RequestOutcome {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestOutcome::Proceed(_) => "proceed",
            RequestOutcome::RedirectLogin => "redirect_login",
            RequestOutcome::RedirectLogout { .. } => "redirect_logout",
            RequestOutcome::AbortWithWarning(_) => "abort_warning",
            RequestOutcome::AbortWithError(_) => "abort_error",
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            RequestOutcome::Proceed(data) => Some(data),
            _ => None,
        }
    }

    /// Narrows `Proceed` to a list of records. Any other data shape turns into
    /// `AbortWithWarning(shape_warning)`; non-proceed outcomes pass through.
    pub fn records(self, shape_warning: &str) -> Result<Vec<Value>, RequestOutcome> {
        match self {
            RequestOutcome::Proceed(Value::Array(records)) => Ok(records),
            RequestOutcome::Proceed(_) => {
                Err(RequestOutcome::AbortWithWarning(shape_warning.to_string()))
            }
            other => Err(other),
        }
    }

    /// Narrows `Proceed` to the first record of a list, which must be an object.
    pub fn first_record(self, shape_warning: &str) -> Result<Map<String, Value>, RequestOutcome> {
        let records = self.records(shape_warning)?;
        match records.into_iter().next() {
            Some(Value::Object(record)) => Ok(record),
            _ => Err(RequestOutcome::AbortWithWarning(shape_warning.to_string())),
        }
    }
}

fn redirect(location: &'static str, body: Option<Value>) -> Response {
    let mut response = match body {
        Some(body) => Json(body).into_response(),
        None => Response::default(),
    };
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(
        header::LOCATION,
        header::HeaderValue::from_static(location),
    );
    response
}

impl IntoResponse for RequestOutcome {
    fn into_response(self) -> Response {
        match self {
            RequestOutcome::Proceed(data) => {
                (StatusCode::OK, Json(json!({ "data": data }))).into_response()
            }
            RequestOutcome::RedirectLogin => redirect(LOGIN_PATH, None),
            RequestOutcome::RedirectLogout { warning } => {
                redirect(LOGOUT_PATH, Some(json!({ "warning": warning })))
            }
            RequestOutcome::AbortWithWarning(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "warning": message }))).into_response()
            }
            RequestOutcome::AbortWithError(message) => {
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}
