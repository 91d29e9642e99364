use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use tracing::error;

use crate::state::AppState;

/// The inbound request body, read in full on a best-effort basis.
///
/// A failed read never rejects the request: the bytes are empty and
/// [`CapturedBody::status`] reports 500 for the handler to answer with.
#[derive(Debug, Clone)]
pub struct CapturedBody {
    bytes: Bytes,
    failed: bool,
}

impl CapturedBody {
    pub async fn read(body: Body, limit: usize) -> Self {
        match axum::body::to_bytes(body, limit).await {
            Ok(bytes) => CapturedBody {
                bytes,
                failed: false,
            },
            Err(e) => {
                error!(
                    event_name = "body.read.failed",
                    event_domain = "body",
                    limit,
                    "Error reading request body: {}",
                    e
                );
                CapturedBody {
                    bytes: Bytes::new(),
                    failed: true,
                }
            }
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn status(&self) -> StatusCode {
        if self.failed {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }
}

impl FromRequest<AppState> for CapturedBody {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Infallible> {
        Ok(CapturedBody::read(req.into_body(), state.config.body_limit_bytes).await)
    }
}
