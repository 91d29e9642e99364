//! HTTP client for the remote API.
//!
//! Every call goes through one pooled `reqwest::Client`. Responses are decoded
//! into an [`Envelope`]; a 401 short-circuits to a synthetic envelope without
//! reading the body. Nothing is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::Envelope;
use crate::utils::log_throttle::LogThrottle;

const FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, DNS, timeout, or body read failure.
    #[error("{0}")]
    Transport(String),
    /// The body was not a valid envelope.
    #[error("{0}")]
    Parse(String),
}

#[derive(Clone)]
pub struct EnvelopeClient {
    http: reqwest::Client,
    base_url: String,
    throttle: Arc<LogThrottle>,
}

impl EnvelopeClient {
    /// Builds the shared client with the configured default timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .map_err(|e| ClientError::Transport(format!("Error building HTTP client: {}", e)))?;
        Ok(EnvelopeClient {
            http,
            base_url: config.base_url.clone(),
            throttle: Arc::new(LogThrottle::new(FAILURE_LOG_WINDOW)),
        })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Envelope, ClientError> {
        self.send(Method::GET, path, None, token, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<Envelope, ClientError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Parse(format!("Error encoding request body: {}", e)))?;
        self.send(Method::POST, path, Some(&body), token, None).await
    }

    /// Issues one call. `deadline` overrides the client's default timeout for
    /// this call only.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
        deadline: Option<Duration>,
    ) -> Result<Envelope, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending {} request to: {}", method, url);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            // raw token, no scheme prefix
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            let key = format!("client.request.failed.{}", method);
            match self.throttle.should_emit(&key) {
                Some(suppressed_count) => warn!(
                    event_name = "client.request.failed",
                    event_domain = "client",
                    method = method.as_str(),
                    url = url.as_str(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    suppressed_count,
                    "remote call failed: {}",
                    e
                ),
                None => debug!("remote call to {} failed: {}", url, e),
            }
            ClientError::Transport(format!("Error sending request: {}", e))
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Remote API rejected the token for {}", url);
            return Ok(Envelope::auth_expired());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("Error reading response body: {}", e)))?;
        Envelope::decode(&bytes)
            .map_err(|e| ClientError::Parse(format!("Error parsing response envelope: {}", e)))
    }
}
