//! The authenticated proxy pipeline: token check, remote call, classification.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{ClientError, EnvelopeClient};
use crate::config::ApiConfig;
use crate::guard::classify;
use crate::i18n::Translator;
use crate::metrics::MetricsRecorder;
use crate::models::{AuthToken, Envelope, RequestOutcome};

/// Cloning is cheap: the HTTP pool, endpoint table and metrics are shared.
#[derive(Clone)]
pub struct ApiProxy {
    client: EnvelopeClient,
    endpoints: Arc<HashMap<String, String>>,
    metrics: Arc<dyn MetricsRecorder>,
    deadline: Option<Duration>,
}

impl ApiProxy {
    pub fn new(config: &ApiConfig, metrics: Arc<dyn MetricsRecorder>) -> Result<Self, ClientError> {
        info!(
            "Creating API proxy for '{}' with {} named endpoints",
            config.base_url,
            config.endpoints.len()
        );
        Ok(ApiProxy {
            client: EnvelopeClient::new(config)?,
            endpoints: Arc::new(config.endpoints.clone()),
            metrics,
            deadline: None,
        })
    }

    /// A proxy whose remote calls give up after `deadline` instead of the
    /// configured default timeout. Expiry surfaces as `AbortWithError`.
    pub fn with_deadline(&self, deadline: Duration) -> Self {
        ApiProxy {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// The path configured under `name`, if any. Callers resolve names
    /// before calling; every other method takes a relative path.
    pub fn endpoint(&self, name: &str) -> Option<&str> {
        self.endpoints.get(name).map(String::as_str)
    }

    /// Authenticated GET. Without a token the outcome is `RedirectLogin` and
    /// no call is made.
    pub async fn fetch(
        &self,
        token: Option<&AuthToken>,
        path: &str,
        absent_data_key: &str,
        translator: Translator<'_>,
    ) -> RequestOutcome {
        let Some(token) = token else {
            return self.finish(RequestOutcome::RedirectLogin, &Method::GET);
        };
        let result = self.call(Method::GET, path, None, Some(&token.value)).await;
        self.finish(classify(result, absent_data_key, translator), &Method::GET)
    }

    /// GET for endpoints that need no authentication.
    pub async fn fetch_public(
        &self,
        path: &str,
        absent_data_key: &str,
        translator: Translator<'_>,
    ) -> RequestOutcome {
        let result = self.call(Method::GET, path, None, None).await;
        self.finish(classify(result, absent_data_key, translator), &Method::GET)
    }

    /// Authenticated POST of a JSON body.
    ///
    /// A `null` body is never sent: it yields an empty envelope, which
    /// classifies as a warning.
    pub async fn submit(
        &self,
        token: Option<&AuthToken>,
        path: &str,
        body: &Value,
        absent_data_key: &str,
        translator: Translator<'_>,
    ) -> RequestOutcome {
        let Some(token) = token else {
            return self.finish(RequestOutcome::RedirectLogin, &Method::POST);
        };
        let result = if body.is_null() {
            debug!("Not posting an empty body to {}", path);
            Ok(Envelope::default())
        } else {
            self.call(Method::POST, path, Some(body), Some(&token.value))
                .await
        };
        self.finish(classify(result, absent_data_key, translator), &Method::POST)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Envelope, ClientError> {
        let started = Instant::now();
        let result = self
            .client
            .send(method.clone(), path, body, token, self.deadline)
            .await;

        let label = match &result {
            Ok(envelope) if envelope.is_auth_expired() => "auth_expired",
            Ok(_) => "ok",
            Err(ClientError::Transport(_)) => "transport_error",
            Err(ClientError::Parse(_)) => "parse_error",
        };
        self.metrics
            .record_remote_call(method.as_str(), label, started.elapsed().as_secs_f64());
        result
    }

    fn finish(&self, outcome: RequestOutcome, method: &Method) -> RequestOutcome {
        debug!(
            event_name = "proxy.outcome",
            event_domain = "proxy",
            outcome = outcome.kind(),
            method = method.as_str(),
            "request resolved"
        );
        self.metrics.record_outcome(outcome.kind(), method.as_str());
        outcome
    }
}
