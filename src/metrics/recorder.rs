//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording proxy metrics.
pub trait MetricsRecorder: Send + Sync + 'static {
    /// Records how a proxied request was resolved (`proceed`, `redirect_login`, ...).
    fn record_outcome(&self, outcome: &str, method: &str);

    /// Records one call to the remote API. `result` is `ok`, `auth_expired`,
    /// `transport_error` or `parse_error`.
    fn record_remote_call(&self, method: &str, result: &str, duration_secs: f64);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    outcomes_total: CounterVec,
    remote_calls_total: CounterVec,
    remote_call_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let outcomes_total = register_counter_vec_with_registry!(
            Opts::new(
                "proxy_outcomes_total",
                "Proxied requests by how they were resolved"
            ),
            &["outcome", "method"],
            registry.clone()
        )?;

        let remote_calls_total = register_counter_vec_with_registry!(
            Opts::new("proxy_remote_calls_total", "Calls made to the remote API"),
            &["method", "result"],
            registry.clone()
        )?;

        let remote_call_duration_seconds = register_histogram_vec_with_registry!(
            "proxy_remote_call_duration_seconds",
            "Remote API call duration in seconds",
            &["method"],
            vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            registry.clone()
        )?;

        Ok(Metrics {
            registry,
            outcomes_total,
            remote_calls_total,
            remote_call_duration_seconds,
        })
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl MetricsRecorder for Metrics {
    fn record_outcome(&self, outcome: &str, method: &str) {
        self.outcomes_total
            .with_label_values(&[outcome, method])
            .inc();
    }

    fn record_remote_call(&self, method: &str, result: &str, duration_secs: f64) {
        self.remote_calls_total
            .with_label_values(&[method, result])
            .inc();
        self.remote_call_duration_seconds
            .with_label_values(&[method])
            .observe(duration_secs);
    }
}
