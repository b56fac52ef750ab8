//! Prometheus metrics registry for the course catalog service.
//!
//! [`AppMetrics`] owns all registered metrics, the [`Registry`] they belong
//! to, and the process start time. Construct it once at startup, wrap in
//! `Arc`, and hand it to the request middleware and the health handler.
//! Counters reset only on process restart; nothing here is persisted.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{Counter, Histogram, HistogramOpts, Opts, Registry};
use tracing::info;

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Every completed HTTP request.
    pub http_requests_total: Counter,
    /// Completed responses with status >= 400.
    pub http_errors_total: Counter,
    /// Cumulative response time in milliseconds, for the health average.
    pub http_response_time_ms_total: Counter,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
    started_at: Instant,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated (should not happen in practice).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = Counter::with_opts(Opts::new(
            "curso_catalog_http_requests_total",
            "Completed HTTP requests",
        ))?;

        let http_errors_total = Counter::with_opts(Opts::new(
            "curso_catalog_http_errors_total",
            "HTTP responses with status >= 400",
        ))?;

        let http_response_time_ms_total = Counter::with_opts(Opts::new(
            "curso_catalog_http_response_time_ms_total",
            "Cumulative HTTP response time in milliseconds",
        ))?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "curso_catalog_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_errors_total.clone()))?;
        registry.register(Box::new(http_response_time_ms_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            http_requests_total,
            http_errors_total,
            http_response_time_ms_total,
            http_request_duration,
            registry,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the metrics (and so the process) started.
    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Mean response time in milliseconds; 0 before any request completes.
    pub fn average_response_time_ms(&self) -> f64 {
        let count = self.http_requests_total.get();
        if count > 0.0 {
            self.http_response_time_ms_total.get() / count
        } else {
            0.0
        }
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

/// Axum middleware: time every request and record its outcome once the
/// response is ready.
pub async fn track_requests(
    State(metrics): State<Arc<AppMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let status = response.status();

    metrics.http_requests_total.inc();
    metrics.http_response_time_ms_total.inc_by(elapsed_ms);
    metrics.http_request_duration.observe(elapsed_ms / 1000.0);
    if status.is_client_error() || status.is_server_error() {
        metrics.http_errors_total.inc();
    }

    info!(
        "{} {} - {} - {:.0}ms",
        method,
        path,
        status.as_u16(),
        elapsed_ms
    );

    response
}
