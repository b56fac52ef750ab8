use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::metrics::AppMetrics;

/// `GET /health` — liveness plus the process-wide request counters.
///
/// `averageResponseTime` is reported as a formatted string and falls back
/// to `"0ms"` before the first request completes, so there is never a
/// division by zero.
pub async fn health(State(metrics): State<Arc<AppMetrics>>) -> Json<Value> {
    let request_count = metrics.http_requests_total.get() as u64;
    let average_response_time = if request_count > 0 {
        format!("{:.2}ms", metrics.average_response_time_ms())
    } else {
        "0ms".to_string()
    };

    Json(json!({
        "status": "healthy",
        "uptime": metrics.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
        "metrics": {
            "requestCount": request_count,
            "averageResponseTime": average_response_time,
            "errors": metrics.http_errors_total.get() as u64,
        }
    }))
}
