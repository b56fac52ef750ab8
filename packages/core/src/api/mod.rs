//! HTTP surface: route handlers and router assembly.

pub mod cursos;
pub mod health;

use std::sync::Arc;

use axum::{
    body::Body,
    http::header,
    middleware,
    response::Response,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::metrics::{track_requests, AppMetrics};
use crate::repository::CursoStore;

/// Assemble the full application router. `main.rs` and the integration
/// tests share this, so both exercise the same middleware stack.
pub fn router(store: Arc<dyn CursoStore>, metrics: Arc<AppMetrics>) -> Router {
    let metrics_for_endpoint = metrics.clone();

    let cursos_router = Router::new()
        .route(
            "/cursos",
            get(cursos::list_cursos).post(cursos::create_curso),
        )
        .route("/cursos/promedio-creditos", get(cursos::promedio_creditos))
        .route(
            "/cursos/:id",
            get(cursos::get_curso)
                .put(cursos::update_curso)
                .delete(cursos::delete_curso),
        )
        .with_state(store);

    let health_router = Router::new()
        .route("/health", get(health::health))
        .with_state(metrics.clone());

    Router::new()
        .route(
            "/metrics",
            get(move || {
                let m = metrics_for_endpoint.clone();
                async move {
                    match m.render() {
                        Ok(body) => Response::builder()
                            .status(200)
                            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                            .body(Body::from(body))
                            .expect("metrics response should be valid"),
                        Err(_) => Response::builder()
                            .status(500)
                            .body(Body::from("metrics error"))
                            .expect("metrics error response should be valid"),
                    }
                }
            }),
        )
        .merge(health_router)
        .merge(cursos_router)
        .layer(middleware::from_fn_with_state(metrics, track_requests))
        .layer(CorsLayer::permissive())
}
