//! CRUD endpoints for the `cursos` resource.
//!
//! Routes:
//! - `GET    /cursos`                   — list, optional `?area=` filter
//! - `GET    /cursos/promedio-creditos` — average credits across the table
//! - `GET    /cursos/:id`               — fetch one
//! - `POST   /cursos`                   — create
//! - `PUT    /cursos/:id`               — partial update
//! - `DELETE /cursos/:id`               — hard delete

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AppError;
use crate::repository::{Curso, CursoChanges, CursoStore, NewCurso};

/// Shared state for the cursos routes.
pub type CursosState = Arc<dyn CursoStore>;

// ---- Request / response shapes ----

#[derive(Debug, Deserialize)]
pub struct ListCursosQuery {
    pub area: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCursoRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub creditos: Option<i64>,
    pub area: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCursoRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub creditos: Option<i64>,
    pub area: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromedioCreditosResponse {
    #[serde(rename = "promedioCreditos")]
    pub promedio_creditos: f64,
}

// ---- Helpers ----

/// Path ids arrive as raw strings; anything that does not parse behaves
/// as "no such row" rather than a type error.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

// ---- Handlers ----

/// `GET /cursos` — list all courses, optionally filtered by exact `area`.
/// An empty `area` value means "no filter".
pub async fn list_cursos(
    State(store): State<CursosState>,
    Query(params): Query<ListCursosQuery>,
) -> Result<Json<Vec<Curso>>, AppError> {
    let area = params.area.as_deref().filter(|a| !a.is_empty());

    let cursos = store.list(area).await.map_err(|err| {
        error!("Error fetching cursos: {}", err);
        AppError::Internal("Error fetching cursos".to_string())
    })?;

    Ok(Json(cursos))
}

/// `GET /cursos/promedio-creditos` — mean of `creditos`; 0 when the table
/// is empty.
pub async fn promedio_creditos(
    State(store): State<CursosState>,
) -> Result<Json<PromedioCreditosResponse>, AppError> {
    let promedio = store.average_creditos().await.map_err(|err| {
        error!("Error calculating average: {}", err);
        AppError::Internal("Error calculating average credits".to_string())
    })?;

    Ok(Json(PromedioCreditosResponse {
        promedio_creditos: promedio,
    }))
}

/// `GET /cursos/:id`
pub async fn get_curso(
    State(store): State<CursosState>,
    Path(id): Path<String>,
) -> Result<Json<Curso>, AppError> {
    let Some(id) = parse_id(&id) else {
        return Err(AppError::NotFound);
    };

    let curso = store
        .find_by_id(id)
        .await
        .map_err(|err| {
            error!("Error fetching curso: {}", err);
            AppError::Internal("Error fetching curso".to_string())
        })?
        .ok_or(AppError::NotFound)?;

    Ok(Json(curso))
}

/// `POST /cursos` — create a course.
///
/// All four fields are required; text fields must be non-empty. `creditos`
/// is checked for presence only, so `0` is a valid value.
pub async fn create_curso(
    State(store): State<CursosState>,
    Json(body): Json<CreateCursoRequest>,
) -> Result<(StatusCode, Json<Curso>), AppError> {
    let nuevo = match (body.nombre, body.descripcion, body.creditos, body.area) {
        (Some(nombre), Some(descripcion), Some(creditos), Some(area))
            if !nombre.is_empty() && !descripcion.is_empty() && !area.is_empty() =>
        {
            NewCurso {
                nombre,
                descripcion,
                creditos,
                area,
            }
        }
        _ => return Err(AppError::Validation("Missing required fields".to_string())),
    };

    let curso = store.insert(nuevo).await.map_err(|err| {
        error!("Error creating curso: {}", err);
        AppError::Internal("Error creating curso".to_string())
    })?;

    Ok((StatusCode::CREATED, Json(curso)))
}

/// `PUT /cursos/:id` — partial update.
///
/// A text field supplied as an empty string counts as "not supplied" and
/// is skipped; `creditos` applies whenever present, including `0`. The
/// empty-payload check runs before the id is even parsed, so no storage
/// is touched for a payload with no recognized fields.
pub async fn update_curso(
    State(store): State<CursosState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCursoRequest>,
) -> Result<Json<Curso>, AppError> {
    let changes = CursoChanges {
        nombre: body.nombre.filter(|v| !v.is_empty()),
        descripcion: body.descripcion.filter(|v| !v.is_empty()),
        creditos: body.creditos,
        area: body.area.filter(|v| !v.is_empty()),
    };

    if changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let Some(id) = parse_id(&id) else {
        return Err(AppError::NotFound);
    };

    let curso = store
        .update(id, changes)
        .await
        .map_err(|err| {
            error!("Error updating curso: {}", err);
            AppError::Internal("Error updating curso".to_string())
        })?
        .ok_or(AppError::NotFound)?;

    Ok(Json(curso))
}

/// `DELETE /cursos/:id` — hard delete; 204 with no body on success.
pub async fn delete_curso(
    State(store): State<CursosState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let Some(id) = parse_id(&id) else {
        return Err(AppError::NotFound);
    };

    let deleted = store.delete(id).await.map_err(|err| {
        error!("Error deleting curso: {}", err);
        AppError::Internal("Error deleting curso".to_string())
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request},
        routing::{get, post},
        Router,
    };
    use http_body_util::BodyExt;
    use proptest::prelude::*;
    use tower::ServiceExt;

    use crate::db::create_pool;
    use crate::repository::{CursoRepository, CursoStore};

    fn routes(store: CursosState) -> Router {
        Router::new()
            .route("/cursos", post(create_curso).get(list_cursos))
            .route("/cursos/promedio-creditos", get(promedio_creditos))
            .route(
                "/cursos/:id",
                get(get_curso).put(update_curso).delete(delete_curso),
            )
            .with_state(store)
    }

    async fn make_app() -> Router {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        routes(Arc::new(CursoRepository::new(pool)))
    }

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn post_creates_curso_with_201() {
        let app = make_app().await;
        let req = post_json(
            "/cursos",
            r#"{"nombre":"Química","descripcion":"Curso de química","creditos":3,"area":"Ciencias"}"#,
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["nombre"], "Química");
        assert_eq!(json["creditos"], 3);
    }

    #[tokio::test]
    async fn post_missing_fields_returns_400() {
        let app = make_app().await;
        let req = post_json("/cursos", r#"{"nombre":"Química"}"#);

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn post_empty_text_field_returns_400() {
        let app = make_app().await;
        let req = post_json(
            "/cursos",
            r#"{"nombre":"","descripcion":"Curso","creditos":3,"area":"Ciencias"}"#,
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_creditos_zero_is_present() {
        let app = make_app().await;
        let req = post_json(
            "/cursos",
            r#"{"nombre":"Taller","descripcion":"Sin créditos","creditos":0,"area":"Artes"}"#,
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["creditos"], 0);
    }

    #[tokio::test]
    async fn get_non_numeric_id_returns_404() {
        let app = make_app().await;
        let req = Request::builder()
            .uri("/cursos/abc")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "Curso not found");
    }

    #[tokio::test]
    async fn put_empty_payload_returns_400_before_id_parse() {
        let app = make_app().await;
        // Even a garbage id fails on the empty payload first.
        let req = put_json("/cursos/abc", r#"{}"#);

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "No fields to update");
    }

    #[tokio::test]
    async fn put_all_empty_strings_counts_as_no_fields() {
        let app = make_app().await;
        let req = put_json("/cursos/1", r#"{"nombre":"","descripcion":"","area":""}"#);

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ---- Storage failure paths ----

    struct FailingStore;

    #[async_trait]
    impl CursoStore for FailingStore {
        async fn list(&self, _area: Option<&str>) -> Result<Vec<Curso>, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn average_creditos(&self) -> Result<f64, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Curso>, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn insert(&self, _nuevo: NewCurso) -> Result<Curso, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn update(
            &self,
            _id: i64,
            _changes: CursoChanges,
        ) -> Result<Option<Curso>, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn delete(&self, _id: i64) -> Result<bool, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }
    }

    fn failing_app() -> Router {
        routes(Arc::new(FailingStore))
    }

    #[tokio::test]
    async fn storage_failure_on_list_returns_500_with_generic_message() {
        let req = Request::builder()
            .uri("/cursos")
            .body(Body::empty())
            .unwrap();

        let resp = failing_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "Error fetching cursos");
    }

    #[tokio::test]
    async fn storage_failure_on_create_returns_500() {
        let req = post_json(
            "/cursos",
            r#"{"nombre":"Química","descripcion":"Curso","creditos":3,"area":"Ciencias"}"#,
        );

        let resp = failing_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "Error creating curso");
    }

    #[tokio::test]
    async fn storage_failure_on_average_returns_500() {
        let req = Request::builder()
            .uri("/cursos/promedio-creditos")
            .body(Body::empty())
            .unwrap();

        let resp = failing_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], "Error calculating average credits");
    }

    #[tokio::test]
    async fn validation_rejects_before_touching_failing_store() {
        // A missing-fields create never reaches the store, so even a
        // broken backend answers 400 rather than 500.
        let req = post_json("/cursos", r#"{"nombre":"Química"}"#);

        let resp = failing_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_update_rejects_before_touching_failing_store() {
        let req = put_json("/cursos/1", r#"{}"#);

        let resp = failing_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ---- parse_id ----

    proptest! {
        #[test]
        fn parse_id_accepts_any_integer(id in any::<i64>()) {
            prop_assert_eq!(parse_id(&id.to_string()), Some(id));
        }

        #[test]
        fn parse_id_rejects_non_numeric(raw in "[a-zA-Z ]{1,12}") {
            prop_assert_eq!(parse_id(&raw), None);
        }
    }
}
