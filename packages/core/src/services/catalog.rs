//! Typed HTTP client for the course catalog API.
//!
//! Mirrors the server operations for consumers that talk to the service
//! over the wire (the web frontend goes through this facade). Any
//! non-success status fails with a generic operation-failed signal; the
//! response body of a failed call is never interpreted.

use reqwest::Client;
use serde::Serialize;

use crate::api::cursos::PromedioCreditosResponse;
use crate::error::AppError;
use crate::repository::Curso;

#[derive(Clone)]
pub struct CatalogClient {
    base_url: String,
    http: Client,
}

/// Payload for creating a course.
#[derive(Debug, Clone, Serialize)]
pub struct CursoInput {
    pub nombre: String,
    pub descripcion: String,
    pub creditos: i64,
    pub area: String,
}

/// Partial payload for updating a course. Absent fields are omitted from
/// the request body entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CursoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditos: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

impl CatalogClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /cursos`, optionally filtered by area. The filter value is
    /// URL-encoded by the query builder.
    pub async fn fetch_cursos(&self, area: Option<&str>) -> Result<Vec<Curso>, AppError> {
        let url = format!("{}/cursos", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(area) = area {
            request = request.query(&[("area", area)]);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Error fetching cursos: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Curso>>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))
    }

    /// `GET /cursos/:id`
    pub async fn fetch_curso_by_id(&self, id: i64) -> Result<Curso, AppError> {
        let url = format!("{}/cursos/{}", self.base_url, id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Error fetching curso: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Curso>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))
    }

    /// `POST /cursos`
    pub async fn create_curso(&self, curso: &CursoInput) -> Result<Curso, AppError> {
        let url = format!("{}/cursos", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(curso)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Error creating curso: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Curso>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))
    }

    /// `PUT /cursos/:id`
    pub async fn update_curso(&self, id: i64, changes: &CursoUpdate) -> Result<Curso, AppError> {
        let url = format!("{}/cursos/{}", self.base_url, id);

        let response = self
            .http
            .put(&url)
            .json(changes)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Error updating curso: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Curso>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))
    }

    /// `DELETE /cursos/:id` — expects no body back.
    pub async fn delete_curso(&self, id: i64) -> Result<(), AppError> {
        let url = format!("{}/cursos/{}", self.base_url, id);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Error deleting curso: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// `GET /cursos/promedio-creditos`
    pub async fn fetch_promedio_creditos(&self) -> Result<f64, AppError> {
        let url = format!("{}/cursos/promedio-creditos", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Error fetching average credits: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .json::<PromedioCreditosResponse>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))?;

        Ok(body.promedio_creditos)
    }
}
