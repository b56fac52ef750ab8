//! Persistence accessor for the `cursos` table.
//!
//! All SQLite read/write logic lives here. Every dynamic value is bound as
//! a query parameter — the partial UPDATE composes its statement from fixed
//! column fragments only, never from user input.
//!
//! Handlers depend on the [`CursoStore`] trait rather than the concrete
//! repository so tests can substitute a failing store for the 500 paths.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// A single course catalog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curso {
    pub id: i64,
    pub nombre: String,
    pub descripcion: String,
    pub creditos: i64,
    pub area: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Field values for a new course. All four are required; the handler
/// validates presence before this reaches the repository.
#[derive(Debug, Clone)]
pub struct NewCurso {
    pub nombre: String,
    pub descripcion: String,
    pub creditos: i64,
    pub area: String,
}

/// The subset of columns a partial update writes. `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Default)]
pub struct CursoChanges {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub creditos: Option<i64>,
    pub area: Option<String>,
}

impl CursoChanges {
    /// `true` when no column would be written.
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.descripcion.is_none()
            && self.creditos.is_none()
            && self.area.is_none()
    }
}

/// Storage operations the course handlers depend on.
#[async_trait]
pub trait CursoStore: Send + Sync {
    /// All courses, optionally restricted to an exact `area` match,
    /// ordered by id ascending.
    async fn list(&self, area: Option<&str>) -> Result<Vec<Curso>, sqlx::Error>;

    /// Arithmetic mean of `creditos` across the table; 0 when empty.
    async fn average_creditos(&self) -> Result<f64, sqlx::Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Curso>, sqlx::Error>;

    /// Insert a new row and return the stored record, including the
    /// assigned id and timestamps.
    async fn insert(&self, nuevo: NewCurso) -> Result<Curso, sqlx::Error>;

    /// Apply only the supplied columns. `None` means no row matched the
    /// id. Callers must not pass empty changes.
    async fn update(&self, id: i64, changes: CursoChanges) -> Result<Option<Curso>, sqlx::Error>;

    /// Delete by id. The row count distinguishes "deleted" from "nothing
    /// matched" without a second round trip.
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}

/// Repository for reading and writing courses to SQLite.
pub struct CursoRepository {
    pool: SqlitePool,
}

impl CursoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn curso_from_row(row: &SqliteRow) -> Option<Curso> {
    Some(Curso {
        id: row.try_get("id").ok()?,
        nombre: row.try_get("nombre").ok()?,
        descripcion: row.try_get("descripcion").ok()?,
        creditos: row.try_get("creditos").ok()?,
        area: row.try_get("area").ok()?,
        created_at: row.try_get("created_at").ok()?,
        updated_at: row.try_get("updated_at").ok()?,
    })
}

#[async_trait]
impl CursoStore for CursoRepository {
    async fn list(&self, area: Option<&str>) -> Result<Vec<Curso>, sqlx::Error> {
        let rows = match area {
            Some(area) => {
                sqlx::query("SELECT * FROM cursos WHERE area = ? ORDER BY id ASC")
                    .bind(area)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM cursos ORDER BY id ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.iter().filter_map(curso_from_row).collect())
    }

    async fn average_creditos(&self) -> Result<f64, sqlx::Error> {
        let row = sqlx::query("SELECT AVG(creditos) as promedio FROM cursos")
            .fetch_one(&self.pool)
            .await?;

        // AVG over an empty table is NULL; normalize to 0.
        let promedio: Option<f64> = row.try_get("promedio")?;
        Ok(promedio.unwrap_or(0.0))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Curso>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM cursos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().and_then(curso_from_row))
    }

    async fn insert(&self, nuevo: NewCurso) -> Result<Curso, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO cursos (nombre, descripcion, creditos, area, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&nuevo.nombre)
        .bind(&nuevo.descripcion)
        .bind(nuevo.creditos)
        .bind(&nuevo.area)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    async fn update(&self, id: i64, changes: CursoChanges) -> Result<Option<Curso>, sqlx::Error> {
        // The SET clause is assembled from fixed fragments; values are
        // bound in the same order the fragments were pushed.
        let mut columns = Vec::new();
        if changes.nombre.is_some() {
            columns.push("nombre = ?");
        }
        if changes.descripcion.is_some() {
            columns.push("descripcion = ?");
        }
        if changes.creditos.is_some() {
            columns.push("creditos = ?");
        }
        if changes.area.is_some() {
            columns.push("area = ?");
        }
        columns.push("updated_at = ?");

        let sql = format!("UPDATE cursos SET {} WHERE id = ?", columns.join(", "));
        let now = Utc::now().to_rfc3339();

        let result = {
            let mut query = sqlx::query(&sql);
            if let Some(nombre) = &changes.nombre {
                query = query.bind(nombre);
            }
            if let Some(descripcion) = &changes.descripcion {
                query = query.bind(descripcion);
            }
            if let Some(creditos) = changes.creditos {
                query = query.bind(creditos);
            }
            if let Some(area) = &changes.area {
                query = query.bind(area);
            }
            query.bind(&now).bind(id).execute(&self.pool).await?
        };

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cursos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
