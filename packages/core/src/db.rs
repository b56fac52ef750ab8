//! SQLite pool construction and schema bootstrap.
//!
//! [`create_pool`] is the one place the process touches connection
//! settings: the pool is bounded, acquisition waits up to a fixed timeout
//! before failing, and the `cursos` schema is applied before the pool is
//! handed out so `sqlite::memory:` pools are immediately usable in tests.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Maximum concurrent connections held by the pool.
const MAX_CONNECTIONS: u32 = 20;
/// How long a request waits for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);
/// Idle connections are recycled after this long.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cursos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    descripcion TEXT NOT NULL,
    creditos INTEGER NOT NULL,
    area TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Open a bounded connection pool and apply the schema.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // An in-memory database lives and dies with its connection: keep
    // exactly one and never recycle it, or the schema would vanish
    // between queries.
    let in_memory = database_url.contains(":memory:");

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(IDLE_TIMEOUT)
    };

    let pool = pool_options.connect_with(options).await?;

    sqlx::query(SCHEMA).execute(&pool).await?;

    Ok(pool)
}
