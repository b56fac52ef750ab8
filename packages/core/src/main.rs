use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use curso_catalog::api;
use curso_catalog::cli::Cli;
use curso_catalog::config::Config;
use curso_catalog::db;
use curso_catalog::error::AppError;
use curso_catalog::logging::init_logging;
use curso_catalog::metrics::AppMetrics;
use curso_catalog::repository::{CursoRepository, CursoStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env().map_err(AppError::Config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    tracing::info!("Service starting with config: {:?}", config);

    let pool = db::create_pool(&config.database_url).await?;
    let store: Arc<dyn CursoStore> = Arc::new(CursoRepository::new(pool));
    let metrics = Arc::new(AppMetrics::new()?);

    let app = api::router(store, metrics);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server running on port {}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
