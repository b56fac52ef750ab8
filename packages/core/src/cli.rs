use clap::Parser;

/// Course catalog service CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "curso-catalog",
    version,
    about = "REST backend for the course catalog"
)]
pub struct Cli {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Database connection string
    #[arg(long)]
    pub database_url: Option<String>,
}
