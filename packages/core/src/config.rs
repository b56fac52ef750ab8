use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:cursos.db".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| "PORT must be a valid port number")?,
            Err(_) => 3001,
        };

        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());

        Ok(Self {
            database_url,
            port,
            api_base_url,
        })
    }
}
