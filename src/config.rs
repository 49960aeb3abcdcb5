use std::path::PathBuf;

pub struct Config {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let database_path = dotenvy::var("DATABASE_PATH")
            .unwrap_or_else(|_| "tasks.db".to_string())
            .into();
        let host = dotenvy::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = dotenvy::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(8080);
        Self {
            database_path,
            host,
            port,
        }
    }
}
