use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub user: String,
    pub host: String,
    pub name: String,
    pub password: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db: DbConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig {
            user: std::env::var("DB_USER")?,
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
            name: std::env::var("DB_NAME")?,
            password: std::env::var("DB_PASSWORD")?,
            port: std::env::var("DB_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(5432),
        };
        Ok(Self { db })
    }
}
