use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_DATABASE_PATH: &str = "db/ecoinvent.db";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file backing the submission store. Created on first write.
    pub database_path: PathBuf,
    /// Enables the abstract refiner when present.
    pub anthropic_api_key: Option<String>,
    /// Shared bearer token guarding `/api/admin/*`. Open when unset.
    pub admin_api_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_path: optional_env("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            admin_api_token: optional_env("ADMIN_API_TOKEN"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
