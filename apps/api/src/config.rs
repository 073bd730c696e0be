use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://job_tracker.db";
pub const DEFAULT_SEED_PROJECT_NAME: &str = "Job Applications 2025";

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// CSV imported into the first project when the database starts empty.
    pub seed_csv_path: Option<PathBuf>,
    pub seed_project_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            None => 8080,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            seed_csv_path: lookup("SEED_CSV_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            seed_project_name: lookup("SEED_PROJECT_NAME")
                .unwrap_or_else(|| DEFAULT_SEED_PROJECT_NAME.to_string()),
        })
    }
}
