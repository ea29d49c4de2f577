//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to the theme templates directory (default: ./templates).
    pub templates_dir: PathBuf,

    /// Postgres connection URL. When None, the in-memory store is used.
    pub database_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let database_url = env::var("DATABASE_URL").ok();

        Ok(Self {
            port,
            templates_dir,
            database_url,
        })
    }

    /// Directory the template registry scans for section layouts.
    pub fn sections_dir(&self) -> PathBuf {
        self.templates_dir.join("sections")
    }
}
