use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// All variables have defaults so the service starts with zero configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory holding `skills.yaml` and `action_verbs.yaml`.
    pub taxonomy_dir: PathBuf,
    /// Optional HTTP embedding service. When unset the deterministic
    /// hash embedder is used instead.
    pub embedding_endpoint: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            taxonomy_dir: std::env::var("TAXONOMY_DIR")
                .unwrap_or_else(|_| "config".to_string())
                .into(),
            embedding_endpoint: std::env::var("EMBEDDING_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
