// src/config.rs
use anyhow::{Context, Result};
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIINGO_BASE_URL: &str = "https://api.tiingo.com";
pub const DEFAULT_DB_PATH: &str = "search_history.db";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Startup configuration, built once and handed to the request handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tiingo_token: String,
    pub tiingo_base_url: String,
    pub db_path: PathBuf,
    pub port: u16,
    pub static_dir: PathBuf,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Config with defaults for everything but the token.
    pub fn new(tiingo_token: impl Into<String>) -> Self {
        AppConfig {
            tiingo_token: tiingo_token.into(),
            tiingo_base_url: DEFAULT_TIINGO_BASE_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Reads the process environment, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let token = env::var("TIINGO_TOKEN").context("TIINGO_TOKEN must be set")?;
        let mut config = AppConfig::new(token);

        if let Ok(url) = env::var("TIINGO_BASE_URL") {
            config.tiingo_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(path) = env::var("DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        config.port = match env::var("PORT") {
            Ok(port) => port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a number, got {:?}", port))?,
            Err(_) => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        if let Ok(secs) = env::var("HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number, got {:?}", secs))?;
            config.http_timeout = Duration::from_secs(secs);
        }

        info!(
            "Configuration loaded: db={}, upstream={}, port={}",
            config.db_path.display(),
            config.tiingo_base_url,
            config.port
        );
        Ok(config)
    }
}
