use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; startup fails only on unparseable values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on recommendations per explain request.
    pub max_batch_size: usize,
    /// JSON report dialect to use instead of the built-in one.
    pub report_dialect_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_batch_size: parse_batch_size("MAX_BATCH_SIZE")?,
            report_dialect_path: std::env::var("REPORT_DIALECT_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_batch_size: 200,
            report_dialect_path: None,
        }
    }
}

/// Zero would reject every non-empty batch, so it is refused at startup.
fn parse_batch_size(key: &str) -> Result<usize> {
    let default = NonZeroUsize::new(200).unwrap_or(NonZeroUsize::MIN);
    parse_env(key, default)
        .map(NonZeroUsize::get)
        .with_context(|| format!("{key} must be a positive integer"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value '{raw}' for '{key}'")),
        Err(_) => Ok(default),
    }
}
