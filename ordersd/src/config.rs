//! Daemon configuration.
//!
//! Loaded once from environment variables (optionally via a `.env` file)
//! and validated eagerly: every offending field is collected before
//! returning, not just the first one found.

use std::env;
use std::time::Duration;

use crate::error::{DaemonError, DaemonResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
            Environment::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub port: u16,
    pub database_url: Option<String>,
    pub use_inmemory: bool,
    pub log_level: String,
    pub outbox_batch_size: i64,
    pub outbox_poll_interval: Duration,
    pub outbox_workers: usize,
    pub pricing_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> DaemonResult<Self> {
        let _ = dotenvy::dotenv();

        let mut errors = Vec::new();

        let environment = match env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()).to_lowercase().as_str() {
            "development" => Environment::Development,
            "production" => Environment::Production,
            "test" => Environment::Test,
            other => {
                errors.push(format!("invalid APP_ENV: {other} (expected development, production, or test)"));
                Environment::Development
            }
        };

        let port = match env::var("PORT") {
            Ok(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    errors.push(format!("invalid PORT: {raw}"));
                    3000
                }
            },
            Err(_) => 3000,
        };

        let use_inmemory = match env::var("USE_INMEMORY") {
            Ok(raw) => match raw.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    errors.push(format!("invalid USE_INMEMORY: {other}"));
                    false
                }
            },
            Err(_) => false,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if !use_inmemory && database_url.is_none() {
            errors.push("DATABASE_URL is required unless USE_INMEMORY is set".to_string());
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        if !matches!(log_level.to_lowercase().as_str(), "trace" | "debug" | "info" | "warn" | "error" | "fatal") {
            errors.push(format!("invalid LOG_LEVEL: {log_level}"));
        }

        let outbox_batch_size = match env::var("OUTBOX_BATCH_SIZE") {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    errors.push(format!("invalid OUTBOX_BATCH_SIZE: {raw}"));
                    10
                }
            },
            Err(_) => 10,
        };

        let outbox_poll_interval_ms = match env::var("OUTBOX_POLL_INTERVAL_MS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    errors.push(format!("invalid OUTBOX_POLL_INTERVAL_MS: {raw}"));
                    5000
                }
            },
            Err(_) => 5000,
        };

        let outbox_workers = match env::var("OUTBOX_WORKERS") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    errors.push(format!("invalid OUTBOX_WORKERS: {raw}"));
                    1
                }
            },
            Err(_) => 1,
        };

        let pricing_base_url = env::var("PRICING_BASE_URL").ok();

        if !errors.is_empty() {
            return Err(DaemonError::Config(errors));
        }

        Ok(Self {
            environment,
            port,
            database_url,
            use_inmemory,
            log_level,
            outbox_batch_size,
            outbox_poll_interval: Duration::from_millis(outbox_poll_interval_ms),
            outbox_workers,
            pricing_base_url,
        })
    }

    /// Convenience constructor used by tests.
    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            port: 0,
            database_url: None,
            use_inmemory: true,
            log_level: "debug".to_string(),
            outbox_batch_size: 10,
            outbox_poll_interval: Duration::from_millis(50),
            outbox_workers: 1,
            pricing_base_url: None,
        }
    }
}
