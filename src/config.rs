//! API server configuration

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Default accumulation window for the batch loader.
const DEFAULT_BATCH_WINDOW_MS: u64 = 100;

/// Default maximum number of load requests dispatched in one cycle.
const DEFAULT_MAX_BATCH: usize = 64;

/// Configuration for the request-scoped batch loader
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Accumulation window measured from the first arrival
    pub window: Duration,
    /// Dispatch early once this many distinct requests are pending
    pub max_batch: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_BATCH_WINDOW_MS),
            max_batch: DEFAULT_MAX_BATCH,
        }
    }
}

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 8080)
    pub port: u16,

    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum connections in the database pool
    pub db_max_connections: u32,

    /// Batch loader tuning
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL environment variable is required")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("invalid PORT value")?;

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("invalid DB_MAX_CONNECTIONS value")?;

        let window_ms: u64 = env::var("BATCH_WINDOW_MS")
            .unwrap_or_else(|_| DEFAULT_BATCH_WINDOW_MS.to_string())
            .parse()
            .context("invalid BATCH_WINDOW_MS value")?;
        if window_ms == 0 {
            bail!("BATCH_WINDOW_MS must be greater than zero");
        }

        let max_batch: usize = env::var("BATCH_MAX_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_BATCH.to_string())
            .parse()
            .context("invalid BATCH_MAX_SIZE value")?;
        if max_batch == 0 {
            bail!("BATCH_MAX_SIZE must be greater than zero");
        }

        Ok(Self {
            port,
            database_url,
            db_max_connections,
            batch: BatchConfig {
                window: Duration::from_millis(window_ms),
                max_batch,
            },
        })
    }
}
