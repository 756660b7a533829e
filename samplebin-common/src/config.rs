//! Startup configuration
//!
//! All process-wide settings are resolved once at startup into an explicit
//! `Config` that is passed down to the server, rather than read from globals
//! scattered through the code.
//!
//! Resolution order:
//! 1. `PORT` environment variable (default 3000)
//! 2. `SAMPLEBIN_DATA` environment variable for the data directory
//!    (default `./data`)
//! 3. When `SAMPLEBIN_ENV=production`, the database path is read from a JSON
//!    configuration file (`SAMPLEBIN_CONFIG`, default `./config.json`);
//!    otherwise a fixed path under the data directory is used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Resolved startup configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP server listens on
    pub port: u16,
    /// Directory holding uploaded media (`img/` and `samples/` subdirectories)
    pub data_dir: PathBuf,
    /// SQLite database file path
    pub db_path: PathBuf,
}

/// Shape of the production JSON configuration file
#[derive(Debug, Deserialize)]
struct FileConfig {
    /// Database file path
    database: PathBuf,
    /// Optional data directory override
    data_dir: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(val) => val
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("Invalid PORT value {:?}: {}", val, e)))?,
            Err(_) => 3000,
        };

        let mut data_dir = std::env::var("SAMPLEBIN_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let db_path = if std::env::var("SAMPLEBIN_ENV").as_deref() == Ok("production") {
            let config_path = std::env::var("SAMPLEBIN_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./config.json"));
            let raw = std::fs::read_to_string(&config_path).map_err(|e| {
                Error::Config(format!(
                    "Cannot read config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;
            let file_config = parse_config_json(&raw)?;
            if let Some(dir) = file_config.data_dir {
                data_dir = dir;
            }
            file_config.database
        } else {
            data_dir.join("samplebin.db")
        };

        Ok(Config {
            port,
            data_dir,
            db_path,
        })
    }
}

/// Parse the production JSON configuration file
fn parse_config_json(raw: &str) -> Result<FileConfig> {
    serde_json::from_str(raw).map_err(|e| Error::Config(format!("Invalid config JSON: {}", e)))
}
