// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default cap on stats per request. Firestore transactions accept at most
/// 500 writes; this leaves headroom.
pub const DEFAULT_MAX_STATS_PER_REQUEST: usize = 400;

/// Most writes a single Firestore transaction accepts.
pub const FIRESTORE_MAX_TRANSACTION_WRITES: usize = 500;

/// Which persistent store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND",
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Persistent store selection
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: Option<String>,
    /// Seed file for the memory backend
    pub store_seed_file: Option<PathBuf>,
    /// Largest accepted stats batch
    pub max_stats_per_request: usize,
}

impl Config {
    /// Memory-backed config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            store_backend: StoreBackend::Memory,
            gcp_project_id: None,
            store_seed_file: None,
            max_stats_per_request: DEFAULT_MAX_STATS_PER_REQUEST,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(v) => v.parse::<StoreBackend>()?,
            Err(_) => StoreBackend::Firestore,
        };

        let gcp_project_id = env::var("GCP_PROJECT_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if store_backend == StoreBackend::Firestore && gcp_project_id.is_none() {
            return Err(ConfigError::Missing("GCP_PROJECT_ID"));
        }

        let max_stats_per_request = match env::var("MAX_STATS_PER_REQUEST") {
            Ok(v) => parse_batch_limit(&v)?,
            Err(_) => DEFAULT_MAX_STATS_PER_REQUEST,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            gcp_project_id,
            store_seed_file: env::var("STORE_SEED_FILE").ok().map(PathBuf::from),
            max_stats_per_request,
        })
    }
}

fn parse_batch_limit(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "MAX_STATS_PER_REQUEST",
        reason: reason.to_string(),
    };
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| invalid("not a positive integer"))?;
    if value == 0 {
        return Err(invalid("must be at least 1"));
    }
    if value > FIRESTORE_MAX_TRANSACTION_WRITES {
        return Err(invalid(&format!(
            "must be at most {} (one transaction per batch)",
            FIRESTORE_MAX_TRANSACTION_WRITES
        )));
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
