// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent store layer.
//!
//! The ingestion handler only talks to [`StatsStore`]. Production uses
//! [`FirestoreDb`]; [`MemoryStore`] backs local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{ApiToken, StatRecord};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    /// Token registry (keyed by SHA-256 of the raw token)
    pub const API_TOKENS: &str = "api_tokens";
    pub const SCRIM_GAMES: &str = "scrim_games";
    pub const GAME_STATS: &str = "game_stats";
}

/// Registry key for a raw bearer token: lowercase hex SHA-256.
pub fn token_key(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Data-access seam for stat ingestion.
///
/// Implementations must be thread-safe; the handler calls them
/// concurrently from independent requests.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Look up a token in the registry. `Ok(None)` when unknown.
    async fn lookup_token(&self, token: &str) -> Result<Option<ApiToken>, AppError>;

    /// Whether a scrim game with this ID exists.
    async fn game_exists(&self, game_id: &str) -> Result<bool, AppError>;

    /// Insert all records as one operation. Either every record is stored
    /// or none is.
    async fn insert_stats(&self, records: &[StatRecord]) -> Result<(), AppError>;
}

#[async_trait]
impl<S: StatsStore + ?Sized> StatsStore for Arc<S> {
    async fn lookup_token(&self, token: &str) -> Result<Option<ApiToken>, AppError> {
        (**self).lookup_token(token).await
    }

    async fn game_exists(&self, game_id: &str) -> Result<bool, AppError> {
        (**self).game_exists(game_id).await
    }

    async fn insert_stats(&self, records: &[StatRecord]) -> Result<(), AppError> {
        (**self).insert_stats(records).await
    }
}
