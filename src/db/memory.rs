// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.

use crate::db::{token_key, StatsStore};
use crate::error::AppError;
use crate::models::{ApiToken, ScrimGame, StatRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Store that keeps everything in memory.
///
/// Tokens are keyed by [`token_key`] just like the Firestore registry.
/// Call counters let tests assert which store operations a request hit.
#[derive(Default)]
pub struct MemoryStore {
    tokens: DashMap<String, ApiToken>,
    games: DashSet<String>,
    stats: Mutex<Vec<StatRecord>>,
    insert_failure: Mutex<Option<String>>,
    token_lookup_failure: Mutex<Option<String>>,
    game_lookup_failure: Mutex<Option<String>>,
    token_lookups: AtomicUsize,
    game_lookups: AtomicUsize,
    insert_calls: AtomicUsize,
}

/// Seed file layout for `STORE_SEED_FILE`.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    tokens: Vec<SeedToken>,
    #[serde(default)]
    games: Vec<ScrimGame>,
}

#[derive(Debug, Deserialize)]
struct SeedToken {
    token: String,
    user_id: String,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw token.
    pub fn with_token(self, token: &str, record: ApiToken) -> Self {
        self.tokens.insert(token_key(token), record);
        self
    }

    /// Register a scrim game ID.
    pub fn with_game(self, game_id: &str) -> Self {
        self.games.insert(game_id.to_string());
        self
    }

    /// Load tokens and games from a JSON seed file.
    pub fn load_seed(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed: SeedFile = serde_json::from_str(&content)?;

        let store = Self::new();
        for token in seed.tokens {
            store.tokens.insert(
                token_key(&token.token),
                ApiToken {
                    user_id: token.user_id,
                    is_active: token.is_active,
                    expires_at: token.expires_at,
                },
            );
        }
        for game in seed.games {
            store.games.insert(game.id);
        }

        tracing::info!(
            tokens = store.tokens.len(),
            games = store.games.len(),
            "Memory store seeded"
        );
        Ok(store)
    }

    /// Make every subsequent insert fail with `message`.
    pub fn fail_inserts(&self, message: &str) {
        *lock(&self.insert_failure) = Some(message.to_string());
    }

    /// Make every subsequent token lookup fail with `message`.
    pub fn fail_token_lookups(&self, message: &str) {
        *lock(&self.token_lookup_failure) = Some(message.to_string());
    }

    /// Make every subsequent game existence check fail with `message`.
    pub fn fail_game_lookups(&self, message: &str) {
        *lock(&self.game_lookup_failure) = Some(message.to_string());
    }

    /// Snapshot of all stored stats, in insertion order.
    pub fn stats(&self) -> Vec<StatRecord> {
        lock(&self.stats).clone()
    }

    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }

    pub fn game_lookups(&self) -> usize {
        self.game_lookups.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Total store operations performed.
    pub fn total_calls(&self) -> usize {
        self.token_lookups() + self.game_lookups() + self.insert_calls()
    }

    fn injected_failure(slot: &Mutex<Option<String>>) -> Result<(), AppError> {
        match lock(slot).as_ref() {
            Some(msg) => Err(AppError::Database(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn lookup_token(&self, token: &str) -> Result<Option<ApiToken>, AppError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        Self::injected_failure(&self.token_lookup_failure)?;
        Ok(self
            .tokens
            .get(&token_key(token))
            .map(|entry| entry.value().clone()))
    }

    async fn game_exists(&self, game_id: &str) -> Result<bool, AppError> {
        self.game_lookups.fetch_add(1, Ordering::SeqCst);
        Self::injected_failure(&self.game_lookup_failure)?;
        Ok(self.games.contains(game_id))
    }

    async fn insert_stats(&self, records: &[StatRecord]) -> Result<(), AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected_failure(&self.insert_failure)?;
        lock(&self.stats).extend_from_slice(records);
        Ok(())
    }
}
