// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ScrimStats ingestion service.
//!
//! This crate provides the token-authenticated HTTP endpoint through which
//! stat trackers submit per-game statistics for esports scrims.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod time_utils;

use config::Config;
use db::StatsStore;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn StatsStore>,
}
