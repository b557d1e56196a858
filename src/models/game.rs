// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scrim game model.

use serde::{Deserialize, Serialize};

/// A scrim game that ingested stats attach to.
///
/// Only existence matters to ingestion; the remaining fields are carried
/// for the dashboard and seed files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrimGame {
    /// Game identifier (also used as document ID)
    pub id: String,
    /// Owning scrim, if known
    #[serde(default)]
    pub scrim_id: Option<String>,
    /// Game number within the scrim
    #[serde(default)]
    pub game_number: Option<u32>,
}

impl ScrimGame {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scrim_id: None,
            game_number: None,
        }
    }
}
