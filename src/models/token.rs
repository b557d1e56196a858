// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API token registry entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API token as stored in the token registry.
///
/// The raw token is never stored; documents are keyed by its SHA-256
/// (see [`crate::db::token_key`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    /// User the token was issued to
    pub user_id: String,
    /// Revoked tokens are kept with `is_active = false`
    pub is_active: bool,
    /// Optional hard expiry
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// A token with an expiry strictly before `now` is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}
