// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Game stat records and ingestion payload validation.
//!
//! The request body is parsed into a generic JSON value first and then
//! validated field by field, so each failure maps to a precise message and
//! the checks run in the same order as the handler's other steps.

use crate::error::{AppError, Result};
use crate::time_utils::{format_utc_millis, parse_iso8601};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_INVALID_GAME_ID: &str = "Missing or invalid scrim_game_id.";
pub const MSG_EMPTY_STATS: &str = "Missing or empty stats array.";
pub const MSG_INVALID_TIMESTAMP: &str = "Invalid timestamp: must be an ISO-8601 datetime.";

/// A single validated stat from the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct StatInput {
    pub stat_type: String,
    /// Passed through to the store unvalidated
    pub stat_value: Value,
}

/// Stat record as persisted in the `game_stats` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    /// Owner of the token that submitted the stat
    pub user_id: String,
    pub scrim_game_id: String,
    pub stat_type: String,
    pub stat_value: Value,
    /// Client-supplied or server-assigned instant (ISO 8601, millisecond precision)
    pub timestamp: String,
}

/// Fully validated ingestion request.
#[derive(Debug, Clone)]
pub struct IngestPayload {
    pub scrim_game_id: String,
    pub stats: Vec<StatInput>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Success body for stat ingestion.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IngestResponse {
    pub message: String,
}

impl IngestResponse {
    pub const STORED: &'static str = "Game stats received and stored successfully.";

    pub fn stored() -> Self {
        Self {
            message: Self::STORED.to_string(),
        }
    }
}

/// Extract the required `scrim_game_id` (non-empty string).
pub fn scrim_game_id(body: &Value) -> Result<&str> {
    match body.get("scrim_game_id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(AppError::BadRequest(MSG_INVALID_GAME_ID.to_string())),
    }
}

/// Validate the `stats` array. Any bad entry rejects the whole batch.
pub fn parse_stats(body: &Value, max_stats: usize) -> Result<Vec<StatInput>> {
    let entries = match body.get("stats").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return Err(AppError::BadRequest(MSG_EMPTY_STATS.to_string())),
    };

    if entries.len() > max_stats {
        return Err(AppError::BadRequest(format!(
            "Too many stats in one request (max {}).",
            max_stats
        )));
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let stat_type = entry
                .get("stat_type")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty());
            // `get` is None only when the key is absent; an explicit null is a value.
            let stat_value = entry.get("stat_value");

            match (stat_type, stat_value) {
                (Some(stat_type), Some(stat_value)) => Ok(StatInput {
                    stat_type: stat_type.to_string(),
                    stat_value: stat_value.clone(),
                }),
                _ => Err(AppError::BadRequest(format!(
                    "Invalid stat at index {}: stat_type must be a non-empty string and stat_value is required.",
                    index
                ))),
            }
        })
        .collect()
}

/// Parse the optional client timestamp. `null` is treated as absent.
pub fn parse_timestamp(body: &Value) -> Result<Option<DateTime<Utc>>> {
    match body.get("timestamp") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_iso8601(raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(MSG_INVALID_TIMESTAMP.to_string())),
        Some(_) => Err(AppError::BadRequest(MSG_INVALID_TIMESTAMP.to_string())),
    }
}

/// Validate an entire body in request order (without the game lookup).
pub fn parse_ingest_payload(body: &Value, max_stats: usize) -> Result<IngestPayload> {
    let scrim_game_id = scrim_game_id(body)?.to_string();
    let stats = parse_stats(body, max_stats)?;
    let timestamp = parse_timestamp(body)?;
    Ok(IngestPayload {
        scrim_game_id,
        stats,
        timestamp,
    })
}

impl IngestPayload {
    /// Stamp every stat with the submitting user, target game and a timestamp.
    ///
    /// `now` is used when the client did not supply a timestamp.
    pub fn into_records(self, user_id: &str, now: DateTime<Utc>) -> Vec<StatRecord> {
        let timestamp = format_utc_millis(self.timestamp.unwrap_or(now));
        let scrim_game_id = self.scrim_game_id;

        self.stats
            .into_iter()
            .map(|stat| StatRecord {
                user_id: user_id.to_string(),
                scrim_game_id: scrim_game_id.clone(),
                stat_type: stat.stat_type,
                stat_value: stat.stat_value,
                timestamp: timestamp.clone(),
            })
            .collect()
    }
}
