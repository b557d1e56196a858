// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token-authenticated game stat ingestion.
//!
//! Steps run strictly in order and stop at the first failure:
//! method, token, JSON body, `scrim_game_id`, game lookup, stats, timestamp.
//! The single batch insert only happens once everything has validated.

use crate::error::{AppError, Result};
use crate::middleware::auth::authenticate;
use crate::models::stat::{parse_stats, parse_timestamp, scrim_game_id};
use crate::models::{IngestPayload, IngestResponse};
use crate::AppState;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode},
    routing::any,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

pub const INGEST_PATH: &str = "/receive-game-stats";

/// Largest request body the handler will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const MSG_INVALID_JSON: &str = "Invalid JSON payload.";
const MSG_BODY_TOO_LARGE: &str = "Request body too large or unreadable.";

/// Ingestion routes. Every method is routed here so that wrong verbs get
/// the JSON 405 body; CORS preflight is answered by the CORS layer.
///
/// The extractor-level body limit is disabled; the handler enforces
/// [`MAX_BODY_BYTES`] itself once method and token have been checked.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        INGEST_PATH,
        any(receive_game_stats).layer(DefaultBodyLimit::disable()),
    )
}

/// Receive a batch of stats for one scrim game.
async fn receive_game_stats(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<IngestResponse>)> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let store = state.store.as_ref();
    let user = authenticate(store, &headers, chrono::Utc::now()).await?;

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to buffer request body");
            AppError::BadRequest(MSG_BODY_TOO_LARGE.to_string())
        })?;

    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        AppError::BadRequest(MSG_INVALID_JSON.to_string())
    })?;

    let game_id = scrim_game_id(&body)?;

    match store.game_exists(game_id).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(AppError::NotFound(format!(
                "Scrim game with id {} not found.",
                game_id
            )))
        }
        Err(err) => return Err(AppError::store(AppError::STORE_GAME_LOOKUP_FAILED, err)),
    }

    let payload = IngestPayload {
        scrim_game_id: game_id.to_string(),
        stats: parse_stats(&body, state.config.max_stats_per_request)?,
        timestamp: parse_timestamp(&body)?,
    };

    let records = payload.into_records(&user.user_id, chrono::Utc::now());

    store
        .insert_stats(&records)
        .await
        .map_err(|err| AppError::store(AppError::STORE_INSERT_FAILED, err))?;

    tracing::info!(
        user_id = %user.user_id,
        scrim_game_id = %game_id,
        count = records.len(),
        "Game stats stored"
    );

    Ok((StatusCode::CREATED, Json(IngestResponse::stored())))
}
