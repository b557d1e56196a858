// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::{DateTime, Utc};
use scrimstats_ingest::config::Config;
use scrimstats_ingest::db::{FirestoreDb, MemoryStore};
use scrimstats_ingest::models::ApiToken;
use scrimstats_ingest::routes::create_router;
use scrimstats_ingest::routes::ingest::INGEST_PATH;
use scrimstats_ingest::AppState;
use serde_json::Value;
use std::sync::Arc;

#[allow(dead_code)]
pub const VALID_TOKEN: &str = "tok_live_coach";
#[allow(dead_code)]
pub const INACTIVE_TOKEN: &str = "tok_revoked";
#[allow(dead_code)]
pub const EXPIRED_TOKEN: &str = "tok_expired";
#[allow(dead_code)]
pub const OWNER_ID: &str = "user-coach-1";
#[allow(dead_code)]
pub const GAME_ID: &str = "g1";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
pub fn token(user_id: &str, is_active: bool, expires_at: Option<DateTime<Utc>>) -> ApiToken {
    ApiToken {
        user_id: user_id.to_string(),
        is_active,
        expires_at,
    }
}

/// Memory store with one valid, one inactive and one expired token, and game `g1`.
#[allow(dead_code)]
pub fn seeded_store() -> Arc<MemoryStore> {
    let now = Utc::now();
    Arc::new(
        MemoryStore::new()
            .with_token(VALID_TOKEN, token(OWNER_ID, true, Some(now + chrono::Duration::days(30))))
            .with_token(INACTIVE_TOKEN, token(OWNER_ID, false, None))
            .with_token(
                EXPIRED_TOKEN,
                token(OWNER_ID, true, Some(now - chrono::Duration::hours(1))),
            )
            .with_game(GAME_ID),
    )
}

/// Create a test app backed by `store`.
#[allow(dead_code)]
pub fn create_test_app_with(store: Arc<MemoryStore>) -> axum::Router {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        store,
    });
    create_router(state)
}

/// Create a test app with the seeded memory store.
/// Returns the router and the store for call assertions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemoryStore>) {
    let store = seeded_store();
    (create_test_app_with(store.clone()), store)
}

/// POST `body` to the ingestion route with an optional bearer token.
#[allow(dead_code)]
pub fn ingest_request(token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(INGEST_PATH)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(body.into()).unwrap()
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
