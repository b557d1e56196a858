// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides the operations stat ingestion needs:
//! - API tokens (registry lookup by hashed token)
//! - Scrim games (existence check)
//! - Game stats (transactional batch insert)

use crate::db::{collections, token_key, StatsStore};
use crate::error::AppError;
use crate::models::{ApiToken, ScrimGame, StatRecord};
use async_trait::async_trait;

/// Firestore caps document IDs at 1500 bytes.
const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// Whether `id` can name a document directly under a collection.
///
/// Firestore rejects IDs containing `/`, the IDs `.` and `..`, and IDs
/// matching `__.*__`.
fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DOCUMENT_ID_BYTES
        && !id.contains('/')
        && id != "."
        && id != ".."
        && !(id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Registry Administration ─────────────────────────────────

    /// Register (or replace) a token in the registry.
    ///
    /// Used by provisioning scripts and integration tests; the raw token is
    /// only used to derive the document ID.
    pub async fn put_token(&self, token: &str, record: &ApiToken) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::API_TOKENS)
            .document_id(token_key(token))
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or update a scrim game.
    pub async fn put_game(&self, game: &ScrimGame) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SCRIM_GAMES)
            .document_id(&game.id)
            .object(game)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All stats stored for a game.
    pub async fn get_stats_for_game(&self, game_id: &str) -> Result<Vec<StatRecord>, AppError> {
        let game_id = game_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::GAME_STATS)
            .filter(move |q| q.for_all([q.field("scrim_game_id").eq(game_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl StatsStore for FirestoreDb {
    async fn lookup_token(&self, token: &str) -> Result<Option<ApiToken>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::API_TOKENS)
            .obj()
            .one(&token_key(token))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn game_exists(&self, game_id: &str) -> Result<bool, AppError> {
        // No document can carry such an ID, so the game cannot exist.
        if !is_valid_document_id(game_id) {
            tracing::debug!(game_id, "Scrim game id is not a valid document id");
            return Ok(false);
        }

        let doc = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SCRIM_GAMES)
            .one(game_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc.is_some())
    }

    /// Writes the batch in a single transaction so it lands all-or-nothing.
    async fn insert_stats(&self, records: &[StatRecord]) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for record in records {
            let doc_id = uuid::Uuid::new_v4().simple().to_string();
            client
                .fluent()
                .update()
                .in_col(collections::GAME_STATS)
                .document_id(&doc_id)
                .object(record)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add stat to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(count = records.len(), "Stats batch committed");
        Ok(())
    }
}
