// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-token authentication against the API token registry.

use crate::db::StatsStore;
use crate::error::AppError;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

const BEARER_PREFIX: &str = "Bearer ";

/// Caller identity resolved from a registry token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Extract the raw token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingToken)
}

/// Resolve the caller from the request headers.
///
/// Unknown tokens and failed lookups both map to [`AppError::InvalidToken`]
/// so callers cannot probe the registry. Activity is checked before expiry.
pub async fn authenticate(
    store: &dyn StatsStore,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)?;

    let record = match store.lookup_token(token).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::warn!("Rejected unknown API token");
            return Err(AppError::InvalidToken);
        }
        Err(err) => {
            tracing::warn!(error = %err, "Token lookup failed");
            return Err(AppError::InvalidToken);
        }
    };

    if !record.is_active {
        tracing::warn!(user_id = %record.user_id, "Rejected inactive API token");
        return Err(AppError::InactiveToken);
    }

    if record.is_expired_at(now) {
        tracing::warn!(
            user_id = %record.user_id,
            expires_at = ?record.expires_at,
            "Rejected expired API token"
        );
        return Err(AppError::ExpiredToken);
    }

    Ok(AuthUser {
        user_id: record.user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ApiToken;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn store_with(token: &str, is_active: bool, expires_at: Option<DateTime<Utc>>) -> MemoryStore {
        MemoryStore::new().with_token(
            token,
            ApiToken {
                user_id: "player-9".to_string(),
                is_active,
                expires_at,
            },
        )
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc123")).unwrap(), "abc123");
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Basic abc123")),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&headers("bearer abc123")),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer ")),
            Err(AppError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let store = store_with("tok", true, Some(Utc::now() + Duration::days(1)));
        let user = authenticate(&store, &headers("Bearer tok"), Utc::now())
            .await
            .unwrap();
        assert_eq!(user.user_id, "player-9");
    }

    #[tokio::test]
    async fn test_missing_header_skips_lookup() {
        let store = store_with("tok", true, None);
        let err = authenticate(&store, &HeaderMap::new(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingToken));
        assert_eq!(store.token_lookups(), 0);
    }

    #[tokio::test]
    async fn test_unknown_and_failed_lookup_look_the_same() {
        let store = store_with("tok", true, None);
        let unknown = authenticate(&store, &headers("Bearer nope"), Utc::now())
            .await
            .unwrap_err();

        store.fail_token_lookups("connection reset");
        let failed = authenticate(&store, &headers("Bearer tok"), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidToken));
        assert!(matches!(failed, AppError::InvalidToken));
        assert_eq!(unknown.to_string(), failed.to_string());
    }

    #[tokio::test]
    async fn test_inactive_checked_before_expiry() {
        let now = Utc::now();
        let store = store_with("tok", false, Some(now - Duration::days(1)));
        let err = authenticate(&store, &headers("Bearer tok"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InactiveToken));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let now = Utc::now();
        let store = store_with("tok", true, Some(now - Duration::seconds(1)));
        let err = authenticate(&store, &headers("Bearer tok"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExpiredToken));
    }
}
