/// API token model and database operations
///
/// Tokens are an alternative to JWTs for scripts and integrations. The
/// plaintext is returned once by [`ApiToken::create`] and never stored.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE api_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     token_prefix VARCHAR(16) NOT NULL,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::api_token::{
    display_prefix, generate_api_token, hash_api_token, validate_api_token_format,
};

const API_TOKEN_COLUMNS: &str =
    "id, user_id, name, token_prefix, token_hash, is_active, created_at, last_used_at";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiToken {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Human label
    pub name: String,

    /// First characters of the token, for recognising it in listings
    pub token_prefix: String,

    #[serde(skip_serializing)]
    pub token_hash: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Creates a token and returns it with its plaintext
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, token_hash) = generate_api_token();

        let token = sqlx::query_as::<_, ApiToken>(&format!(
            "INSERT INTO api_tokens (user_id, name, token_prefix, token_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            API_TOKEN_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(display_prefix(&plaintext))
        .bind(token_hash)
        .fetch_one(pool)
        .await?;

        Ok((token, plaintext))
    }

    /// Resolves an active token and stamps `last_used_at`
    ///
    /// Malformed tokens are rejected before any query runs.
    pub async fn authenticate(pool: &PgPool, plaintext: &str) -> Result<Option<Self>, sqlx::Error> {
        if !validate_api_token_format(plaintext) {
            return Ok(None);
        }

        sqlx::query_as::<_, ApiToken>(&format!(
            "UPDATE api_tokens SET last_used_at = NOW()
             WHERE token_hash = $1 AND is_active = TRUE
             RETURNING {}",
            API_TOKEN_COLUMNS
        ))
        .bind(hash_api_token(plaintext))
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's tokens, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {} FROM api_tokens WHERE user_id = $1 ORDER BY created_at DESC",
            API_TOKEN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Deactivates a token owned by `user_id`
    pub async fn revoke(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE api_tokens SET is_active = FALSE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_serialized() {
        let token = ApiToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "ci".to_string(),
            token_prefix: "azp_abcdefgh".to_string(),
            token_hash: "0".repeat(64),
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
        };

        let json = serde_json::to_value(&token).unwrap();
        assert!(json.get("token_hash").is_none());
        assert_eq!(json["token_prefix"], "azp_abcdefgh");
    }
}
