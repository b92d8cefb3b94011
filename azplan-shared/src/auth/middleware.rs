/// Request authentication
///
/// Resolves the caller of a request from either credential the API accepts:
///
/// - `Authorization: Bearer <jwt>`: an access token issued at login
/// - `X-Api-Token: azp_...`: an API token created by the user
///
/// The API's auth layer inserts the resolved [`AuthContext`] into the
/// request extensions, where handlers read it with `Extension<AuthContext>`.
/// Accounts that have been deactivated are refused with either credential.

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::{api_token::ApiToken, user::User};

/// Header carrying an API token
pub const API_TOKEN_HEADER: &str = "x-api-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Jwt,
    ApiToken,
}

/// The authenticated caller of a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub method: AuthMethod,

    /// Set when the request used an API token
    pub api_token_id: Option<Uuid>,
}

impl AuthContext {
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self {
            user_id,
            method: AuthMethod::Jwt,
            api_token_id: None,
        }
    }

    pub fn from_api_token(token: &ApiToken) -> Self {
        Self {
            user_id: token.user_id,
            method: AuthMethod::ApiToken,
            api_token_id: Some(token.id),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("Invalid or revoked API token")]
    InvalidApiToken,

    #[error("User account is inactive")]
    InactiveUser,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

/// Extracts the bearer token from an `Authorization` header, if any
///
/// A present header without the `Bearer ` scheme is a format error.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Malformed authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Resolves the caller from request headers
///
/// A bearer token takes precedence over an API token when both are sent.
pub async fn authenticate(
    pool: &PgPool,
    jwt_secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let context = if let Some(token) = bearer_token(headers)? {
        let claims = validate_access_token(token, jwt_secret)?;
        AuthContext::from_jwt(claims.sub)
    } else if let Some(value) = headers.get(API_TOKEN_HEADER) {
        let plaintext = value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Malformed API token header".to_string()))?;

        let token = ApiToken::authenticate(pool, plaintext)
            .await?
            .ok_or(AuthError::InvalidApiToken)?;
        AuthContext::from_api_token(&token)
    } else {
        return Err(AuthError::MissingCredentials);
    };

    if !User::is_active(pool, context.user_id).await? {
        tracing::debug!(user_id = %context.user_id, "Rejected request from inactive user");
        return Err(AuthError::InactiveUser);
    }

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_auth_context_from_jwt() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::from_jwt(user_id);

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.method, AuthMethod::Jwt);
        assert!(context.api_token_id.is_none());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Ok(None)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(matches!(bearer_token(&headers), Err(AuthError::InvalidFormat(_))));
    }

    #[test]
    fn test_jwt_errors_become_invalid_token() {
        assert!(matches!(AuthError::from(JwtError::Expired), AuthError::InvalidToken(_)));
    }
}
