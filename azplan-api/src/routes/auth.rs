/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new user
/// - `POST /v1/auth/login` - Exchange username and password for tokens
/// - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
/// - `GET /v1/auth/me` - The authenticated user

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use azplan_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked for strength after the length rule
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Issued tokens
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d); absent on refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Always `bearer`
    pub token_type: &'static str,

    /// Seconds until the access token expires
    pub expires_in: i64,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,

    #[serde(flatten)]
    pub tokens: TokenResponse,
}

fn issue_tokens(user_id: Uuid, secret: &str) -> ApiResult<TokenResponse> {
    let access_claims = jwt::Claims::new(user_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user_id, jwt::TokenType::Refresh);

    Ok(TokenResponse {
        access_token: jwt::create_token(&access_claims, secret)?,
        refresh_token: Some(jwt::create_token(&refresh_claims, secret)?),
        token_type: "bearer",
        expires_in: access_claims.expires_in(),
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "ada",
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username or email already registered
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Lost a race for the same username or email
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    validate_request(&req)?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    if User::find_by_username_or_email(&state.db, &req.username, &req.email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "Username or email already registered".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let tokens = issue_tokens(user.id, state.jwt_secret())?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user, tokens })))
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
/// - `403 Forbidden`: Account deactivated
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate_request(&req)?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Rejected login with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("User account is inactive".to_string()));
    }

    Ok(Json(issue_tokens(user.id, state.jwt_secret())?))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or non-refresh token
/// - `403 Forbidden`: Account deactivated since the token was issued
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let (access_token, claims) = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    if !User::is_active(&state.db, claims.sub).await? {
        return Err(ApiError::Forbidden("User account is inactive".to_string()));
    }

    Ok(Json(TokenResponse {
        access_token,
        refresh_token: None,
        token_type: "bearer",
        expires_in: claims.expires_in(),
    }))
}

/// The authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "SecureP@ss123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            username: "ad".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_issued_tokens_validate() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let user_id = Uuid::new_v4();
        let tokens = issue_tokens(user_id, secret).unwrap();

        let access = jwt::validate_access_token(&tokens.access_token, secret).unwrap();
        assert_eq!(access.sub, user_id);

        let refresh = jwt::validate_refresh_token(tokens.refresh_token.as_deref().unwrap(), secret).unwrap();
        assert_eq!(refresh.sub, user_id);
        assert!(tokens.expires_in > 0);
    }

    #[test]
    fn test_refresh_response_omits_refresh_token() {
        let response = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: None,
            token_type: "bearer",
            expires_in: 60,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["token_type"], "bearer");
    }
}
