/// API token management endpoints
///
/// API tokens let scripts act as the user without a password. They are sent
/// in the `X-Api-Token` header and can be revoked or deleted at any time.
///
/// # Endpoints
///
/// - `POST /v1/api-tokens` - Create a token (plaintext shown once)
/// - `GET /v1/api-tokens` - List tokens (prefix only)
/// - `POST /v1/api-tokens/:id/revoke` - Deactivate a token
/// - `DELETE /v1/api-tokens/:id` - Delete a token

use super::MessageResponse;
use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use azplan_shared::{auth::middleware::AuthContext, models::api_token::ApiToken};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create API token request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateApiTokenRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Create API token response
#[derive(Debug, Serialize)]
pub struct CreateApiTokenResponse {
    #[serde(flatten)]
    pub token: ApiToken,

    /// The plaintext token
    ///
    /// This is the only time it is shown; only its hash is stored.
    pub plaintext: String,
}

/// Create API token
///
/// # Endpoint
///
/// ```text
/// POST /v1/api-tokens
/// Authorization: Bearer <jwt_token>
///
/// { "name": "Nightly export" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "Nightly export",
///   "token_prefix": "azp_AbCdEfGh",
///   "is_active": true,
///   "created_at": "2025-01-03T12:00:00Z",
///   "last_used_at": null,
///   "plaintext": "azp_AbCdEfGh..."
/// }
/// ```
pub async fn create_api_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateApiTokenRequest>,
) -> ApiResult<(StatusCode, Json<CreateApiTokenResponse>)> {
    validate_request(&req)?;

    let (token, plaintext) = ApiToken::create(&state.db, auth.user_id, req.name.trim()).await?;

    tracing::info!(user_id = %auth.user_id, token_id = %token.id, "API token created");

    Ok((
        StatusCode::CREATED,
        Json(CreateApiTokenResponse { token, plaintext }),
    ))
}

/// List the caller's API tokens, newest first
pub async fn list_api_tokens(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ApiToken>>> {
    Ok(Json(ApiToken::list_by_user(&state.db, auth.user_id).await?))
}

/// Revoke an API token
///
/// The token stays listed as inactive and can no longer authenticate.
pub async fn revoke_api_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !ApiToken::revoke(&state.db, id, auth.user_id).await? {
        return Err(ApiError::NotFound("API token not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, token_id = %id, "API token revoked");
    Ok(Json(MessageResponse::new("API token revoked")))
}

/// Delete an API token
pub async fn delete_api_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !ApiToken::delete(&state.db, id, auth.user_id).await? {
        return Err(ApiError::NotFound("API token not found".to_string()));
    }

    Ok(Json(MessageResponse::new("API token deleted")))
}
