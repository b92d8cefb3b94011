/// Comment endpoints
///
/// The owner of a plan may always read and post comments. Anyone else needs
/// an active, unexpired share token for that plan, passed as the
/// `share_token` query parameter.
///
/// # Endpoints
///
/// - `GET /v1/plans/:plan_id/comments[?share_token=...]` - Newest first
/// - `POST /v1/plans/:plan_id/comments[?share_token=...]` - Add a comment
///
/// # Errors
///
/// - `404 Not Found`: No plan with this id
/// - `403 Forbidden`: The plan exists but the caller may not read it

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use azplan_shared::{
    auth::{authorization::require_plan_read, middleware::AuthContext},
    models::comment::Comment,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct ShareQuery {
    pub share_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10000, message = "Comment must be 1-10000 characters"))]
    pub content: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(plan_id): Path<Uuid>,
    Query(query): Query<ShareQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    let (plan, _) = require_plan_read(&state.db, &auth, plan_id, query.share_token.as_deref()).await?;

    Ok(Json(Comment::list_by_plan(&state.db, plan.id).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(plan_id): Path<Uuid>,
    Query(query): Query<ShareQuery>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let (plan, access) =
        require_plan_read(&state.db, &auth, plan_id, query.share_token.as_deref()).await?;
    validate_request(&req)?;

    let comment = Comment::create(&state.db, plan.id, auth.user_id, &req.content).await?;

    tracing::debug!(plan_id = %plan.id, user_id = %auth.user_id, ?access, "Comment added");
    Ok((StatusCode::CREATED, Json(comment)))
}
