/// Shared link endpoints
///
/// A shared link gives read-only access to one plan through an unguessable
/// token, without an account. Links can carry an expiry and can be turned
/// off by their owner.
///
/// # Endpoints
///
/// - `POST /v1/plans/:plan_id/share` - Create a link (`{"expires_at": ...}`)
/// - `GET /v1/plans/:plan_id/share` - List a plan's links
/// - `POST /v1/shared-links/:id/deactivate` - Turn a link off
/// - `GET /v1/shared/:token` - Public view of the shared plan with its tasks

use super::owned_plan;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use azplan_shared::{
    auth::middleware::AuthContext,
    models::{
        plan::{Plan, PlanWithTasks},
        shared_link::{LinkState, SharedLink},
    },
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSharedLinkRequest {
    /// No expiry when absent
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

pub async fn create_shared_link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<CreateSharedLinkRequest>,
) -> ApiResult<(StatusCode, Json<SharedLink>)> {
    let plan = owned_plan(&state.db, plan_id, auth.user_id).await?;
    let link = SharedLink::create(&state.db, plan.id, auth.user_id, req.expires_at).await?;

    tracing::info!(plan_id = %plan.id, link_id = %link.id, "Shared link created");
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn list_shared_links(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SharedLink>>> {
    let plan = owned_plan(&state.db, plan_id, auth.user_id).await?;
    Ok(Json(SharedLink::list_by_plan(&state.db, plan.id, auth.user_id).await?))
}

pub async fn deactivate_shared_link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SharedLink>> {
    let link = SharedLink::deactivate(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shared link not found".to_string()))?;

    tracing::info!(link_id = %link.id, "Shared link deactivated");
    Ok(Json(link))
}

/// Public read-only view of a shared plan
///
/// # Errors
///
/// - `404 Not Found`: Unknown or deactivated token
/// - `410 Gone`: The link has expired
pub async fn view_shared_plan(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<PlanWithTasks>> {
    let link = SharedLink::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shared link not found".to_string()))?;

    match link.state() {
        LinkState::Usable => {}
        LinkState::Inactive => return Err(ApiError::NotFound("Shared link not found".to_string())),
        LinkState::Expired => return Err(ApiError::Gone("Shared link has expired".to_string())),
    }

    let plan = Plan::find_by_id(&state.db, link.plan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

    Ok(Json(PlanWithTasks::load(&state.db, plan).await?))
}
