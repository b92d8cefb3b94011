/// Statistics endpoints
///
/// - `GET /v1/projects/:project_id/statistics` - One project
/// - `GET /v1/statistics` - Every plan the caller owns
///
/// Across projects the same letter can occur more than once; the extremes
/// then name the letter of whichever plan came first, projects ordered by
/// creation.

use super::owned_project;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use azplan_planner::PlanStatistics;
use azplan_shared::{auth::middleware::AuthContext, models::plan::PlanWithTasks};
use uuid::Uuid;

pub async fn project_statistics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<PlanStatistics>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    let plans = PlanWithTasks::load_for_project(&state.db, project.id).await?;

    Ok(Json(PlanStatistics::compute(&plans)))
}

pub async fn overall_statistics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PlanStatistics>> {
    let plans = PlanWithTasks::load_for_owner(&state.db, auth.user_id).await?;
    Ok(Json(PlanStatistics::compute(&plans)))
}
