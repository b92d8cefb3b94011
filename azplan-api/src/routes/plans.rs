/// Plan endpoints
///
/// Plans live inside a project, one per letter. Plan A is the anchor: it is
/// created with the project, its title is fixed and it cannot be deleted.
/// Plan Z holds the goal; `generate` asks the plan generator for the 24
/// steps in between and writes them over B-Y.
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/plans` - Plans with per-plan totals
/// - `POST /v1/projects/:project_id/plans` - Create a plan for a free letter
/// - `POST /v1/projects/:project_id/plans/generate` - Generate B-Y from Plan Z
/// - `GET /v1/projects/:project_id/plans/:plan_id` - A plan with its tasks
/// - `PUT /v1/projects/:project_id/plans/:plan_id` - Partial update
/// - `DELETE /v1/projects/:project_id/plans/:plan_id` - Delete (not Plan A)

use super::{owned_project, check_title, MessageResponse};
use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use azplan_shared::{
    auth::middleware::AuthContext,
    models::plan::{Plan, PlanDraft, PlanLetter, PlanSummary, PlanWithTasks, UpdatePlan},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Instant;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    /// Parsed into a `PlanLetter` after field validation
    pub plan_letter: String,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

async fn plan_in_project(state: &AppState, plan_id: Uuid, project_id: Uuid) -> ApiResult<Plan> {
    Plan::find_in_project(&state.db, plan_id, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))
}

pub async fn list_plans(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PlanSummary>>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    let plans = PlanWithTasks::load_for_project(&state.db, project.id).await?;

    Ok(Json(plans.iter().map(PlanSummary::from).collect()))
}

/// Create a plan
///
/// # Errors
///
/// - `400 Bad Request`: Letter is not A-Z, or already used in this project
/// - `404 Not Found`: Project not found
/// - `422 Unprocessable Entity`: Title missing or too long
pub async fn create_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreatePlanRequest>,
) -> ApiResult<(StatusCode, Json<Plan>)> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    validate_request(&req)?;

    let plan_letter: PlanLetter = req
        .plan_letter
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid plan letter".to_string()))?;

    if Plan::find_by_letter(&state.db, project.id, plan_letter)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "Plan with this letter already exists in this project".to_string(),
        ));
    }

    let draft = PlanDraft {
        plan_letter,
        title: req.title,
        description: req.description,
        start_date: req.start_date,
        end_date: req.end_date,
    };
    let plan = Plan::create(&state.db, project.id, &draft).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, plan_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PlanWithTasks>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    let plan = plan_in_project(&state, plan_id, project.id).await?;

    Ok(Json(PlanWithTasks::load(&state.db, plan).await?))
}

/// Partial update
///
/// Any title in the body of a Plan A update is refused, even an unchanged
/// one.
pub async fn update_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, plan_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<UpdatePlan>,
) -> ApiResult<Json<Plan>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    let plan = plan_in_project(&state, plan_id, project.id).await?;

    if plan.plan_letter.is_anchor() && update.title.is_some() {
        return Err(ApiError::BadRequest("Plan A title cannot be changed".to_string()));
    }
    check_title(update.title.as_deref())?;

    let plan = Plan::update(&state.db, plan.id, project.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))?;

    Ok(Json(plan))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, plan_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    let plan = plan_in_project(&state, plan_id, project.id).await?;

    if plan.plan_letter.is_anchor() {
        return Err(ApiError::BadRequest("Plan A cannot be deleted".to_string()));
    }

    if !Plan::delete(&state.db, plan.id, project.id).await? {
        return Err(ApiError::NotFound("Plan not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Plan deleted")))
}

/// Generate plans B-Y from Plan Z
///
/// Plan Z's description is the goal; existing B-Y plans are passed to the
/// generator as context. All 24 proposals are written in one transaction,
/// overwriting plans that already hold their letter. Tasks and comments of
/// overwritten plans are kept.
///
/// The generator never fails: when the model is unavailable the response
/// carries the placeholder sequence instead.
///
/// # Errors
///
/// - `404 Not Found`: Project or Plan Z not found
/// - `400 Bad Request`: Plan Z has no description
pub async fn generate_plans(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Plan>>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;

    let plan_z = Plan::find_by_letter(&state.db, project.id, PlanLetter::Z)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan Z not found".to_string()))?;

    let goal = plan_z
        .description
        .as_deref()
        .map(str::trim)
        .filter(|goal| !goal.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Plan Z must have content/description".to_string()))?;

    let existing: Vec<PlanDraft> = Plan::list_by_project(&state.db, project.id)
        .await?
        .iter()
        .filter(|plan| plan.plan_letter.is_intermediate())
        .map(PlanDraft::from)
        .collect();

    let started = Instant::now();
    let proposals = state.generator.generate(goal, &existing).await;

    let mut tx = state.db.begin().await?;
    let mut plans = Vec::with_capacity(proposals.len());
    for draft in &proposals {
        plans.push(Plan::upsert(&mut *tx, project.id, draft).await?);
    }
    tx.commit().await?;

    tracing::info!(
        user_id = %auth.user_id,
        project_id = %project.id,
        generator = state.generator.name(),
        existing = existing.len(),
        written = plans.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generated plans B-Y"
    );

    Ok(Json(plans))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_plan_request_validation() {
        let req: CreatePlanRequest = serde_json::from_str(
            r#"{"plan_letter": "C", "title": "", "start_date": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(req.validate().is_err());
        assert!(req.start_date.is_some());
        assert!(req.end_date.is_none());
    }

    #[test]
    fn test_update_plan_title_detection() {
        let update: UpdatePlan = serde_json::from_str(r#"{"description": "new"}"#).unwrap();
        assert!(update.title.is_none());

        let update: UpdatePlan = serde_json::from_str(r#"{"title": "Plan A - Starting Point"}"#).unwrap();
        assert!(update.title.is_some());
    }
}
