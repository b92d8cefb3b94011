/// Project endpoints
///
/// A project is the container for one A-Z sequence. Creating a project also
/// creates its Plan A, in the same transaction, so every project starts
/// with its anchor.
///
/// # Endpoints
///
/// - `GET /v1/projects` - List the caller's projects
/// - `POST /v1/projects` - Create a project (and its Plan A)
/// - `GET /v1/projects/:project_id` - A project with its plan summaries
/// - `PUT /v1/projects/:project_id` - Partial update
/// - `DELETE /v1/projects/:project_id` - Delete with all plans, tasks and comments

use super::{check_title, owned_project, MessageResponse};
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
    models::{
        plan::{Plan, PlanDraft, PlanSummary, PlanWithTasks},
        project::{CreateProject, Project, UpdateProject},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,
}

/// A freshly created project and its anchor plan
#[derive(Debug, Serialize)]
pub struct CreatedProject {
    #[serde(flatten)]
    pub project: Project,
    pub anchor_plan: Plan,
}

/// A project with per-plan totals
#[derive(Debug, Serialize)]
pub struct ProjectWithPlans {
    #[serde(flatten)]
    pub project: Project,
    pub plans: Vec<PlanSummary>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(Project::list_by_owner(&state.db, auth.user_id).await?))
}

/// Create a project with its Plan A
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<CreatedProject>)> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;

    let project = Project::create(
        &mut *tx,
        CreateProject {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
        },
    )
    .await?;
    let anchor_plan = Plan::create(&mut *tx, project.id, &PlanDraft::anchor()).await?;

    tx.commit().await?;

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedProject {
            project,
            anchor_plan,
        }),
    ))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectWithPlans>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;
    let plans = PlanWithTasks::load_for_project(&state.db, project.id).await?;

    Ok(Json(ProjectWithPlans {
        project,
        plans: plans.iter().map(PlanSummary::from).collect(),
    }))
}

/// Partial update; absent fields are kept, `description: null` clears
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(update): Json<UpdateProject>,
) -> ApiResult<Json<Project>> {
    check_title(update.title.as_deref())?;

    if update.is_empty() {
        return Ok(Json(owned_project(&state.db, project_id, auth.user_id).await?));
    }

    let project = Project::update(&state.db, project_id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let project = owned_project(&state.db, project_id, auth.user_id).await?;

    if !Project::delete(&state.db, project.id, auth.user_id).await? {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project deleted");
    Ok(Json(MessageResponse::new(format!(
        "Project '{}' deleted successfully",
        project.title
    ))))
}
