/// Task endpoints
///
/// Tasks are the costed work items of a plan. Their cost and revenue feed
/// the plan totals and the statistics.
///
/// # Endpoints
///
/// - `GET /v1/plans/:plan_id/tasks` - Tasks of a plan, in order
/// - `POST /v1/plans/:plan_id/tasks` - Add a task
/// - `PUT /v1/tasks/:task_id` - Partial update
/// - `DELETE /v1/tasks/:task_id` - Delete

use super::{check_title, owned_plan, MessageResponse};
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
    models::task::{CreateTask, Task, UpdateTask},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: i32,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Cost must not be negative"))]
    pub cost: f64,

    #[serde(default)]
    pub revenue: f64,

    pub support_target: Option<String>,

    #[serde(default)]
    pub is_completed: bool,
}

/// Rules `UpdateTask` fields share with task creation
fn check_update(update: &UpdateTask) -> ApiResult<()> {
    check_title(update.title.as_deref())?;

    if update.order.is_some_and(|order| order < 0) {
        return Err(ApiError::invalid_field("order", "Order must not be negative"));
    }
    if update.cost.is_some_and(|cost| cost < 0.0 || !cost.is_finite()) {
        return Err(ApiError::invalid_field("cost", "Cost must not be negative"));
    }
    if update.revenue.is_some_and(|revenue| !revenue.is_finite()) {
        return Err(ApiError::invalid_field("revenue", "Revenue must be a number"));
    }

    Ok(())
}

async fn owned_task(state: &AppState, task_id: Uuid, user_id: Uuid) -> ApiResult<Task> {
    Task::find_owned(&state.db, task_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let plan = owned_plan(&state.db, plan_id, auth.user_id).await?;
    Ok(Json(Task::list_by_plan(&state.db, plan.id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let plan = owned_plan(&state.db, plan_id, auth.user_id).await?;
    validate_request(&req)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            plan_id: plan.id,
            order: req.order,
            title: req.title,
            description: req.description,
            cost: req.cost,
            revenue: req.revenue,
            support_target: req.support_target,
            is_completed: req.is_completed,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partial update; `description` and `support_target` accept `null` to clear
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(update): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let task = owned_task(&state, task_id, auth.user_id).await?;
    check_update(&update)?;

    let task = Task::update(&state.db, task.id, task.plan_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let task = owned_task(&state, task_id, auth.user_id).await?;

    if !Task::delete(&state.db, task.id, task.plan_id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Task deleted")))
}
