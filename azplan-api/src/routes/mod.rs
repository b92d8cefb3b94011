/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh and the current user
/// - `api_tokens`: API token management
/// - `projects`: Project CRUD
/// - `plans`: Lettered plans, including AI generation of B-Y
/// - `tasks`: Tasks inside a plan
/// - `comments`: Plan discussion, open to share-token holders
/// - `shared`: Share links and the public read-only plan view
/// - `statistics`: Cost, duration and completion figures

pub mod api_tokens;
pub mod auth;
pub mod comments;
pub mod health;
pub mod plans;
pub mod projects;
pub mod shared;
pub mod statistics;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use azplan_shared::models::{
    plan::{is_valid_title, Plan},
    project::Project,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Body of endpoints that only confirm an action
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Loads a project owned by the caller, or 404
pub(crate) async fn owned_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> ApiResult<Project> {
    Project::find_owned(pool, project_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Loads a plan whose project the caller owns, or 404
pub(crate) async fn owned_plan(pool: &PgPool, plan_id: Uuid, user_id: Uuid) -> ApiResult<Plan> {
    Plan::find_owned(pool, plan_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".to_string()))
}

/// Title rule for patch bodies, which are not `Validate` types
pub(crate) fn check_title(title: Option<&str>) -> ApiResult<()> {
    match title {
        Some(title) if !is_valid_title(title) => Err(ApiError::invalid_field(
            "title",
            "Title must be 1-200 characters",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_title() {
        assert!(check_title(None).is_ok());
        assert!(check_title(Some("Open a bakery")).is_ok());
        assert!(check_title(Some(&"x".repeat(200))).is_ok());
        assert!(check_title(Some("   ")).is_err());
        assert!(check_title(Some(&"x".repeat(201))).is_err());
    }
}
