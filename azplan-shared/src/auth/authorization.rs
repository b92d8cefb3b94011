/// Authorization checks
///
/// Projects, plans, tasks, API tokens and shared links are visible only to
/// their owner; the model functions enforce that by filtering on the
/// caller's id. This module covers the one case that needs more: reading a
/// plan and its comments through a shared link.
///
/// # Example
///
/// ```no_run
/// use azplan_shared::auth::{authorization::{require_plan_read, PlanAccess}, middleware::AuthContext};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, auth: AuthContext, plan_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let (plan, access) = require_plan_read(&pool, &auth, plan_id, Some("share-token")).await?;
/// if access == PlanAccess::Owner {
///     println!("{} is yours", plan.title);
/// }
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::{
    plan::Plan,
    project::Project,
    shared_link::{LinkState, SharedLink},
};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Plan not found")]
    PlanNotFound,

    #[error("Not authorized to access this resource")]
    NotAuthorized,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// How the caller came to be allowed to read a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAccess {
    Owner,
    SharedLink,
}

/// Checks that a share token opens `plan_id` right now
pub fn share_token_grants(link: &SharedLink, plan_id: Uuid) -> bool {
    link.plan_id == plan_id && link.state() == LinkState::Usable
}

/// Loads a plan the caller may read
///
/// The owner always may; anyone else needs an active, unexpired share
/// token for this very plan.
///
/// # Errors
///
/// - `PlanNotFound` if no plan has this id
/// - `NotAuthorized` if the plan exists but the caller may not read it
pub async fn require_plan_read(
    pool: &PgPool,
    auth: &AuthContext,
    plan_id: Uuid,
    share_token: Option<&str>,
) -> Result<(Plan, PlanAccess), AuthzError> {
    let plan = Plan::find_by_id(pool, plan_id)
        .await?
        .ok_or(AuthzError::PlanNotFound)?;

    if Project::find_owned(pool, plan.project_id, auth.user_id)
        .await?
        .is_some()
    {
        return Ok((plan, PlanAccess::Owner));
    }

    let Some(token) = share_token else {
        return Err(AuthzError::NotAuthorized);
    };

    match SharedLink::find_by_token(pool, token).await? {
        Some(link) if share_token_grants(&link, plan.id) => Ok((plan, PlanAccess::SharedLink)),
        _ => {
            tracing::debug!(plan_id = %plan_id, user_id = %auth.user_id, "Share token does not grant access");
            Err(AuthzError::NotAuthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn link(plan_id: Uuid, is_active: bool, expires_in: Option<Duration>) -> SharedLink {
        SharedLink {
            id: Uuid::new_v4(),
            plan_id,
            owner_id: Uuid::new_v4(),
            share_token: Uuid::new_v4().to_string(),
            is_active,
            expires_at: expires_in.map(|d| Utc::now() + d),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_share_token_grants_only_its_plan() {
        let plan_id = Uuid::new_v4();
        let shared = link(plan_id, true, None);

        assert!(share_token_grants(&shared, plan_id));
        assert!(!share_token_grants(&shared, Uuid::new_v4()));
    }

    #[test]
    fn test_share_token_must_be_usable() {
        let plan_id = Uuid::new_v4();

        assert!(!share_token_grants(&link(plan_id, false, None), plan_id));
        assert!(!share_token_grants(&link(plan_id, true, Some(Duration::hours(-1))), plan_id));
        assert!(share_token_grants(&link(plan_id, true, Some(Duration::hours(1))), plan_id));
    }
}
