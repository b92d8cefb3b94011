/// Database models for A-Z Plan
///
/// Each model owns its CRUD operations as associated functions taking a
/// pool (or, where a handler needs atomicity, any Postgres executor).
/// Relationships are plain foreign-key ids; nothing holds its parent.
///
/// # Models
///
/// - `user`: Accounts with unique username and email
/// - `project`: Top-level container owned by a user
/// - `plan`: Lettered A-Z steps inside a project, plus `PlanLetter`
/// - `task`: Costed work items inside a plan
/// - `comment`: Discussion on a plan
/// - `api_token`: Opaque tokens for programmatic access
/// - `shared_link`: Read-only share tokens for a single plan
///
/// # Example
///
/// ```no_run
/// use azplan_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(
///     &pool,
///     CreateProject {
///         owner_id,
///         title: "Open a bakery".to_string(),
///         description: None,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod api_token;
pub mod comment;
pub mod patch;
pub mod plan;
pub mod project;
pub mod shared_link;
pub mod task;
pub mod user;
