/// Project model and database operations
///
/// A project is the container for one A-Z plan sequence. Every query that
/// takes a caller id filters on `owner_id`, so a row owned by someone else
/// is indistinguishable from a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::patch::{double_option, SetClause};

const PROJECT_COLUMNS: &str = "id, owner_id, title, description, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// Partial update; `description: Some(None)` clears it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

impl Project {
    /// Inserts a project
    ///
    /// Generic over the executor so the caller can create the project and
    /// its Plan A inside one transaction.
    pub async fn create<'e, E>(executor: E, data: CreateProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (owner_id, title, description) VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(executor)
        .await
    }

    /// Finds a project owned by `owner_id`
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1 AND owner_id = $2",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's projects, oldest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE owner_id = $1 ORDER BY created_at, id",
            PROJECT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update to an owned project
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut clause = SetClause::new("projects");
        clause.set("title", data.title.is_some());
        clause.set("description", data.description.is_some());
        let owner = clause.placeholder();
        let sql = clause.finish(&format!(
            "WHERE id = $1 AND owner_id = {} RETURNING {}",
            owner, PROJECT_COLUMNS
        ));

        let mut query = sqlx::query_as::<_, Project>(&sql).bind(id);
        if let Some(title) = data.title {
            query = query.bind(title);
        }
        if let Some(description) = data.description {
            query = query.bind(description);
        }

        query.bind(owner_id).fetch_optional(pool).await
    }

    /// Deletes an owned project with all its plans, tasks and comments
    pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
