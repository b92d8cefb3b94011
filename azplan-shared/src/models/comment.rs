/// Comment model and database operations
///
/// The author (`user_id`) is fixed at creation. Listings join the author's
/// username so clients don't need a second lookup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Inserts a comment and returns it with the author's username
    pub async fn create(
        pool: &PgPool,
        plan_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "WITH inserted AS (
                INSERT INTO comments (plan_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, plan_id, user_id, content, created_at, updated_at
             )
             SELECT i.id, i.plan_id, i.user_id, u.username, i.content, i.created_at, i.updated_at
             FROM inserted i
             JOIN users u ON u.id = i.user_id",
        )
        .bind(plan_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    /// Lists a plan's comments, newest first
    pub async fn list_by_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.plan_id, c.user_id, u.username, c.content, c.created_at, c.updated_at
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.plan_id = $1
             ORDER BY c.created_at DESC, c.id",
        )
        .bind(plan_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete_by_plan<'e, E>(executor: E, plan_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM comments WHERE plan_id = $1")
            .bind(plan_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
