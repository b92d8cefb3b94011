/// Task model and database operations
///
/// Tasks are the costed work items of a plan. `order` is caller-assigned,
/// non-negative and may repeat; listings sort by it, then by creation time.
/// The column is named `sort_order` because `ORDER` is reserved in SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::patch::{double_option, SetClause};

const TASK_COLUMNS: &str = "id, plan_id, sort_order, title, description, cost, revenue, \
     support_target, is_completed, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub plan_id: Uuid,

    #[sqlx(rename = "sort_order")]
    pub order: i32,

    pub title: String,
    pub description: Option<String>,

    /// Non-negative
    pub cost: f64,

    pub revenue: f64,

    /// Who or what this task supports, free text
    pub support_target: Option<String>,

    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub plan_id: Uuid,
    pub order: i32,
    pub title: String,
    pub description: Option<String>,
    pub cost: f64,
    pub revenue: f64,
    pub support_target: Option<String>,
    pub is_completed: bool,
}

/// Partial task update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default)]
    pub order: Option<i32>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub cost: Option<f64>,

    #[serde(default)]
    pub revenue: Option<f64>,

    #[serde(default, deserialize_with = "double_option")]
    pub support_target: Option<Option<String>>,

    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl Task {
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks
                (plan_id, sort_order, title, description, cost, revenue, support_target, is_completed)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(data.plan_id)
        .bind(data.order)
        .bind(data.title)
        .bind(data.description)
        .bind(data.cost)
        .bind(data.revenue)
        .bind(data.support_target)
        .bind(data.is_completed)
        .fetch_one(pool)
        .await
    }

    /// Finds a task whose plan belongs to one of `owner_id`'s projects
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT t.id, t.plan_id, t.sort_order, t.title, t.description, t.cost, t.revenue,
                    t.support_target, t.is_completed, t.created_at, t.updated_at
             FROM tasks t
             JOIN plans p ON p.id = t.plan_id
             JOIN projects pr ON pr.id = p.project_id
             WHERE t.id = $1 AND pr.owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE plan_id = $1 ORDER BY sort_order, created_at, id",
            TASK_COLUMNS
        ))
        .bind(plan_id)
        .fetch_all(pool)
        .await
    }

    /// Tasks of several plans at once, each plan's tasks in listing order
    pub async fn list_by_plans(pool: &PgPool, plan_ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE plan_id = ANY($1)
             ORDER BY plan_id, sort_order, created_at, id",
            TASK_COLUMNS
        ))
        .bind(plan_ids)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update to a task in the given plan
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        plan_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut clause = SetClause::new("tasks");
        clause.set("sort_order", data.order.is_some());
        clause.set("title", data.title.is_some());
        clause.set("description", data.description.is_some());
        clause.set("cost", data.cost.is_some());
        clause.set("revenue", data.revenue.is_some());
        clause.set("support_target", data.support_target.is_some());
        clause.set("is_completed", data.is_completed.is_some());
        let plan = clause.placeholder();
        let sql = clause.finish(&format!(
            "WHERE id = $1 AND plan_id = {} RETURNING {}",
            plan, TASK_COLUMNS
        ));

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(id);
        if let Some(order) = data.order {
            query = query.bind(order);
        }
        if let Some(title) = data.title {
            query = query.bind(title);
        }
        if let Some(description) = data.description {
            query = query.bind(description);
        }
        if let Some(cost) = data.cost {
            query = query.bind(cost);
        }
        if let Some(revenue) = data.revenue {
            query = query.bind(revenue);
        }
        if let Some(support_target) = data.support_target {
            query = query.bind(support_target);
        }
        if let Some(is_completed) = data.is_completed {
            query = query.bind(is_completed);
        }

        query.bind(plan_id).fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid, plan_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND plan_id = $2")
            .bind(id)
            .bind(plan_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_plan<'e, E>(executor: E, plan_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE plan_id = $1")
            .bind(plan_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serializes_order_field() {
        let task = Task {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            order: 3,
            title: "Buy oven".to_string(),
            description: None,
            cost: 1200.0,
            revenue: 0.0,
            support_target: Some("kitchen".to_string()),
            is_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["order"], 3);
        assert!(json.get("sort_order").is_none());
    }

    #[test]
    fn test_update_task_clears_nullable_fields() {
        let update: UpdateTask =
            serde_json::from_str(r#"{"support_target": null, "is_completed": true}"#).unwrap();
        assert_eq!(update.support_target, Some(None));
        assert_eq!(update.is_completed, Some(true));
        assert!(update.description.is_none());
        assert!(update.cost.is_none());
    }
}
