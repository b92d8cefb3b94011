/// Plan model and database operations
///
/// Plans are the lettered steps of a project. Letter `A` is the anchor
/// describing the starting state: its title is fixed and it cannot be
/// deleted directly. Letter `Z` holds the goal that intermediate plans
/// `B`-`Y` lead to.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE plans (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     plan_letter VARCHAR(1) NOT NULL CHECK (plan_letter ~ '^[A-Z]$'),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     start_date TIMESTAMPTZ,
///     end_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, plan_letter)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::{collections::HashMap, fmt, str::FromStr};
use uuid::Uuid;

use super::{
    patch::{double_option, SetClause},
    task::Task,
};

const PLAN_COLUMNS: &str =
    "id, project_id, plan_letter, title, description, start_date, end_date, created_at, updated_at";

/// Title given to the anchor plan when a project is created
pub const ANCHOR_TITLE: &str = "Plan A - Starting Point";

/// Description given to the anchor plan when a project is created
pub const ANCHOR_DESCRIPTION: &str =
    "This is your starting point. Plan A represents where you are now.";

/// Longest title the `plans.title` column holds, in characters
pub const MAX_TITLE_LENGTH: usize = 200;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whether `title` is non-blank and fits the title column
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty() && title.chars().count() <= MAX_TITLE_LENGTH
}

/// Error for strings that are not a single letter A-Z
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid plan letter {0:?}: expected a single letter A-Z")]
pub struct PlanLetterError(pub String);

/// A plan letter, guaranteed to be one of `A`..=`Z`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanLetter(char);

impl PlanLetter {
    /// The anchor plan
    pub const A: PlanLetter = PlanLetter('A');

    /// The goal plan
    pub const Z: PlanLetter = PlanLetter('Z');

    pub fn new(letter: char) -> Result<Self, PlanLetterError> {
        if letter.is_ascii_uppercase() {
            Ok(Self(letter))
        } else {
            Err(PlanLetterError(letter.to_string()))
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// Whether this is Plan A
    pub fn is_anchor(self) -> bool {
        self == Self::A
    }

    /// Whether this is one of the generated letters `B`-`Y`
    pub fn is_intermediate(self) -> bool {
        self != Self::A && self != Self::Z
    }

    /// Letters `B` through `Y` in order
    pub fn intermediate() -> impl Iterator<Item = PlanLetter> {
        ('B'..='Y').map(PlanLetter)
    }
}

impl fmt::Display for PlanLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlanLetter {
    type Err = PlanLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::new(letter).map_err(|_| PlanLetterError(s.to_string())),
            _ => Err(PlanLetterError(s.to_string())),
        }
    }
}

impl TryFrom<String> for PlanLetter {
    type Error = PlanLetterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlanLetter> for String {
    fn from(letter: PlanLetter) -> Self {
        letter.0.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub project_id: Uuid,

    #[sqlx(try_from = "String")]
    pub plan_letter: PlanLetter,

    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// `end_date - start_date` in whole days, floored
    ///
    /// `None` unless both dates are set.
    pub fn duration_days(&self) -> Option<i64> {
        let (start, end) = (self.start_date?, self.end_date?);
        let span = end - start;

        // num_seconds truncates toward zero; a negative fraction floors one lower
        let mut seconds = span.num_seconds();
        if span.subsec_nanos() < 0 {
            seconds -= 1;
        }
        Some(seconds.div_euclid(SECONDS_PER_DAY))
    }
}

/// Letter, title, description and dates of a plan, without identity
///
/// Used for inserts and for generated proposals that are upserted by letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub plan_letter: PlanLetter,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl PlanDraft {
    /// The Plan A every new project starts with
    pub fn anchor() -> Self {
        Self {
            plan_letter: PlanLetter::A,
            title: ANCHOR_TITLE.to_string(),
            description: Some(ANCHOR_DESCRIPTION.to_string()),
            start_date: None,
            end_date: None,
        }
    }
}

impl From<&Plan> for PlanDraft {
    fn from(plan: &Plan) -> Self {
        Self {
            plan_letter: plan.plan_letter,
            title: plan.title.clone(),
            description: plan.description.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
        }
    }
}

/// Partial plan update
///
/// The letter is fixed at creation; nullable fields accept `null` to clear.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlan {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl Plan {
    /// Inserts a plan into a project
    ///
    /// # Errors
    ///
    /// Violating `plans_project_id_plan_letter_key` means the letter is
    /// already taken in this project.
    pub async fn create<'e, E>(
        executor: E,
        project_id: Uuid,
        draft: &PlanDraft,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Plan>(&format!(
            "INSERT INTO plans (project_id, plan_letter, title, description, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(project_id)
        .bind(String::from(draft.plan_letter))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .fetch_one(executor)
        .await
    }

    /// Inserts the draft, or overwrites the plan already holding its letter
    pub async fn upsert<'e, E>(
        executor: E,
        project_id: Uuid,
        draft: &PlanDraft,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Plan>(&format!(
            "INSERT INTO plans (project_id, plan_letter, title, description, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (project_id, plan_letter) DO UPDATE
             SET title = EXCLUDED.title,
                 description = EXCLUDED.description,
                 start_date = EXCLUDED.start_date,
                 end_date = EXCLUDED.end_date,
                 updated_at = NOW()
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(project_id)
        .bind(String::from(draft.plan_letter))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(&format!("SELECT {} FROM plans WHERE id = $1", PLAN_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a plan inside a given project
    pub async fn find_in_project(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(&format!(
            "SELECT {} FROM plans WHERE id = $1 AND project_id = $2",
            PLAN_COLUMNS
        ))
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a plan whose project belongs to `owner_id`
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(
            "SELECT p.id, p.project_id, p.plan_letter, p.title, p.description,
                    p.start_date, p.end_date, p.created_at, p.updated_at
             FROM plans p
             JOIN projects pr ON pr.id = p.project_id
             WHERE p.id = $1 AND pr.owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_letter(
        pool: &PgPool,
        project_id: Uuid,
        letter: PlanLetter,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(&format!(
            "SELECT {} FROM plans WHERE project_id = $1 AND plan_letter = $2",
            PLAN_COLUMNS
        ))
        .bind(project_id)
        .bind(String::from(letter))
        .fetch_optional(pool)
        .await
    }

    /// Lists a project's plans ordered by letter
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(&format!(
            "SELECT {} FROM plans WHERE project_id = $1 ORDER BY plan_letter",
            PLAN_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every plan across a user's projects
    ///
    /// Ordered by project creation, then letter.
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>(
            "SELECT p.id, p.project_id, p.plan_letter, p.title, p.description,
                    p.start_date, p.end_date, p.created_at, p.updated_at
             FROM plans p
             JOIN projects pr ON pr.id = p.project_id
             WHERE pr.owner_id = $1
             ORDER BY pr.created_at, pr.id, p.plan_letter",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update to a plan inside a project
    ///
    /// Callers enforce the Plan A title rule before getting here.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        project_id: Uuid,
        data: UpdatePlan,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut clause = SetClause::new("plans");
        clause.set("title", data.title.is_some());
        clause.set("description", data.description.is_some());
        clause.set("start_date", data.start_date.is_some());
        clause.set("end_date", data.end_date.is_some());
        let project = clause.placeholder();
        let sql = clause.finish(&format!(
            "WHERE id = $1 AND project_id = {} RETURNING {}",
            project, PLAN_COLUMNS
        ));

        let mut query = sqlx::query_as::<_, Plan>(&sql).bind(id);
        if let Some(title) = data.title {
            query = query.bind(title);
        }
        if let Some(description) = data.description {
            query = query.bind(description);
        }
        if let Some(start_date) = data.start_date {
            query = query.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            query = query.bind(end_date);
        }

        query.bind(project_id).fetch_optional(pool).await
    }

    /// Deletes a plan; the anchor is never matched
    pub async fn delete(pool: &PgPool, id: Uuid, project_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM plans WHERE id = $1 AND project_id = $2 AND plan_letter <> 'A'",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every plan except the anchor, returning how many were deleted
    pub async fn delete_all_but_anchor<'e, E>(executor: E, project_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM plans WHERE project_id = $1 AND plan_letter <> 'A'")
            .bind(project_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

/// A plan together with its tasks
#[derive(Debug, Clone, Serialize)]
pub struct PlanWithTasks {
    #[serde(flatten)]
    pub plan: Plan,
    pub tasks: Vec<Task>,
}

impl PlanWithTasks {
    pub fn total_cost(&self) -> f64 {
        self.tasks.iter().map(|t| t.cost).sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.tasks.iter().map(|t| t.revenue).sum()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    /// Attaches tasks to their plans, keeping the plans' order
    pub fn assemble(plans: Vec<Plan>, tasks: Vec<Task>) -> Vec<Self> {
        let mut by_plan: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_plan.entry(task.plan_id).or_default().push(task);
        }

        plans
            .into_iter()
            .map(|plan| {
                let tasks = by_plan.remove(&plan.id).unwrap_or_default();
                PlanWithTasks { plan, tasks }
            })
            .collect()
    }

    /// Loads one plan's tasks
    pub async fn load(pool: &PgPool, plan: Plan) -> Result<Self, sqlx::Error> {
        let tasks = Task::list_by_plan(pool, plan.id).await?;
        Ok(Self { plan, tasks })
    }

    /// Loads every plan of a project with its tasks, ordered by letter
    pub async fn load_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let plans = Plan::list_by_project(pool, project_id).await?;
        Self::load_many(pool, plans).await
    }

    /// Loads every plan a user owns with its tasks
    pub async fn load_for_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let plans = Plan::list_by_owner(pool, owner_id).await?;
        Self::load_many(pool, plans).await
    }

    async fn load_many(pool: &PgPool, plans: Vec<Plan>) -> Result<Vec<Self>, sqlx::Error> {
        if plans.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();
        let tasks = Task::list_by_plans(pool, &ids).await?;
        Ok(Self::assemble(plans, tasks))
    }
}

/// A plan with its per-plan totals, as shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    #[serde(flatten)]
    pub plan: Plan,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub task_count: usize,
    pub completed_task_count: usize,
}

impl From<&PlanWithTasks> for PlanSummary {
    fn from(entry: &PlanWithTasks) -> Self {
        Self {
            plan: entry.plan.clone(),
            total_cost: entry.total_cost(),
            total_revenue: entry.total_revenue(),
            task_count: entry.task_count(),
            completed_task_count: entry.completed_task_count(),
        }
    }
}
