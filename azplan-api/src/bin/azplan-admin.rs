//! # A-Z Plan admin tool
//!
//! Maintenance commands that run directly against the database.
//!
//! ```bash
//! azplan-admin create-admin --username admin --email admin@example.com --password '...'
//! azplan-admin reset-project --project-id 6f1c...
//! ```

use anyhow::Context;
use azplan_shared::{
    auth::password::hash_password,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::{
        comment::Comment,
        plan::{Plan, PlanLetter},
        task::Task,
        user::{CreateUser, UpdateUser, User},
    },
};
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "azplan-admin", about = "A-Z Plan maintenance commands", version)]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account, or reset the one holding the username or email
    CreateAdmin {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long)]
        email: String,
        /// Stored as an Argon2id hash
        #[arg(long)]
        password: String,
    },
    /// Remove every plan except Plan A and clear Plan A's tasks and comments
    ResetProject {
        #[arg(long)]
        project_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "azplan_admin=info,azplan_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .context("DATABASE_URL must be set or passed with --database-url")?;

    let pool = create_pool(DatabaseConfig::from_url(database_url))
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let result = match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => create_admin(&pool, username, email, &password).await,
        Commands::ResetProject { project_id } => reset_project(&pool, project_id).await,
    };

    close_pool(pool).await;
    result
}

async fn create_admin(
    pool: &PgPool,
    username: String,
    email: String,
    password: &str,
) -> anyhow::Result<()> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        anyhow::bail!("username, email and password must not be empty");
    }

    let password_hash = hash_password(password)?;

    match User::find_by_username_or_email(pool, &username, &email).await? {
        Some(existing) => {
            let user = User::update(
                pool,
                existing.id,
                UpdateUser {
                    username: Some(username),
                    email: Some(email),
                    password_hash: Some(password_hash),
                    is_active: Some(true),
                },
            )
            .await?
            .context("Admin user disappeared during update")?;

            tracing::info!(user_id = %user.id, "Reset existing admin user");
            println!("Updated admin user {} <{}>", user.username, user.email);
        }
        None => {
            let user = User::create(
                pool,
                CreateUser {
                    username,
                    email,
                    password_hash,
                },
            )
            .await?;

            tracing::info!(user_id = %user.id, "Created admin user");
            println!("Created admin user {} <{}>", user.username, user.email);
        }
    }

    Ok(())
}

async fn reset_project(pool: &PgPool, project_id: Uuid) -> anyhow::Result<()> {
    let anchor = Plan::find_by_letter(pool, project_id, PlanLetter::A)
        .await?
        .with_context(|| format!("Project {} not found or has no Plan A", project_id))?;

    let mut tx = pool.begin().await?;
    let comments = Comment::delete_by_plan(&mut *tx, anchor.id).await?;
    let tasks = Task::delete_by_plan(&mut *tx, anchor.id).await?;
    let plans = Plan::delete_all_but_anchor(&mut *tx, project_id).await?;
    tx.commit().await?;

    tracing::info!(%project_id, plans, tasks, comments, "Project reset to Plan A");
    println!(
        "Reset project {}: removed {} plans; cleared {} tasks and {} comments from Plan A",
        project_id, plans, tasks, comments
    );

    Ok(())
}
