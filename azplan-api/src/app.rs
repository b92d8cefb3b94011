/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use azplan_api::{app::AppState, config::Config};
/// use azplan_planner::OllamaGenerator;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let generator = Arc::new(OllamaGenerator::new(config.generator.clone())?);
/// let state = AppState::new(pool, config, generator);
/// let app = azplan_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use azplan_planner::PlanGenerator;
use azplan_shared::auth::middleware::{authenticate, API_TOKEN_HEADER};
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Plan generation service
    pub generator: Arc<dyn PlanGenerator>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            generator,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(API_TOKEN_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /health                                   # Health check (public)
/// /v1/
/// ├── /health                               # Same check, versioned
/// ├── /auth/register|login|refresh          # Public
/// ├── /shared/:token                        # Public, read-only plan view
/// └── (authenticated: Bearer JWT or X-Api-Token)
///     ├── /auth/me
///     ├── /api-tokens, /api-tokens/:id, /api-tokens/:id/revoke
///     ├── /projects, /projects/:project_id
///     ├── /projects/:project_id/plans
///     ├── /projects/:project_id/plans/generate
///     ├── /projects/:project_id/plans/:plan_id
///     ├── /projects/:project_id/statistics
///     ├── /statistics
///     ├── /plans/:plan_id/tasks, /tasks/:task_id
///     ├── /plans/:plan_id/comments
///     ├── /plans/:plan_id/share
///     └── /shared-links/:id/deactivate
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost last):
/// 1. Authentication (protected routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/shared/:token", get(routes::shared::view_shared_plan));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/api-tokens",
            post(routes::api_tokens::create_api_token).get(routes::api_tokens::list_api_tokens),
        )
        .route("/api-tokens/:id", axum::routing::delete(routes::api_tokens::delete_api_token))
        .route("/api-tokens/:id/revoke", post(routes::api_tokens::revoke_api_token))
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:project_id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/projects/:project_id/plans",
            get(routes::plans::list_plans).post(routes::plans::create_plan),
        )
        .route(
            "/projects/:project_id/plans/generate",
            post(routes::plans::generate_plans),
        )
        .route(
            "/projects/:project_id/plans/:plan_id",
            get(routes::plans::get_plan)
                .put(routes::plans::update_plan)
                .delete(routes::plans::delete_plan),
        )
        .route(
            "/projects/:project_id/statistics",
            get(routes::statistics::project_statistics),
        )
        .route("/statistics", get(routes::statistics::overall_statistics))
        .route(
            "/plans/:plan_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:task_id",
            axum::routing::put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route(
            "/plans/:plan_id/comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/plans/:plan_id/share",
            post(routes::shared::create_shared_link).get(routes::shared::list_shared_links),
        )
        .route(
            "/shared-links/:id/deactivate",
            post(routes::shared::deactivate_shared_link),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_layer));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Authentication middleware layer
///
/// Resolves the caller from a Bearer JWT or an `X-Api-Token` header and
/// injects the `AuthContext` into request extensions.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_wildcard_and_lists() {
        // Both shapes must build without panicking
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&[
            "http://localhost:3000".to_string(),
            "not a header\nvalue".to_string(),
        ]);
    }
}
