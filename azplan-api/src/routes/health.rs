/// Health check endpoint
///
/// Reports whether the database answers and whether the model server behind
/// plan generation is up. A down model server does not make the service
/// unhealthy: generation falls back to placeholder plans.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "generator": "healthy"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use azplan_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database is unreachable
    pub status: String,

    /// Application version
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,

    /// `healthy` or `unhealthy`
    pub generator: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (database, generator_up) = tokio::join!(
        pool::health_check(&state.db),
        state.generator.health_check()
    );

    let database_connected = database.is_ok();
    if let Err(e) = database {
        tracing::warn!(error = %e, "Database health check failed");
    }

    Json(HealthResponse {
        status: if database_connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_connected { "connected" } else { "disconnected" }.to_string(),
        generator: if generator_up { "healthy" } else { "unhealthy" }.to_string(),
    })
}
