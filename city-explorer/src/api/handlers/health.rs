use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    /// API key variables that are not set; those providers fail at call time.
    pub missing_api_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
}

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    if let Err(e) = state.db.sync().await {
        tracing::warn!(error = %e, "Replica sync failed");
    }

    let (status, db_status) = match state.db.ping().await {
        Ok(_) => ("ok", "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            ("degraded", "error")
        }
    };

    Json(HealthData {
        status: status.to_string(),
        version: crate::VERSION.to_string(),
        database: DatabaseStatus {
            status: db_status.to_string(),
        },
        missing_api_keys: state
            .config
            .providers
            .missing_keys()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
