use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

/// Liveness only; never touches the database.
#[utoipa::path(
    get,
    path = "/api/auth/health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}
