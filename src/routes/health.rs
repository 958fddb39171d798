// src/routes/health.rs

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResp { pub status: String, pub version: String }

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is up", body = HealthResp))
)]
pub async fn health() -> Json<HealthResp> {
    Json(HealthResp { status: "ok".into(), version: "v1".into() })
}
