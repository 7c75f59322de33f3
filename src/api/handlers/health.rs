use axum::{Json, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

pub const SERVICE_NAME: &str = "metadata-extractor";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Serialize, ToSchema)]
pub struct InfoResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service description", body = InfoResponse)
    ),
    tag = "system"
)]
pub async fn index() -> impl IntoResponse {
    Json(InfoResponse {
        message: "API de extração de metadados. Envie arquivos via POST /upload.".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service liveness", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "online".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
