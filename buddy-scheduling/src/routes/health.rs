use axum::Json;
use buddy_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "buddy-scheduling",
        env!("CARGO_PKG_VERSION"),
    ))
}
