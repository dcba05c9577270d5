//! 存活探针

use axum::Json;

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rule-api-service"
    }))
}
