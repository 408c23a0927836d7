/*
 * Responsibility
 * - GET / (ウェルカムメッセージ, 認証不要)
 * - GET /api/v1/health (疎通用, 認証不要)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn welcome() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Welcome to the casting agency API!",
    }))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
