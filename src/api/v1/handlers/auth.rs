/*
 * Responsibility
 * - GET /api/v1/auth
 * - 認証のみ (permission 不要) で、検証済み claims 全体をそのまま返す
 */
use axum::{Json, response::IntoResponse};
use serde_json::{Value, json};

use crate::api::v1::extractors::{AuthOnly, Authorized};

pub async fn introspect(auth: Authorized<AuthOnly>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "payload": Value::Object(auth.claims.into_raw()),
    }))
}
