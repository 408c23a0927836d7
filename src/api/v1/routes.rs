/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health (公開), /auth (認証のみ)
 * - permission が必要な route は handler 引数の Authorized<Tag> で宣言する
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{auth::introspect, health::health};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth", get(introspect))
}
