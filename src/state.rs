/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthorizationGate (JWKS キャッシュを内部に持つ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::AuthorizationGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthorizationGate>,
}

impl AppState {
    pub fn new(auth: Arc<AuthorizationGate>) -> Self {
        Self { auth }
    }
}
