/*
 * Responsibility
 * - Authorization header を AuthorizationGate に通し、認可済み claims を handler に渡す
 * - 失敗時は AppError (401 / 403 / 503) に変換して handler を実行させない
 *
 * 置くもの
 *  - Authorized<P> の定義（ジェネリック本体）
 *  - impl FromRequestParts<AppState> for Authorized<P>
 *
 * 置かないもの
 *  - 具体的な permission 名 (types.rs)
 */
use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::auth::{DecodedClaims, PermissionRequirement};
use crate::state::AppState;

use super::types::Permission;

/// Claims of a caller that passed the gate with permission `P`.
pub struct Authorized<P> {
    pub claims: DecodedClaims,
    _permission: PhantomData<P>,
}

impl<P: Permission> Authorized<P> {
    fn new(claims: DecodedClaims) -> Self {
        Self {
            claims,
            _permission: PhantomData,
        }
    }

    pub fn requirement() -> PermissionRequirement {
        PermissionRequirement::new(P::REQUIRED)
    }
}

impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: Permission,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = state
            .auth
            .authorize_headers(&parts.headers, &Self::requirement())
            .await?;
        Ok(Self::new(claims))
    }
}

impl<P: Permission> std::fmt::Debug for Authorized<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorized")
            .field("required", &P::REQUIRED)
            .field("subject", &self.claims.subject)
            .finish()
    }
}
