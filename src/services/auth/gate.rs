//! The authorization gate: header → signature → claims → permission.
//!
//! Each stage short-circuits on the first failure. The only way to reach a
//! protected operation is through a fully authorized `DecodedClaims`.
use std::future::Future;

use axum::http::HeaderMap;
use chrono::Utc;
use tracing::warn;

use super::bearer::{self, BearerToken};
use super::claims::{ClaimValidator, DecodedClaims};
use super::error::AuthError;
use super::permission::{self, PermissionRequirement};
use super::signature::SignatureVerifier;

#[derive(Debug)]
pub struct AuthorizationGate {
    verifier: SignatureVerifier,
    claims: ClaimValidator,
}

impl AuthorizationGate {
    pub fn new(verifier: SignatureVerifier, claims: ClaimValidator) -> Self {
        Self { verifier, claims }
    }

    /// Authorize a raw `Authorization` header value.
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        required: &PermissionRequirement,
    ) -> Result<DecodedClaims, AuthError> {
        let outcome = match bearer::extract(authorization) {
            Ok(token) => self.authorize_token(&token, required).await,
            Err(err) => Err(err),
        };
        log_rejection(outcome, required)
    }

    /// Authorize using the request's `Authorization` header.
    pub async fn authorize_headers(
        &self,
        headers: &HeaderMap,
        required: &PermissionRequirement,
    ) -> Result<DecodedClaims, AuthError> {
        let outcome = match bearer::from_headers(headers) {
            Ok(token) => self.authorize_token(&token, required).await,
            Err(err) => Err(err),
        };
        log_rejection(outcome, required)
    }

    /// Run `operation` with the caller's claims, only if authorized.
    ///
    /// On rejection `operation` is dropped without being called.
    pub async fn guard<F, Fut, T>(
        &self,
        authorization: Option<&str>,
        required: &PermissionRequirement,
        operation: F,
    ) -> Result<T, AuthError>
    where
        F: FnOnce(DecodedClaims) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(authorization, required).await?;
        Ok(operation(claims).await)
    }

    async fn authorize_token(
        &self,
        token: &BearerToken,
        required: &PermissionRequirement,
    ) -> Result<DecodedClaims, AuthError> {
        let payload = self.verifier.verify(token).await?;
        let claims = self.claims.validate(payload, Utc::now())?;
        permission::check(claims, required)
    }
}

fn log_rejection(
    outcome: Result<DecodedClaims, AuthError>,
    required: &PermissionRequirement,
) -> Result<DecodedClaims, AuthError> {
    if let Err(err) = &outcome {
        warn!(
            kind = %err.kind,
            required = required.as_str(),
            "request rejected by authorization gate"
        );
    }
    outcome
}
