//! Factory: build the `AuthorizationGate` from application `Config`.
use std::sync::Arc;

use tracing::error;

use crate::config::AuthSettings;
use crate::error::AppError;
use crate::services::auth::{
    AuthorizationGate,
    claims::ClaimValidator,
    jwks::{HttpKeySource, KeySetResolver},
    signature::SignatureVerifier,
};

pub fn build_authorization_gate(settings: &AuthSettings) -> Result<Arc<AuthorizationGate>, AppError> {
    let source = HttpKeySource::new(
        settings.jwks_url.clone(),
        settings.jwks_fetch_timeout,
        settings.jwks_allow_http,
    )
    .map_err(|e| {
        error!(error = %e, "failed to build key-discovery client");
        AppError::Internal
    })?;

    let keys = Arc::new(KeySetResolver::new(
        Arc::new(source),
        settings.jwks_cache_ttl,
        settings.jwks_fetch_timeout,
    ));

    let gate = AuthorizationGate::new(
        SignatureVerifier::new(keys, settings.algorithm),
        ClaimValidator::new(
            &settings.issuer,
            &settings.audience,
            settings.leeway_seconds,
        ),
    );

    Ok(Arc::new(gate))
}
