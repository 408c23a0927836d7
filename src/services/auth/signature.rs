//! Signature verification against the identity provider's published keys.
use std::{str::FromStr, sync::Arc};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::bearer::BearerToken;
use super::error::{AuthError, AuthErrorKind};
use super::jwks::KeySetResolver;

/// The accepted signing algorithms. Only RSA; `none` and HMAC never parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    RS256,
    RS384,
    RS512,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported signing algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

impl SigningAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
        }
    }

    fn jwt(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            other => Err(UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Token payload whose signature has been checked.
///
/// Only [`SignatureVerifier::verify`] produces one.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayload(serde_json::Value);

impl VerifiedPayload {
    pub(crate) fn into_inner(self) -> serde_json::Value {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn assume_verified(value: serde_json::Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

pub struct SignatureVerifier {
    keys: Arc<KeySetResolver>,
    algorithm: SigningAlgorithm,
    validation: Validation,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("algorithm", &self.algorithm)
            .field("keys", &self.keys)
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(keys: Arc<KeySetResolver>, algorithm: SigningAlgorithm) -> Self {
        // Signature only. Registered claims are ClaimValidator's job.
        let mut validation = Validation::new(algorithm.jwt());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            keys,
            algorithm,
            validation,
        }
    }

    pub async fn verify(&self, token: &BearerToken) -> Result<VerifiedPayload, AuthError> {
        let header = parse_header(token.as_str())?;

        if header.alg != self.algorithm.as_str() {
            return Err(AuthErrorKind::InvalidAlgorithm.into());
        }

        let kid = header.kid.ok_or(AuthErrorKind::MalformedToken)?;

        let key = match self.keys.find(&kid, &header.alg).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(kid = %kid, "no signing key for token");
                return Err(AuthErrorKind::UnknownKey.into());
            }
            Err(err) => {
                warn!(kid = %kid, error = %err, "signing keys unavailable");
                return Err(AuthErrorKind::KeySetFetchFailure.into());
            }
        };

        let data = jsonwebtoken::decode::<serde_json::Value>(
            token.as_str(),
            key.decoding_key(),
            &self.validation,
        )
        .map_err(|err| {
            debug!(kid = %kid, error = %err, "token signature rejected");
            AuthError::new(AuthErrorKind::MalformedToken)
        })?;

        Ok(VerifiedPayload(data.claims))
    }
}

/// Split a compact token and decode its (unverified) header.
fn parse_header(token: &str) -> Result<TokenHeader, AuthError> {
    let malformed = || AuthError::new(AuthErrorKind::MalformedToken);

    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(malformed());
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(malformed());
    }

    let bytes = URL_SAFE_NO_PAD.decode(header).map_err(|_| malformed())?;
    serde_json::from_slice(&bytes).map_err(|_| malformed())
}
