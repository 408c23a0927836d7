//! Registered-claim validation (exp, iss, aud, sub) on a verified payload.
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::{AuthError, AuthErrorKind};
use super::signature::VerifiedPayload;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(aud) => vec![aud],
            Self::Many(auds) => auds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegisteredClaims {
    iss: String,
    aud: Audience,
    // NumericDate; may carry a fractional part
    exp: f64,
    sub: String,
    #[serde(default)]
    permissions: Option<Vec<String>>,
}

/// Claims of a token that passed signature and claim validation.
///
/// `raw` is the complete payload as issued, for handlers that echo it back.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClaims {
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: i64,
    pub subject: String,
    /// `None` when the token carries no `permissions` claim at all.
    pub permissions: Option<Vec<String>>,
    raw: serde_json::Map<String, serde_json::Value>,
}

impl DecodedClaims {
    pub fn raw(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.raw
    }

    pub fn into_raw(self) -> serde_json::Map<String, serde_json::Value> {
        self.raw
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|perms| perms.iter().any(|p| p == permission))
    }
}

#[derive(Debug, Clone)]
pub struct ClaimValidator {
    issuer: String,
    audience: String,
    leeway_seconds: u64,
}

impl ClaimValidator {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>, leeway_seconds: u64) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_seconds,
        }
    }

    /// Validate in order: shape, expiry, issuer, audience.
    ///
    /// Expiry wins over the identity checks so an expired token is always
    /// reported as such.
    pub fn validate(
        &self,
        payload: VerifiedPayload,
        now: DateTime<Utc>,
    ) -> Result<DecodedClaims, AuthError> {
        let serde_json::Value::Object(raw) = payload.into_inner() else {
            return Err(AuthErrorKind::InvalidClaims.into());
        };

        let claims: RegisteredClaims =
            serde_json::from_value(serde_json::Value::Object(raw.clone()))
                .map_err(|_| AuthError::new(AuthErrorKind::InvalidClaims))?;

        let now_seconds = now.timestamp_micros() as f64 / 1_000_000.0;
        if claims.exp + (self.leeway_seconds as f64) < now_seconds {
            return Err(AuthErrorKind::ExpiredToken.into());
        }

        if claims.iss != self.issuer {
            return Err(AuthErrorKind::InvalidClaims.into());
        }

        let audience = claims.aud.into_vec();
        if !audience.iter().any(|aud| *aud == self.audience) {
            return Err(AuthErrorKind::InvalidClaims.into());
        }

        Ok(DecodedClaims {
            issuer: claims.iss,
            audience,
            expires_at: claims.exp.floor() as i64,
            subject: claims.sub,
            permissions: claims.permissions,
            raw,
        })
    }
}
