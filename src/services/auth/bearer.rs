//! `Authorization: Bearer <token>` extraction.
//!
//! Only the header shape is checked here. Whether the token itself is a
//! well-formed compact JWT is decided by the signature stage.
use axum::http::{HeaderMap, header};

use super::error::{AuthError, AuthErrorKind};

/// Raw bearer credential, exactly as presented by the client.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials stay out of logs.
        f.write_str("BearerToken(..)")
    }
}

/// Pull the bearer token out of an `Authorization` header value.
pub fn extract(header_value: Option<&str>) -> Result<BearerToken, AuthError> {
    let value = header_value.ok_or(AuthErrorKind::MissingHeader)?;

    let mut parts = value.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthErrorKind::MalformedHeader.into());
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthErrorKind::MalformedHeader.into());
    }

    Ok(BearerToken(token.to_string()))
}

/// Same as [`extract`], reading the header from a request.
///
/// A header value that is not visible ASCII counts as malformed, not missing.
pub fn from_headers(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
    match headers.get(header::AUTHORIZATION) {
        None => extract(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AuthError::new(AuthErrorKind::MalformedHeader))?;
            extract(Some(value))
        }
    }
}
