//! Authorization failure taxonomy.
//!
//! Every stage of the gate reports failures as an `AuthError`. The kind decides
//! the client-visible outcome; the message is stable per kind so clients and
//! tests can match on it.
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    MissingHeader,
    MalformedHeader,
    InvalidAlgorithm,
    UnknownKey,
    MalformedToken,
    ExpiredToken,
    InvalidClaims,
    MissingPermissionClaim,
    PermissionDenied,
    KeySetFetchFailure,
}

impl AuthErrorKind {
    /// Machine-readable code, used in logs.
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::MalformedHeader => "invalid_header",
            Self::InvalidAlgorithm => "invalid_algorithm",
            Self::UnknownKey => "unknown_key",
            Self::MalformedToken => "invalid_token",
            Self::ExpiredToken => "token_expired",
            Self::InvalidClaims => "invalid_claims",
            Self::MissingPermissionClaim => "permission_claim_missing",
            Self::PermissionDenied => "permission_denied",
            Self::KeySetFetchFailure => "key_set_unavailable",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header is expected.",
            Self::MalformedHeader => "Authorization header must be of the form 'Bearer <token>'.",
            Self::InvalidAlgorithm => "Token is signed with an algorithm that is not accepted.",
            Self::UnknownKey => "Unable to find the appropriate key.",
            Self::MalformedToken => "Unable to parse or verify the authentication token.",
            Self::ExpiredToken => "Token expired.",
            Self::InvalidClaims => "Incorrect claims. Please, check the audience and issuer.",
            Self::MissingPermissionClaim => "Permissions not included in token.",
            Self::PermissionDenied => "Permission not found.",
            Self::KeySetFetchFailure => "Signing keys are temporarily unavailable. Try again later.",
        }
    }

    /// Transport status hint for the boundary that renders the rejection.
    pub fn status(self) -> StatusCode {
        match self {
            Self::MissingPermissionClaim | Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::KeySetFetchFailure => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Failures of the permission stage; the token itself was fine.
    pub fn is_authorization(self) -> bool {
        matches!(self, Self::MissingPermissionClaim | Self::PermissionDenied)
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: &'static str,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self {
            kind,
            message: kind.message(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl From<AuthErrorKind> for AuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AuthErrorKind; 10] = [
        AuthErrorKind::MissingHeader,
        AuthErrorKind::MalformedHeader,
        AuthErrorKind::InvalidAlgorithm,
        AuthErrorKind::UnknownKey,
        AuthErrorKind::MalformedToken,
        AuthErrorKind::ExpiredToken,
        AuthErrorKind::InvalidClaims,
        AuthErrorKind::MissingPermissionClaim,
        AuthErrorKind::PermissionDenied,
        AuthErrorKind::KeySetFetchFailure,
    ];

    #[test]
    fn authentication_kinds_map_to_unauthorized() {
        for kind in ALL.iter().copied().filter(|k| {
            !k.is_authorization() && *k != AuthErrorKind::KeySetFetchFailure
        }) {
            assert_eq!(kind.status(), StatusCode::UNAUTHORIZED, "{kind}");
        }
    }

    #[test]
    fn permission_kinds_map_to_forbidden() {
        assert_eq!(
            AuthErrorKind::MissingPermissionClaim.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthErrorKind::PermissionDenied.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn messages_and_codes_distinguish_every_kind() {
        let messages: std::collections::HashSet<_> = ALL.iter().map(|k| k.message()).collect();
        let codes: std::collections::HashSet<_> = ALL.iter().map(|k| k.code()).collect();
        assert_eq!(messages.len(), ALL.len());
        assert_eq!(codes.len(), ALL.len());
    }
}
