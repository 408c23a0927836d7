//! Per-endpoint permission requirement.
use super::claims::DecodedClaims;
use super::error::{AuthError, AuthErrorKind};

/// Permission a protected operation demands, e.g. `"post:actors"`.
///
/// The empty requirement means "any authenticated caller".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PermissionRequirement(String);

impl PermissionRequirement {
    pub fn new(permission: impl Into<String>) -> Self {
        Self(permission.into())
    }

    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_authentication_only(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for PermissionRequirement {
    fn from(permission: &str) -> Self {
        Self::new(permission)
    }
}

/// Pass the claims through if they satisfy `required`.
pub fn check(
    claims: DecodedClaims,
    required: &PermissionRequirement,
) -> Result<DecodedClaims, AuthError> {
    if required.is_authentication_only() {
        return Ok(claims);
    }

    let Some(permissions) = claims.permissions.as_deref() else {
        return Err(AuthErrorKind::MissingPermissionClaim.into());
    };

    if !permissions.iter().any(|p| p == required.as_str()) {
        return Err(AuthErrorKind::PermissionDenied.into());
    }

    Ok(claims)
}
