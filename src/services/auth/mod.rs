pub mod bearer;
pub mod claims;
pub mod error;
pub mod factory;
pub mod gate;
pub mod jwks;
pub mod permission;
pub mod signature;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::DecodedClaims;
pub use error::{AuthError, AuthErrorKind};
pub use factory::build_authorization_gate;
pub use gate::AuthorizationGate;
pub use permission::PermissionRequirement;
