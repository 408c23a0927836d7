//! Fixtures shared by the auth unit tests.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use super::jwks::{KeySet, KeySetError, KeySetResolver, KeySource};

pub const ISSUER: &str = "https://casting.test.auth0.com/";
pub const AUDIENCE: &str = "casting-agency";
pub const KID: &str = "test-key-1";

const SIGNING_KEY_PEM: &str = include_str!("../../../tests/fixtures/signing_key.pem");
const ROGUE_KEY_PEM: &str = include_str!("../../../tests/fixtures/rogue_key.pem");
const JWKS: &str = include_str!("../../../tests/fixtures/jwks.json");

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A complete claim set that passes validation.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "aud": [AUDIENCE, "https://casting.test.auth0.com/userinfo"],
        "sub": "auth0|5f0c1d2e3a4b",
        "iat": now() - 10,
        "exp": now() + 3600,
        "azp": "client-id",
        "scope": "openid profile email",
        "permissions": permissions,
    })
}

pub fn sign_with(pem: &str, alg: Algorithm, kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(alg);
    header.typ = Some("JWT".to_string());
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

pub fn sign(claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, Algorithm::RS256, Some(KID), claims)
}

pub fn sign_with_rogue_key(claims: &Value) -> String {
    sign_with(ROGUE_KEY_PEM, Algorithm::RS256, Some(KID), claims)
}

pub fn key_set() -> KeySet {
    KeySet::from_document(JWKS.as_bytes()).unwrap()
}

pub struct FixedSource(pub Result<KeySet, KeySetError>);

#[async_trait]
impl KeySource for FixedSource {
    async fn fetch(&self) -> Result<KeySet, KeySetError> {
        self.0.clone()
    }
}

pub fn resolver_with(result: Result<KeySet, KeySetError>) -> Arc<KeySetResolver> {
    Arc::new(KeySetResolver::new(
        Arc::new(FixedSource(result)),
        Duration::from_secs(60),
        Duration::from_secs(1),
    ))
}

pub fn resolver() -> Arc<KeySetResolver> {
    resolver_with(Ok(key_set()))
}
