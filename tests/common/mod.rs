#![allow(dead_code)]
//! Shared helpers for the integration tests: a mock identity provider
//! serving the fixture key set, and tokens signed with the fixture keys.
use std::collections::HashMap;

use casting_api::config::Config;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUER: &str = "https://casting.test.auth0.com/";
pub const AUDIENCE: &str = "casting-agency";
pub const KID: &str = "test-key-1";
pub const ROGUE_KID: &str = "rogue-key";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
pub const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const ROGUE_JWKS: &str = include_str!("../fixtures/rogue_jwks.json");

pub fn jwks_response(document: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(document.as_bytes().to_vec(), "application/json")
}

/// Mock provider that serves `JWKS` and expects exactly `fetches` requests.
pub async fn identity_provider(fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(jwks_response(JWKS))
        .expect(fetches)
        .mount(&server)
        .await;
    server
}

pub fn config_for(server: &MockServer) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("AUTH_DOMAIN", "casting.test.auth0.com".to_string()),
        ("AUTH_AUDIENCE", AUDIENCE.to_string()),
        ("AUTH_ISSUER", ISSUER.to_string()),
        ("AUTH_JWKS_URL", format!("{}{}", server.uri(), JWKS_PATH)),
        ("AUTH_JWKS_ALLOW_HTTP", "true".to_string()),
        ("AUTH_JWKS_FETCH_TIMEOUT_SECONDS", "2".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "aud": [AUDIENCE, "https://casting.test.auth0.com/userinfo"],
        "sub": "auth0|5f0c1d2e3a4b",
        "iat": now() - 10,
        "exp": now() + 3600,
        "scope": "openid profile email",
        "permissions": permissions,
    })
}

pub fn sign_with(pem: &str, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

pub fn sign(claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, KID, claims)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
