//! End-to-end requests through the router, with the key set served by a mock provider.
mod common;

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use casting_api::api::v1::extractors::{Authorized, auth_ctx::PostActors};
use casting_api::app::{build_router, build_state};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;

async fn create_actor(auth: Authorized<PostActors>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "created_by": auth.claims.subject})),
    )
}

async fn app(fetches: u64) -> (Router, wiremock::MockServer) {
    let server = identity_provider(fetches).await;
    let config = config_for(&server);
    let state = build_state(&config).unwrap();

    let actors = Router::new()
        .route("/api/v1/actors", post(create_actor))
        .with_state(state.clone());
    (build_router(state, &config).merge(actors), server)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn welcome_route_is_public() {
    let (app, _server) = app(0).await;
    let (status, body) = send(app, get("/", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Welcome to the casting agency API!"})
    );
}

#[tokio::test]
async fn health_route_is_public() {
    let (app, _server) = app(0).await;
    let (status, body) = send(app, get("/api/v1/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn introspection_returns_the_verified_payload() {
    let (app, _server) = app(1).await;
    let payload = claims(&["get:movies"]);
    let header = bearer(&sign(&payload));

    let (status, body) = send(app, get("/api/v1/auth", Some(&header))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "payload": payload}));
}

#[tokio::test]
async fn unversioned_introspection_path_is_an_alias() {
    let (app, _server) = app(1).await;
    let payload = claims(&[]);
    let header = bearer(&sign(&payload));

    let (status, body) = send(app, get("/auth", Some(&header))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "payload": payload}));
}

#[tokio::test]
async fn introspection_without_header_is_unauthorized() {
    let (app, _server) = app(0).await;
    let (status, body) = send(app, get("/api/v1/auth", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": 401,
            "message": "Authorization header is expected.",
        })
    );
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let (app, _server) = app(1).await;
    let mut payload = claims(&[]);
    payload["exp"] = json!(now() - 60);
    let header = bearer(&sign(&payload));

    let (status, body) = send(app, get("/api/v1/auth", Some(&header))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired.");
}

#[tokio::test]
async fn wrong_audience_is_unauthorized() {
    let (app, _server) = app(1).await;
    let mut payload = claims(&[]);
    payload["aud"] = json!("some-other-api");
    let header = bearer(&sign(&payload));

    let (status, body) = send(app, get("/api/v1/auth", Some(&header))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Incorrect claims. Please, check the audience and issuer."
    );
}

#[tokio::test]
async fn protected_route_runs_with_granted_permission() {
    let (app, _server) = app(1).await;
    let header = bearer(&sign(&claims(&["get:actors", "post:actors"])));
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/actors")
        .header(header::AUTHORIZATION, header)
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created_by"], "auth0|5f0c1d2e3a4b");
}

#[tokio::test]
async fn protected_route_without_permission_is_forbidden() {
    let (app, _server) = app(1).await;
    let header = bearer(&sign(&claims(&["get:actors"])));
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/actors")
        .header(header::AUTHORIZATION, header)
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({"success": false, "error": 403, "message": "Permission not found."})
    );
}

#[tokio::test]
async fn unknown_route_is_a_json_not_found() {
    let (app, _server) = app(0).await;
    let (status, body) = send(app, get("/api/v1/nowhere", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 404);
}

#[tokio::test]
async fn wrong_method_is_a_json_method_not_allowed() {
    let (app, _server) = app(0).await;
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], 405);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _server) = app(0).await;
    let response = app.oneshot(get("/api/v1/health", None)).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
