#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use inkwell_api::auth::jwt::JwtConfig;
use inkwell_api::config::ServerConfig;
use inkwell_api::router::build_app_router;
use inkwell_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        graphql_depth_limit: 12,
        graphql_complexity_limit: 500,
        loader_delay_ms: 1,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiry_hours: 1,
            cookie_secure: false,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST a GraphQL operation with extra request headers.
pub async fn post_graphql(
    app: &Router,
    query: &str,
    variables: Value,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::post("/graphql").header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = json!({ "query": query, "variables": variables }).to_string();
    let request = builder.body(Body::from(body)).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Run a GraphQL operation, optionally as the holder of `token`, and return
/// the response body.
pub async fn graphql(app: &Router, token: Option<&str>, query: &str, variables: Value) -> Value {
    let bearer = token.map(|t| format!("Bearer {t}"));
    let headers: Vec<(&str, &str)> = bearer
        .as_deref()
        .map(|b| vec![("authorization", b)])
        .unwrap_or_default();
    body_json(post_graphql(app, query, variables, &headers).await).await
}

/// The `extensions.code` of the first GraphQL error.
pub fn error_code(body: &Value) -> &str {
    body["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_else(|| panic!("expected a GraphQL error, got {body}"))
}

/// Register an author and sign in, returning the token.
pub async fn sign_up(app: &Router, name: &str, username: &str, password: &str) -> String {
    let created = graphql(
        app,
        None,
        "mutation($input: CreateAuthorInput!) { createAuthor(input: $input) { id } }",
        json!({ "input": { "name": name, "username": username, "password": password } }),
    )
    .await;
    assert!(created["errors"].is_null(), "createAuthor failed: {created}");

    sign_in(app, username, password).await
}

pub async fn sign_in(app: &Router, username: &str, password: &str) -> String {
    let body = graphql(
        app,
        None,
        "mutation($u: String!, $p: String!) { authenticate(username: $u, password: $p) }",
        json!({ "u": username, "p": password }),
    )
    .await;
    body["data"]["authenticate"]
        .as_str()
        .unwrap_or_else(|| panic!("authenticate failed: {body}"))
        .to_string()
}

/// Create a blog post as the holder of `token`, returning its id.
pub async fn create_post(app: &Router, token: &str, input: Value) -> String {
    let body = graphql(
        app,
        Some(token),
        "mutation($input: CreateBlogPostInput!) { create_blog_post(input: $input) { id } }",
        json!({ "input": input }),
    )
    .await;
    body["data"]["create_blog_post"]["id"]
        .as_str()
        .unwrap_or_else(|| panic!("create_blog_post failed: {body}"))
        .to_string()
}
