//! Integration tests for registration, sign-in, profile updates and the
//! identity carried by the `Authorization` header and session cookies.

mod common;

use axum::http::StatusCode;
use common::{body_json, error_code, graphql, post_graphql, sign_in, sign_up};
use serde_json::json;
use sqlx::PgPool;

const WHOAMI_QUERY: &str = "{ journal_entries { total } }";

const CREATE_AUTHOR: &str =
    "mutation($input: CreateAuthorInput!) { createAuthor(input: $input) { id name username } }";

// ---------------------------------------------------------------------------
// Test: createAuthor stores a lower-cased username
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_author_returns_the_author(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = graphql(
        &app,
        None,
        CREATE_AUTHOR,
        json!({ "input": { "name": "Alice", "username": "Alice", "password": "secret123" } }),
    )
    .await;

    assert!(body["errors"].is_null(), "{body}");
    let author = &body["data"]["createAuthor"];
    assert_eq!(author["name"], "Alice");
    assert_eq!(author["username"], "alice");
    assert!(author["id"].is_string());
}

// ---------------------------------------------------------------------------
// Test: duplicate usernames are a CONFLICT, regardless of case
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);
    sign_up(&app, "Alice", "alice", "secret123").await;

    let body = graphql(
        &app,
        None,
        CREATE_AUTHOR,
        json!({ "input": { "name": "Other", "username": "ALICE", "password": "pw" } }),
    )
    .await;

    assert_eq!(error_code(&body), "CONFLICT");
    assert_eq!(body["errors"][0]["message"], "Username 'alice' is already taken");
}

// ---------------------------------------------------------------------------
// Test: blank registration fields are rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_registration_fields_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    for input in [
        json!({ "name": " ", "username": "a", "password": "p" }),
        json!({ "name": "A", "username": "", "password": "p" }),
        json!({ "name": "A", "username": "a", "password": "" }),
    ] {
        let body = graphql(&app, None, CREATE_AUTHOR, json!({ "input": input })).await;
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }
}

// ---------------------------------------------------------------------------
// Test: authenticate returns a token and sets the split session cookies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn authenticate_sets_session_cookies(pool: PgPool) {
    let app = common::build_test_app(pool);
    sign_up(&app, "Alice", "alice", "secret123").await;

    let response = post_graphql(
        &app,
        "mutation { authenticate(username: \"alice\", password: \"secret123\") }",
        json!({}),
        &[],
    )
    .await;

    let cookies: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let body = body_json(response).await;
    let token = body["data"]["authenticate"].as_str().unwrap();
    let (header_payload, signature) = token.rsplit_once('.').unwrap();

    assert_eq!(cookies.len(), 2, "{cookies:?}");
    let payload_cookie = cookies
        .iter()
        .find(|c| c.starts_with("jwt.header.payload="))
        .unwrap();
    let signature_cookie = cookies
        .iter()
        .find(|c| c.starts_with("jwt.signature="))
        .unwrap();

    assert!(payload_cookie.starts_with(&format!("jwt.header.payload={header_payload};")));
    assert!(payload_cookie.contains("SameSite=Strict"));
    assert!(!payload_cookie.contains("HttpOnly"));
    assert!(signature_cookie.starts_with(&format!("jwt.signature={signature};")));
    assert!(signature_cookie.contains("HttpOnly"));
}

// ---------------------------------------------------------------------------
// Test: wrong credentials are UNAUTHORIZED
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    sign_up(&app, "Alice", "alice", "secret123").await;

    for (username, password) in [("alice", "wrong"), ("nobody", "secret123")] {
        let body = graphql(
            &app,
            None,
            "mutation($u: String!, $p: String!) { authenticate(username: $u, password: $p) }",
            json!({ "u": username, "p": password }),
        )
        .await;
        assert_eq!(error_code(&body), "UNAUTHORIZED");
        assert_eq!(body["errors"][0]["message"], "Invalid username or password");
    }
}

// ---------------------------------------------------------------------------
// Test: header + signature cookie authenticates like the whole token
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn split_token_with_cookie_authenticates(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = sign_up(&app, "Alice", "alice", "secret123").await;
    let (header_payload, signature) = token.rsplit_once('.').unwrap();

    let bearer = format!("Bearer {header_payload}");
    let cookie = format!("theme=dark; jwt.signature={signature}");
    let response = post_graphql(
        &app,
        WHOAMI_QUERY,
        json!({}),
        &[("authorization", bearer.as_str()), ("cookie", cookie.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["errors"].is_null(), "{body}");
    assert_eq!(body["data"]["journal_entries"]["total"], 0);
}

// ---------------------------------------------------------------------------
// Test: unusable Authorization headers are rejected with HTTP 401
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_authorization_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = sign_up(&app, "Alice", "alice", "secret123").await;
    let (header_payload, _) = token.rsplit_once('.').unwrap();

    let tampered = format!("Bearer {header_payload}.AAAA");
    let no_cookie = format!("Bearer {header_payload}");
    for authorization in ["Token abc", "Bearer a.b.c.d", tampered.as_str(), no_cookie.as_str()] {
        let response = post_graphql(
            &app,
            WHOAMI_QUERY,
            json!({}),
            &[("authorization", authorization)],
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{authorization}");
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}

// ---------------------------------------------------------------------------
// Test: private queries need a signed-in author
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_requests_cannot_read_private_content(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = graphql(&app, None, WHOAMI_QUERY, json!({})).await;

    assert_eq!(error_code(&body), "UNAUTHORIZED");
    assert_eq!(body["errors"][0]["message"], "Must be authenticated.");
}

// ---------------------------------------------------------------------------
// Test: updateAuthor checks the current password and re-issues the token
// ---------------------------------------------------------------------------

const UPDATE_AUTHOR: &str =
    "mutation($input: UpdateAuthorInput!) { updateAuthor(input: $input) }";

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_author_requires_current_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = sign_up(&app, "Alice", "alice", "secret123").await;

    let body = graphql(
        &app,
        Some(token.as_str()),
        UPDATE_AUTHOR,
        json!({ "input": { "name": "Mallory", "password": "guess" } }),
    )
    .await;

    assert_eq!(error_code(&body), "UNAUTHORIZED");
    assert_eq!(body["errors"][0]["message"], "Incorrect password");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_author_changes_profile_and_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = sign_up(&app, "Alice", "alice", "secret123").await;

    let body = graphql(
        &app,
        Some(token.as_str()),
        UPDATE_AUTHOR,
        json!({ "input": {
            "name": "Alice Liddell",
            "username": "liddell",
            "password": "secret123",
            "new_password": "looking-glass",
        } }),
    )
    .await;
    assert!(body["errors"].is_null(), "{body}");
    assert!(body["data"]["updateAuthor"].is_string());

    // The old credentials are gone, the new ones work.
    let stale = graphql(
        &app,
        None,
        "mutation { authenticate(username: \"alice\", password: \"secret123\") }",
        json!({}),
    )
    .await;
    assert_eq!(error_code(&stale), "UNAUTHORIZED");
    sign_in(&app, "liddell", "looking-glass").await;

    let authors = graphql(&app, None, "{ authors { name username } }", json!({})).await;
    assert_eq!(
        authors["data"]["authors"],
        json!([{ "name": "Alice Liddell", "username": "liddell" }])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_author_rejects_taken_username(pool: PgPool) {
    let app = common::build_test_app(pool);
    sign_up(&app, "Bob", "bob", "hunter2").await;
    let token = sign_up(&app, "Alice", "alice", "secret123").await;

    let body = graphql(
        &app,
        Some(token.as_str()),
        UPDATE_AUTHOR,
        json!({ "input": { "username": "Bob", "password": "secret123" } }),
    )
    .await;

    assert_eq!(error_code(&body), "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_author_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = graphql(
        &app,
        None,
        UPDATE_AUTHOR,
        json!({ "input": { "name": "Nobody", "password": "x" } }),
    )
    .await;

    assert_eq!(error_code(&body), "UNAUTHORIZED");
}
