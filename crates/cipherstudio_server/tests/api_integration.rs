//! Integration tests for the CipherStudio HTTP API.

mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};
use support::{bearer, register, setup_test_server};

#[tokio::test]
async fn root_serves_banner() {
    let (server, _temp) = setup_test_server();
    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "CipherStudio Backend Running...");
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
}

#[tokio::test]
async fn test_project_lifecycle() {
    let (server, _temp) = setup_test_server();

    let create_response = server
        .post("/api/projects")
        .json(&json!({
            "projectId": "proj123",
            "name": "Demo",
            "files": [
                { "name": "/App.js", "content": "export default function App(){}" },
                { "name": "components/Header.js", "content": "export default function Header(){ return <h1/> }" }
            ]
        }))
        .await;
    assert_eq!(create_response.status_code(), StatusCode::CREATED);
    let created: Value = create_response.json();
    assert_eq!(created["message"], "Project saved");
    assert_eq!(created["project"]["projectId"], "proj123");
    assert_eq!(created["project"]["files"][1]["name"], "/components/Header.js");
    assert!(created["project"]["ownerId"].is_null());

    let get_response = server.get("/api/projects/proj123").await;
    assert_eq!(get_response.status_code(), StatusCode::OK);
    let fetched: Value = get_response.json();
    assert_eq!(fetched["name"], "Demo");
    assert_eq!(fetched["files"].as_array().map(Vec::len), Some(2));

    let update_response = server
        .put("/api/projects/proj123")
        .json(&json!({
            "name": "Renamed",
            "files": [{ "name": "/App.js", "content": "updated" }]
        }))
        .await;
    assert_eq!(update_response.status_code(), StatusCode::OK);
    let updated: Value = update_response.json();
    assert_eq!(updated["message"], "Project updated");
    assert_eq!(updated["project"]["name"], "Renamed");
    assert_eq!(updated["project"]["files"][0]["content"], "updated");
    assert_eq!(updated["project"]["createdAt"], fetched["createdAt"]);
}

#[tokio::test]
async fn create_project_rejects_duplicates_and_bad_input() {
    let (server, _temp) = setup_test_server();
    let body = json!({ "projectId": "dup", "name": "A", "files": [] });

    let first = server.post("/api/projects").json(&body).await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = server.post("/api/projects").json(&body).await;
    assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = second.json();
    assert_eq!(error["message"], "ProjectId already exists");

    let missing_id = server
        .post("/api/projects")
        .json(&json!({ "projectId": "  ", "files": [] }))
        .await;
    assert_eq!(missing_id.status_code(), StatusCode::BAD_REQUEST);

    let colliding = server
        .post("/api/projects")
        .json(&json!({
            "projectId": "collide",
            "files": [
                { "name": "App.js", "content": "a" },
                { "name": "/App.js", "content": "b" }
            ]
        }))
        .await;
    assert_eq!(colliding.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = colliding.json();
    assert_eq!(error["message"], "/App.js already exists");
}

#[tokio::test]
async fn missing_project_returns_not_found_message() {
    let (server, _temp) = setup_test_server();
    for path in ["/api/projects/nope", "/api/projects/nope/sandbox"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "path: {path}");
        let error: Value = response.json();
        assert_eq!(error["message"], "Project not found");
    }
}

#[tokio::test]
async fn put_creates_missing_project_with_default_name() {
    let (server, _temp) = setup_test_server();
    let response = server
        .put("/api/projects/fresh")
        .json(&json!({ "files": [{ "name": "/App.js", "content": "x" }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["project"]["name"], "My CipherStudio Project");

    let fetched = server.get("/api/projects/fresh").await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn sandbox_view_synthesizes_entry_unless_disabled() {
    let (server, _temp) = setup_test_server();
    server
        .post("/api/projects")
        .json(&json!({
            "projectId": "sandbox",
            "files": [
                { "name": "/App.js", "content": "hand written" },
                { "name": "/Card.js", "content": "export default function Card(){ return <div/> }" },
                { "name": "/util.js", "content": "export const x = 1;" }
            ]
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let rendered: Value = server.get("/api/projects/sandbox/sandbox").await.json();
    let entry = rendered["/App.js"].as_str().expect("entry");
    assert!(entry.starts_with("import Card from \"./Card\";"));
    assert!(entry.contains("      <Card />"));
    assert!(!entry.contains("Util"));
    assert_eq!(rendered["/Card.js"], "export default function Card(){ return <div/> }");

    let raw: Value = server
        .get("/api/projects/sandbox/sandbox")
        .add_query_param("autoRender", false)
        .await
        .json();
    assert_eq!(raw["/App.js"], "hand written");
}

#[tokio::test]
async fn test_auth_lifecycle() {
    let (server, _temp) = setup_test_server();
    let token = register(&server, "ada").await;

    let me = server
        .get("/api/auth/me")
        .add_header("authorization", bearer(&token))
        .await;
    assert_eq!(me.status_code(), StatusCode::OK);
    let body: Value = me.json();
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let by_username = server
        .post("/api/auth/login")
        .json(&json!({ "username": "ada", "password": "correct horse" }))
        .await;
    assert_eq!(by_username.status_code(), StatusCode::OK);

    let by_email = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ADA@example.com", "password": "correct horse" }))
        .await;
    assert_eq!(by_email.status_code(), StatusCode::OK);
    let login: Value = by_email.json();
    assert!(login["token"].as_str().is_some_and(|token| !token.is_empty()));
}

#[tokio::test]
async fn register_and_login_report_client_errors() {
    let (server, _temp) = setup_test_server();
    register(&server, "ada").await;

    let cases = [
        (
            "/api/auth/register",
            json!({ "username": "bob", "email": "" , "password": "pw" }),
            "Missing fields",
        ),
        (
            "/api/auth/register",
            json!({ "username": "ada", "email": "new@example.com", "password": "pw" }),
            "User already exists",
        ),
        (
            "/api/auth/register",
            json!({ "username": "new", "email": "Ada@Example.com", "password": "pw" }),
            "User already exists",
        ),
        (
            "/api/auth/login",
            json!({ "password": "correct horse" }),
            "Missing credentials",
        ),
        (
            "/api/auth/login",
            json!({ "username": "ada" }),
            "Missing credentials",
        ),
        (
            "/api/auth/login",
            json!({ "username": "ada", "password": "wrong" }),
            "Invalid credentials",
        ),
        (
            "/api/auth/login",
            json!({ "username": "ghost", "password": "correct horse" }),
            "Invalid credentials",
        ),
    ];

    for (path, body, message) in cases {
        let response = server.post(path).json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{path} {body}");
        let error: Value = response.json();
        assert_eq!(error["message"], message, "{path} {body}");
    }
}

#[tokio::test]
async fn me_and_listing_require_valid_bearer() {
    let (server, _temp) = setup_test_server();
    for header in [None, Some("Bearer not-a-token"), Some("Basic abc")] {
        for path in ["/api/auth/me", "/api/projects"] {
            let mut request = server.get(path);
            if let Some(value) = header {
                request = request.add_header("authorization", value);
            }
            let response = request.await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{path} {header:?}");
            let error: Value = response.json();
            assert_eq!(error["message"], "Unauthorized");
        }
    }
}

#[tokio::test]
async fn listing_shows_only_callers_projects() {
    let (server, _temp) = setup_test_server();
    let ada = register(&server, "ada").await;
    let bob = register(&server, "bob").await;

    for (token, id) in [(&ada, "ada-1"), (&ada, "ada-2"), (&bob, "bob-1")] {
        server
            .post("/api/projects")
            .add_header("authorization", bearer(token))
            .json(&json!({ "projectId": id, "files": [{ "name": "/App.js", "content": "x" }] }))
            .await
            .assert_status(StatusCode::CREATED);
    }
    server
        .post("/api/projects")
        .add_header("authorization", "Bearer stale")
        .json(&json!({ "projectId": "anon", "files": [] }))
        .await
        .assert_status(StatusCode::CREATED);

    let listed: Value = server
        .get("/api/projects")
        .add_header("authorization", bearer(&ada))
        .await
        .json();
    let mut ids: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|summary| summary["projectId"].as_str())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["ada-1", "ada-2"]);
    assert_eq!(listed[0]["fileCount"], 1);
}

#[tokio::test]
async fn test_strict_cors_allows_loopback_origins_only() {
    let (server, _temp) = setup_test_server();

    for origin in ["http://localhost:3000", "http://[::1]:5173"] {
        let response = server.get("/").add_header("origin", origin).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.assert_header("access-control-allow-origin", origin);
    }

    let foreign = server
        .get("/")
        .add_header("origin", "http://example.com:3000")
        .await;
    assert_eq!(foreign.status_code(), StatusCode::OK);
    assert!(!foreign.contains_header("access-control-allow-origin"));
}
