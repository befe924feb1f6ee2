//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use cipherstudio_server::{create_app, AppState, Config, Database};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

/// Lowest cost bcrypt accepts; keeps registration fast in tests.
pub(crate) const TEST_BCRYPT_COST: u32 = 4;

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_body_size: 10_000_000,
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl_secs: 3600,
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let state = AppState::new(config, db);
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let config = test_config_for_db_path(&db_path);
    let server = test_server_for_config(config);
    (server, temp_dir)
}

/// Register `username` and return the issued bearer token.
pub(crate) async fn register(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["token"].as_str().expect("token").to_string()
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
