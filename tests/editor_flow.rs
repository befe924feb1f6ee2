use axum::http::StatusCode;
use axum_test::TestServer;
use cipherstudio::models::project::files_to_wire;
use cipherstudio::{
    create_app, AppState, Config, Database, Edit, LocalCache, ProjectStore, Session, Workspace,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn test_config(temp: &TempDir) -> Config {
    Config {
        port: 0,
        db_path: temp.path().join("db").to_str().unwrap().to_string(),
        max_body_size: 10_000_000,
        jwt_secret: "editor-flow-secret".to_string(),
        token_ttl_secs: 3600,
        bcrypt_cost: 4,
    }
}

fn edited_workspace(session: &Session) -> Workspace {
    let mut workspace = Workspace::default();
    workspace
        .apply(
            Edit::Add {
                name: "components/Header".to_string(),
            },
            session,
        )
        .unwrap();
    workspace
        .apply(
            Edit::Write {
                path: "/components/Header.js".to_string(),
                content: "export default function Header(){ return <h1>Hi</h1> }".to_string(),
            },
            session,
        )
        .unwrap();
    workspace
        .apply(
            Edit::Add {
                name: "styles.css".to_string(),
            },
            session,
        )
        .unwrap();
    workspace
}

#[tokio::test]
async fn saved_workspace_renders_the_same_on_the_server() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    let db = Database::new(&config.db_path).unwrap();

    let session = Session::default();
    let mut workspace = edited_workspace(&session);
    assert!(workspace.is_dirty());
    workspace.save_to(&db).unwrap();
    assert!(!workspace.is_dirty());

    let server = TestServer::new(create_app(AppState::new(config, db), false)).unwrap();

    let rendered: Value = server.get("/api/projects/proj123/sandbox").await.json();
    assert_eq!(
        rendered,
        serde_json::to_value(workspace.sandbox_files(&session)).unwrap()
    );
    let entry = rendered["/App.js"].as_str().unwrap();
    assert!(entry.contains("import Header from \"./components/Header\";"));
    assert!(!entry.contains("styles"));

    let mut manual = session.clone();
    manual.auto_render = false;
    let raw: Value = server
        .get("/api/projects/proj123/sandbox")
        .add_query_param("autoRender", false)
        .await
        .json();
    assert_eq!(
        raw,
        serde_json::to_value(workspace.sandbox_files(&manual)).unwrap()
    );
}

#[tokio::test]
async fn cloud_copy_matches_local_cache_after_save() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    let db = Database::new(&config.db_path).unwrap();
    let server = TestServer::new(create_app(AppState::new(config, db), false)).unwrap();
    let cache = LocalCache::in_home(&temp.path().join("client"));

    let session = Session::default();
    let mut workspace = edited_workspace(&session);
    workspace.set_name("Landing page");
    workspace.save_to(&cache).unwrap();

    let response = server
        .put("/api/projects/proj123")
        .json(&json!({
            "name": workspace.name(),
            "files": files_to_wire(workspace.files()),
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let fetched: Value = server.get("/api/projects/proj123").await.json();
    assert_eq!(fetched["name"], "Landing page");
    let cloud: cipherstudio::models::project::Project = serde_json::from_value(fetched).unwrap();
    let cached = cache.load("proj123").unwrap().unwrap();
    assert_eq!(cloud.file_set().unwrap(), cached);
    assert_eq!(
        cloud.file_set().unwrap().paths().collect::<Vec<_>>(),
        workspace.files().paths().collect::<Vec<_>>()
    );
}
