//! Model-level unit tests.

use super::project::*;
use super::user::*;
use crate::constants::DEFAULT_PROJECT_NAME;
use crate::files::{FileSet, FileSetError};

#[test]
fn project_wire_shape_is_camel_case_and_ordered() {
    let files = FileSet::from_entries([("/App.js", "app"), ("/ui/Card.js", "card")])
        .expect("files");
    let project = Project::new("proj123", "Demo", &files, None);

    let json = serde_json::to_value(&project).expect("encode");
    assert_eq!(json["projectId"], "proj123");
    assert_eq!(json["files"][0]["name"], "/App.js");
    assert_eq!(json["files"][1]["name"], "/ui/Card.js");
    assert!(json.get("createdAt").is_some());
    assert!(json["ownerId"].is_null());

    let restored = project.file_set().expect("file set");
    assert_eq!(
        restored.paths().collect::<Vec<_>>(),
        vec!["/App.js", "/ui/Card.js"]
    );
}

#[test]
fn project_bincode_row_roundtrip() {
    let files = FileSet::with_default_entry();
    let project = Project::new("p1", "Row", &files, Some("owner".to_string()));
    let encoded = bincode::serialize(&project).expect("encode");
    let decoded: Project = bincode::deserialize(&encoded).expect("decode");
    assert_eq!(decoded.project_id, "p1");
    assert_eq!(decoded.owner_id.as_deref(), Some("owner"));
    assert_eq!(decoded.files, project.files);
}

#[test]
fn files_from_wire_normalizes_names_and_rejects_collisions() {
    let wire = vec![
        ProjectFile {
            name: "App.js".to_string(),
            content: "a".to_string(),
        },
        ProjectFile {
            name: "/App.js".to_string(),
            content: "b".to_string(),
        },
    ];
    assert_eq!(
        files_from_wire(&wire),
        Err(FileSetError::DuplicatePath("/App.js".to_string()))
    );
    let files = files_from_wire(&wire[..1]).expect("single file");
    assert!(files.contains("/App.js"));
}

#[test]
fn replace_contents_bumps_updated_at_and_summary_counts_files() {
    let mut project = Project::new("p1", "Old", &FileSet::with_default_entry(), None);
    let created = project.created_at;
    let files = FileSet::from_entries([("/App.js", "a"), ("/B.js", "b")]).expect("files");
    project.replace_contents("New", &files);

    assert_eq!(project.created_at, created);
    assert!(project.updated_at >= created);
    let summary = project.summary();
    assert_eq!(summary.name, "New");
    assert_eq!(summary.file_count, 2);
}

#[test]
fn create_request_defaults_missing_fields() {
    let request: CreateProjectRequest = serde_json::from_str(r#"{"projectId":"x"}"#)
        .expect("decode");
    assert_eq!(request.project_id, "x");
    assert!(request.name.is_none());
    assert!(request.files.is_empty());
    assert_eq!(project_name_or_default(Some("  ")), DEFAULT_PROJECT_NAME);
    assert_eq!(project_name_or_default(Some(" Demo ")), "Demo");
}

#[test]
fn public_user_drops_password_hash() {
    let user = User::new(
        "ada".to_string(),
        "ada@example.com".to_string(),
        "hash".to_string(),
    );
    let json = serde_json::to_value(user.public()).expect("encode");
    assert_eq!(json["username"], "ada");
    assert!(json.get("password_hash").is_none());
    assert!(!user.id.is_empty());
}
