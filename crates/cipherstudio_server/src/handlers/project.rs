//! Project HTTP handlers.

use super::auth::{authenticate, optional_user};
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cipherstudio_core::files::sandbox_view;
use cipherstudio_core::models::project::*;
use indexmap::IndexMap;
use serde_json::json;

const PROJECT_NOT_FOUND: &str = "Project not found";

fn load_project(state: &AppState, project_id: &str) -> Result<Project, HttpError> {
    state
        .db
        .projects
        .get(project_id)?
        .ok_or_else(|| HttpError::not_found(PROJECT_NOT_FOUND))
}

/// Save a new project.
///
/// The caller becomes the owner when a valid bearer token is sent.
///
/// # Returns
/// `201 {"message": "Project saved", "project": ...}`.
///
/// # Errors
/// `400` when the id is empty or taken, or when file names are invalid.
pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Response, HttpError> {
    let project_id = req.project_id.trim();
    if project_id.is_empty() {
        return Err(HttpError::bad_request("projectId is required"));
    }
    let files = files_from_wire(&req.files)?;
    let owner = optional_user(&state, &headers)?;

    let project = Project::new(
        project_id,
        project_name_or_default(req.name.as_deref()),
        &files,
        owner.map(|user| user.id),
    );
    state.db.projects.create(&project)?;
    tracing::info!(
        "Saved project {} ({} files)",
        project.project_id,
        project.files.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Project saved", "project": project })),
    )
        .into_response())
}

/// Fetch a project by id.
///
/// # Errors
/// `404 Project not found` when missing.
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, HttpError> {
    Ok(Json(load_project(&state, &project_id)?))
}

/// Replace a project's name and files, creating it when missing.
///
/// # Returns
/// `{"message": "Project updated", "project": ...}`.
///
/// # Errors
/// `400` when file names are invalid.
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let files = files_from_wire(&req.files)?;
    let owner = optional_user(&state, &headers)?;
    let project = state.db.projects.upsert(
        &project_id,
        &project_name_or_default(req.name.as_deref()),
        &files,
        owner.as_ref().map(|user| user.id.as_str()),
    )?;
    Ok(Json(
        json!({ "message": "Project updated", "project": project }),
    ))
}

/// List the caller's projects, most recently updated first.
///
/// # Errors
/// `401 Unauthorized` without a valid bearer token.
pub async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProjectSummary>>, HttpError> {
    let user = authenticate(&state, &headers)?;
    Ok(Json(state.db.projects.list_by_owner(&user.id)?))
}

/// Combined sandbox mapping: the project's files plus the generated entry.
///
/// `autoRender` defaults to `true`.
///
/// # Errors
/// `404 Project not found` when missing.
pub async fn sandbox_files(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<SandboxQuery>,
) -> Result<Json<IndexMap<String, String>>, HttpError> {
    let project = load_project(&state, &project_id)?;
    let files = project.file_set()?;
    Ok(Json(sandbox_view(&files, query.auto_render.unwrap_or(true))))
}
