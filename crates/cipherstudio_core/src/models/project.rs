//! Project data models and their conversions to and from [`FileSet`].

use crate::constants::DEFAULT_PROJECT_NAME;
use crate::files::{FileSet, FileSetError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One file as carried on the wire and in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    pub content: String,
}

/// Saved project stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub files: Vec<ProjectFile>,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for `GET /api/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: String,
    pub name: String,
    pub file_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub project_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
}

/// Request payload for replacing a project's name and files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
}

/// Query parameters for the sandbox view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxQuery {
    pub auto_render: Option<bool>,
}

/// Convert a file set into wire order.
pub fn files_to_wire(files: &FileSet) -> Vec<ProjectFile> {
    files
        .iter()
        .map(|(path, content)| ProjectFile {
            name: path.to_string(),
            content: content.to_string(),
        })
        .collect()
}

/// Normalize incoming wire files into a [`FileSet`].
///
/// # Errors
/// Returns [`FileSetError`] when a name is blank or two names collide.
pub fn files_from_wire(files: &[ProjectFile]) -> Result<FileSet, FileSetError> {
    FileSet::from_entries(
        files
            .iter()
            .map(|file| (file.name.as_str(), file.content.clone())),
    )
}

/// Blank or missing names fall back to the default project name.
pub fn project_name_or_default(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_PROJECT_NAME.to_string(),
    }
}

impl Project {
    /// Create a new project from a normalized file set.
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        files: &FileSet,
        owner_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id: project_id.into(),
            name: name.into(),
            files: files_to_wire(files),
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild the file set, preserving stored order.
    ///
    /// # Errors
    /// Returns [`FileSetError`] when stored names no longer normalize cleanly.
    pub fn file_set(&self) -> Result<FileSet, FileSetError> {
        files_from_wire(&self.files)
    }

    /// Replace name and files, bumping `updated_at`.
    pub fn replace_contents(&mut self, name: impl Into<String>, files: &FileSet) {
        self.name = name.into();
        self.files = files_to_wire(files);
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            project_id: self.project_id.clone(),
            name: self.name.clone(),
            file_count: self.files.len(),
            updated_at: self.updated_at,
        }
    }
}
