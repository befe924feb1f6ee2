//! Client-side project cache on the local filesystem.
//!
//! One JSON document per project under `<root>/<project-id>.json`, holding
//! `{ "projectId", "name", "files": { path: content } }`.

use crate::db::ProjectStore;
use crate::error::AppError;
use crate::files::FileSet;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedProject {
    project_id: String,
    #[serde(default)]
    name: Option<String>,
    files: FileSet,
}

/// Write `value` as pretty JSON, replacing `path` only after a full write.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, encoded)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a JSON document, treating a missing file as `None`.
pub(crate) fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Project cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache stored under `<home>/projects`.
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join("projects"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, project_id: &str) -> Result<PathBuf, AppError> {
        let id = project_id.trim();
        if id.is_empty()
            || id.starts_with('.')
            || id.contains(['/', '\\'])
            || id.chars().any(char::is_control)
        {
            return Err(AppError::BadRequest(format!(
                "Invalid project id '{}'",
                project_id
            )));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    /// Ids of every cached project, sorted.
    ///
    /// # Errors
    /// Returns an error when the cache directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>, AppError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Display name stored alongside a cached project.
    ///
    /// # Errors
    /// Returns an error for invalid ids or unreadable documents.
    pub fn name_of(&self, project_id: &str) -> Result<Option<String>, AppError> {
        let cached: Option<CachedProject> = read_json_if_exists(&self.path_for(project_id)?)?;
        Ok(cached.and_then(|cached| cached.name))
    }
}

impl ProjectStore for LocalCache {
    fn load(&self, project_id: &str) -> Result<Option<FileSet>, AppError> {
        let path = self.path_for(project_id)?;
        let cached: Option<CachedProject> = read_json_if_exists(&path)?;
        Ok(cached.map(|cached| cached.files))
    }

    fn save(&self, project_id: &str, name: &str, files: &FileSet) -> Result<(), AppError> {
        let path = self.path_for(project_id)?;
        let document = CachedProject {
            project_id: project_id.trim().to_string(),
            name: Some(name.to_string()),
            files: files.clone(),
        };
        write_json_atomic(&path, &document)?;
        tracing::debug!("Cached project {} at {}", project_id, path.display());
        Ok(())
    }
}
