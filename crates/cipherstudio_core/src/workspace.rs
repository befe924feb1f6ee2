//! Editing controller tying the file set to session flags and persistence.
//!
//! A [`Workspace`] owns the working copy of one project. Every [`Edit`] goes
//! through the pure store functions in [`crate::files`]; the new set is only
//! swapped in when the operation succeeds. Persistence is a separate step and
//! never rolls back an applied edit.

use crate::cache::{read_json_if_exists, write_json_atomic};
use crate::constants::{DEFAULT_PROJECT_ID, DEFAULT_PROJECT_NAME};
use crate::db::ProjectStore;
use crate::error::AppError;
use crate::files::{self, FileSet, FileSetError, VirtualFile};
use crate::session::Session;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const WORKSPACE_FILE_NAME: &str = "workspace.json";

/// One user edit against the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Create a file from a typed name.
    Add { name: String },
    /// Remove the file at `path`. Missing paths are ignored.
    Delete { path: String },
    /// Rename the file at `path`; `new_name` is relative to the root.
    Rename { path: String, new_name: String },
    /// Move every file under `old` to `new`.
    RenameFolder { old: String, new: String },
    /// Replace the content of an existing file.
    Write { path: String, content: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkingCopy {
    project_id: String,
    name: String,
    files: FileSet,
    #[serde(default)]
    saved_fingerprint: Option<String>,
}

/// Working copy of the current project.
#[derive(Debug, Clone)]
pub struct Workspace {
    project_id: String,
    name: String,
    files: FileSet,
    saved_fingerprint: Option<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ID)
    }
}

impl Workspace {
    /// Fresh working copy holding only the default entry file.
    pub fn new(project_id: impl Into<String>) -> Self {
        let files = FileSet::with_default_entry();
        Self {
            project_id: project_id.into(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            saved_fingerprint: Some(files.fingerprint()),
            files,
        }
    }

    /// Working copy for files that were just loaded from a store.
    pub fn from_saved(project_id: impl Into<String>, files: FileSet) -> Self {
        Self {
            project_id: project_id.into(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            saved_fingerprint: Some(files.fingerprint()),
            files,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Apply `edit` using the flags in `session`.
    ///
    /// # Returns
    /// The path the edit produced or touched.
    ///
    /// # Errors
    /// Returns the [`FileSetError`] of the underlying store operation; the
    /// working copy is left untouched in that case.
    pub fn apply(&mut self, edit: Edit, session: &Session) -> Result<String, FileSetError> {
        let auto_render = session.auto_render;
        let (next, touched) = match &edit {
            Edit::Add { name } => {
                let next = files::add(&self.files, name)?;
                let touched = next
                    .paths()
                    .find(|path| !self.files.contains(path))
                    .unwrap_or_default()
                    .to_string();
                (next, touched)
            }
            Edit::Delete { path } => {
                let path = files::normalize_path(path);
                (files::delete_file(&self.files, &path), path)
            }
            Edit::Rename { path, new_name } => {
                let path = files::normalize_path(path);
                let next = files::apply_rename(&self.files, &path, new_name, auto_render)?;
                let touched = next
                    .paths()
                    .find(|candidate| !self.files.contains(candidate))
                    .unwrap_or_default()
                    .to_string();
                (next, touched)
            }
            Edit::RenameFolder { old, new } => {
                let next = files::rename_folder(&self.files, old, new, auto_render)?;
                (next, format!("/{}/", files::normalize_folder_segment(new)))
            }
            Edit::Write { path, content } => {
                let path = files::normalize_path(path);
                (files::write_file(&self.files, &path, content)?, path)
            }
        };
        tracing::debug!("Applied {:?} to project {}", edit, self.project_id);
        self.files = next;
        Ok(touched)
    }

    /// Generated entry file for the current flags.
    pub fn entry(&self, session: &Session) -> VirtualFile {
        files::synthesize_entry(&self.files, session.auto_render)
    }

    /// Combined mapping handed to the rendering sandbox.
    ///
    /// Recomputed from scratch on every call.
    pub fn sandbox_files(&self, session: &Session) -> IndexMap<String, String> {
        files::sandbox_view(&self.files, session.auto_render)
    }

    /// `true` when the files differ from the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.saved_fingerprint.as_deref() != Some(self.files.fingerprint().as_str())
    }

    pub fn mark_saved(&mut self) {
        self.saved_fingerprint = Some(self.files.fingerprint());
    }

    /// Persist into `store` and mark the working copy clean.
    ///
    /// # Errors
    /// Returns the store error; the working copy stays as it was.
    pub fn save_to(&mut self, store: &dyn ProjectStore) -> Result<(), AppError> {
        store.save(&self.project_id, &self.name, &self.files)?;
        self.mark_saved();
        Ok(())
    }

    /// Write to `cache` when autosave is on.
    ///
    /// Autosave does not clear the dirty flag; only an explicit save does.
    ///
    /// # Returns
    /// `true` when a write happened.
    ///
    /// # Errors
    /// Returns the store error. The applied edit is kept regardless.
    pub fn autosave(&self, session: &Session, cache: &dyn ProjectStore) -> Result<bool, AppError> {
        if !session.autosave {
            return Ok(false);
        }
        cache.save(&self.project_id, &self.name, &self.files)?;
        Ok(true)
    }

    /// Location of the working copy inside `home`.
    pub fn file_path(home: &Path) -> PathBuf {
        home.join(WORKSPACE_FILE_NAME)
    }

    /// Load the working copy stored in `home`.
    ///
    /// # Returns
    /// The stored copy, or a fresh one for `fallback_project_id` when none
    /// exists yet.
    ///
    /// # Errors
    /// Returns an error when the document exists but cannot be parsed.
    pub fn load(home: &Path, fallback_project_id: &str) -> Result<Self, AppError> {
        let stored: Option<WorkingCopy> = read_json_if_exists(&Self::file_path(home))?;
        Ok(match stored {
            Some(copy) => Self {
                project_id: copy.project_id,
                name: copy.name,
                files: copy.files,
                saved_fingerprint: copy.saved_fingerprint,
            },
            None => Self::new(fallback_project_id),
        })
    }

    /// Persist the working copy into `home`.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn store(&self, home: &Path) -> Result<(), AppError> {
        let copy = WorkingCopy {
            project_id: self.project_id.clone(),
            name: self.name.clone(),
            files: self.files.clone(),
            saved_fingerprint: self.saved_fingerprint.clone(),
        };
        write_json_atomic(&Self::file_path(home), &copy)
    }
}
