//! Project storage operations backed by redb.

use crate::db::tables::PROJECTS;
use crate::error::AppError;
use crate::files::FileSet;
use crate::models::project::{Project, ProjectSummary};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Message returned when a create collides with an existing project id.
pub const PROJECT_EXISTS_MESSAGE: &str = "ProjectId already exists";

fn deserialize_project(bytes: &[u8]) -> Result<Project, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Accessor for the `projects` table.
pub struct ProjectDb {
    db: Arc<redb::Database>,
}

impl ProjectDb {
    /// Initialize the project table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PROJECTS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new project row.
    ///
    /// The existence check and the insert share one write transaction.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when the id is taken, or a storage
    /// error.
    pub fn create(&self, project: &Project) -> Result<(), AppError> {
        let encoded = bincode::serialize(project)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut projects = write_txn.open_table(PROJECTS)?;
            if projects.get(project.project_id.as_str())?.is_some() {
                return Err(AppError::BadRequest(PROJECT_EXISTS_MESSAGE.to_string()));
            }
            projects.insert(project.project_id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        tracing::debug!("Created project {}", project.project_id);
        Ok(())
    }

    /// Fetch a project by id.
    ///
    /// # Returns
    /// `Ok(Some(project))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, project_id: &str) -> Result<Option<Project>, AppError> {
        let read_txn = self.db.begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;
        match projects.get(project_id)? {
            Some(value) => Ok(Some(deserialize_project(value.value())?)),
            None => Ok(None),
        }
    }

    /// Replace name and files of `project_id`, creating it when missing.
    ///
    /// An existing owner is kept; `owner_id` only fills an unowned row.
    ///
    /// # Returns
    /// The stored project after the write.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn upsert(
        &self,
        project_id: &str,
        name: &str,
        files: &FileSet,
        owner_id: Option<&str>,
    ) -> Result<Project, AppError> {
        let write_txn = self.db.begin_write()?;
        let project = {
            let mut projects = write_txn.open_table(PROJECTS)?;
            let existing = match projects.get(project_id)? {
                Some(value) => Some(deserialize_project(value.value())?),
                None => None,
            };
            let project = match existing {
                Some(mut project) => {
                    project.replace_contents(name, files);
                    if project.owner_id.is_none() {
                        project.owner_id = owner_id.map(str::to_string);
                    }
                    project
                }
                None => Project::new(project_id, name, files, owner_id.map(str::to_string)),
            };
            let encoded = bincode::serialize(&project)?;
            projects.insert(project_id, encoded.as_slice())?;
            project
        };
        write_txn.commit()?;
        Ok(project)
    }

    /// Summaries of every project owned by `owner_id`, most recent first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ProjectSummary>, AppError> {
        let read_txn = self.db.begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;
        let mut summaries = Vec::new();
        for entry in projects.iter()? {
            let (_, value) = entry?;
            let project = deserialize_project(value.value())?;
            if project.owner_id.as_deref() == Some(owner_id) {
                summaries.push(project.summary());
            }
        }
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        Ok(summaries)
    }
}
