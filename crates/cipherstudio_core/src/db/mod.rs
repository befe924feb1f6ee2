//! Database layer for CipherStudio projects and accounts.

/// Project storage helpers.
pub mod project;
/// redb table definitions.
pub mod tables;
/// Account storage helpers.
pub mod user;

use crate::error::AppError;
use crate::files::FileSet;
use std::path::Path;
use std::sync::Arc;


/// Load and save file sets by project id.
///
/// Implemented by the server database and by the client-side JSON cache so
/// the editor can persist the same way against either.
pub trait ProjectStore {
    /// Fetch the file set stored under `project_id`.
    ///
    /// # Returns
    /// `Ok(None)` when nothing is stored under that id.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    fn load(&self, project_id: &str) -> Result<Option<FileSet>, AppError>;

    /// Create or replace the project stored under `project_id`.
    ///
    /// # Errors
    /// Returns an error when storage access or encoding fails.
    fn save(&self, project_id: &str, name: &str, files: &FileSet) -> Result<(), AppError>;
}

/// Database handle with access to the underlying redb tables.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub projects: project::ProjectDb,
    pub users: user::UserDb,
}

impl Database {
    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Returns
    /// A new [`Database`] wrapper that shares the underlying redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            projects: project::ProjectDb::new(db.clone())?,
            users: user::UserDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// redb allows a single open handle per file, so a second `Database::new`
    /// on the same path would fail.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }

    /// Open (or create) the database stored in directory `path`.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created, when another
    /// process holds the database open, or when table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        std::fs::create_dir_all(path)?;
        let file = Path::new(path).join(tables::REDB_FILE_NAME);

        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database {} is already open in another process.\n\
                    Stop the other cipherstudio-server instance, or set DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::debug!("Opened database at {}", file.display());

        Self::from_shared(db)
    }

    /// Flush pending writes.
    ///
    /// redb makes every committed write transaction durable, so this is a
    /// no-op kept for shutdown symmetry.
    ///
    /// # Errors
    /// Never fails today.
    pub fn flush(&self) -> Result<(), AppError> {
        Ok(())
    }
}

impl ProjectStore for Database {
    fn load(&self, project_id: &str) -> Result<Option<FileSet>, AppError> {
        match self.projects.get(project_id)? {
            Some(project) => Ok(Some(project.file_set()?)),
            None => Ok(None),
        }
    }

    fn save(&self, project_id: &str, name: &str, files: &FileSet) -> Result<(), AppError> {
        self.projects.upsert(project_id, name, files, None)?;
        Ok(())
    }
}
