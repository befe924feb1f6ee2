//! Core domain library for CipherStudio (virtual files, storage, auth, sessions).

/// Password hashing and bearer token issuance.
pub mod auth;
/// Client-side project cache on the local filesystem.
pub mod cache;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Database access layer.
pub mod db;
/// Environment mutation helpers (used by tests across crates).
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Virtual file set: paths, store operations, component scanning, entry synthesis.
pub mod files;
/// Data models for API requests and persistence.
pub mod models;
/// Explicit client session state.
pub mod session;
/// Shared text normalization helpers.
pub mod text;
/// Editing controller tying the file set to session flags and persistence.
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{Claims, TokenService};
pub use cache::LocalCache;
pub use config::Config;
pub use constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
pub use db::{Database, ProjectStore};
pub use error::AppError;
pub use files::{FileSet, FileSetError, VirtualFile, ENTRY_PATH};
pub use session::Session;
pub use workspace::{Edit, Workspace};
