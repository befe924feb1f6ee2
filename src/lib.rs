//! Root crate facade for the CipherStudio server and editing core.

pub use cipherstudio_core::{files, Edit, FileSet, LocalCache, ProjectStore, Session, Workspace};
pub use cipherstudio_server::{
    config, create_app, db, error, handlers, models, serve_router, AppError, AppState, Config,
    Database,
};
