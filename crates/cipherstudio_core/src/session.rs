//! Explicit client session state.
//!
//! Everything the editor needs to know about the signed-in user and the
//! current preferences lives in one [`Session`] value that callers pass by
//! reference. It is persisted as `session.json` in the client home.

use crate::cache::{read_json_if_exists, write_json_atomic};
use crate::constants::DEFAULT_PROJECT_ID;
use crate::error::AppError;
use crate::models::user::PublicUser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SESSION_FILE_NAME: &str = "session.json";

fn default_auto_render() -> bool {
    true
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

/// Signed-in user, bearer token, and editor preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<PublicUser>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub autosave: bool,
    #[serde(default = "default_auto_render")]
    pub auto_render: bool,
    #[serde(default = "default_project_id")]
    pub project_id: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            autosave: false,
            auto_render: default_auto_render(),
            project_id: default_project_id(),
        }
    }
}

impl Session {
    /// Location of the session document inside `home`.
    pub fn file_path(home: &Path) -> PathBuf {
        home.join(SESSION_FILE_NAME)
    }

    /// Load the session stored in `home`, or a fresh one when none exists.
    ///
    /// # Errors
    /// Returns an error when the document exists but cannot be read or parsed.
    pub fn load(home: &Path) -> Result<Self, AppError> {
        Ok(read_json_if_exists(&Self::file_path(home))?.unwrap_or_default())
    }

    /// Persist this session into `home`.
    ///
    /// # Errors
    /// Returns an error when the directory or file cannot be written.
    pub fn save(&self, home: &Path) -> Result<(), AppError> {
        write_json_atomic(&Self::file_path(home), self)
    }

    /// A session counts as authenticated while it holds a token.
    pub fn is_authed(&self) -> bool {
        self.token.is_some()
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn login(&mut self, user: PublicUser, token: String) {
        self.user = Some(user);
        self.token = Some(token);
    }

    /// Drop user and token; preferences and the current project survive.
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
    }
}
