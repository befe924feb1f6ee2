//! In-memory virtual file set backing the editor.
//!
//! A [`FileSet`] maps normalized path keys (`/dir/Name.js`) to source text.
//! Store operations in [`store`] never mutate their input; they return a new
//! set or a [`FileSetError`]. [`synth`] derives the generated entry file that
//! the rendering sandbox loads.

/// Path key normalization helpers.
pub mod path;
/// Heuristic detection of exported UI components.
pub mod scanner;
/// File-set mutations (add, delete, rename, folder move, write).
pub mod store;
/// Derived entry-point generation and the combined sandbox view.
pub mod synth;
/// Initial content templates for new files.
pub mod templates;


use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use path::{infer_extension, normalize_folder_segment, normalize_path, with_default_extension};
pub use scanner::{looks_like_component, to_title_identifier};
pub use store::{add, apply_rename, delete_file, rename_folder, start_rename, write_file};
pub use synth::{sandbox_view, synthesize_entry};

/// Reserved path the rendering sandbox always loads first.
pub const ENTRY_PATH: &str = "/App.js";

/// Content of the entry file in a freshly created file set.
pub const DEFAULT_ENTRY_CONTENT: &str =
    "export default function App(){ return <h1>Hello CipherStudio</h1> }";

/// Extension appended to names typed without one.
pub const DEFAULT_EXTENSION: &str = ".js";

/// Extensions treated as component source files.
pub const SOURCE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];

/// Errors raised by file-set mutations. The input set is never modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileSetError {
    #[error("File name must not be empty")]
    InvalidName,

    #[error("Invalid folder name: '{0}'")]
    InvalidFolderName(String),

    #[error("{0} already exists")]
    DuplicatePath(String),

    #[error("Cannot modify {0} while auto render is off")]
    ProtectedPath(String),

    #[error("No files found under {0}")]
    EmptySelection(String),

    #[error("Old and new folder names are the same")]
    NoOp,

    #[error("No file at {0}")]
    MissingPath(String),
}

/// A single virtual source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualFile {
    pub path: String,
    pub content: String,
}

impl VirtualFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Ordered mapping from normalized path to file content.
///
/// Equality ignores iteration order; use [`FileSet::paths`] when order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, String>",
    into = "IndexMap<String, String>"
)]
pub struct FileSet {
    entries: IndexMap<String, String>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the file set every new project starts with: a single entry file.
    ///
    /// # Returns
    /// A set containing [`ENTRY_PATH`] with [`DEFAULT_ENTRY_CONTENT`].
    pub fn with_default_entry() -> Self {
        let mut entries = IndexMap::new();
        entries.insert(ENTRY_PATH.to_string(), DEFAULT_ENTRY_CONTENT.to_string());
        Self { entries }
    }

    /// Build a file set from externally supplied `(name, content)` pairs.
    ///
    /// Every name is normalized with [`normalize_path`]; order is preserved.
    ///
    /// # Errors
    /// Returns [`FileSetError::InvalidName`] for names that normalize to
    /// nothing and [`FileSetError::DuplicatePath`] when two names collide after
    /// normalization.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, FileSetError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut normalized = IndexMap::new();
        for (name, content) in entries {
            let path = normalize_path(name.as_ref());
            if path.is_empty() {
                return Err(FileSetError::InvalidName);
            }
            if normalized.contains_key(&path) {
                return Err(FileSetError::DuplicatePath(path));
            }
            normalized.insert(path, content.into());
        }
        Ok(Self {
            entries: normalized,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Content stored at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Paths in iteration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(path, content)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    /// Owned copies of every file in iteration order.
    pub fn to_files(&self) -> Vec<VirtualFile> {
        self.iter()
            .map(|(path, content)| VirtualFile::new(path, content))
            .collect()
    }

    /// Content hash over paths, order, and contents.
    ///
    /// Used to detect unsaved edits without keeping a second copy of the set.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (path, content) in self.iter() {
            hasher.update(&(path.len() as u64).to_le_bytes());
            hasher.update(path.as_bytes());
            hasher.update(&(content.len() as u64).to_le_bytes());
            hasher.update(content.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    pub(crate) fn insert(&mut self, path: String, content: String) {
        self.entries.insert(path, content);
    }

    pub(crate) fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.shift_remove(path)
    }

    pub(crate) fn as_map(&self) -> &IndexMap<String, String> {
        &self.entries
    }
}

impl TryFrom<IndexMap<String, String>> for FileSet {
    type Error = FileSetError;

    fn try_from(value: IndexMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_entries(value)
    }
}

impl From<FileSet> for IndexMap<String, String> {
    fn from(value: FileSet) -> Self {
        value.entries
    }
}
