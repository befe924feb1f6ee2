//! File-set mutations.
//!
//! Every operation takes the current set by reference and returns a new set.
//! All validation (including the folder-move conflict dry run) completes
//! before the copy is modified, so a failed operation has no observable effect.

use super::path::{
    extension_of, normalize_folder_segment, normalize_path, with_default_extension,
};
use super::templates::template_for;
use super::{FileSet, FileSetError, ENTRY_PATH};

/// Add a new file named by user input.
///
/// The name gets the default extension when it has none and is normalized
/// into a path key. Content comes from [`template_for`].
///
/// # Returns
/// A new set with the file appended.
///
/// # Errors
/// [`FileSetError::InvalidName`] for names that are blank or only separators and
/// [`FileSetError::DuplicatePath`] when the path is already taken.
pub fn add(files: &FileSet, raw_name: &str) -> Result<FileSet, FileSetError> {
    if normalize_path(raw_name).is_empty() {
        return Err(FileSetError::InvalidName);
    }
    let path = normalize_path(&with_default_extension(raw_name));
    if path.is_empty() {
        return Err(FileSetError::InvalidName);
    }
    if files.contains(&path) {
        return Err(FileSetError::DuplicatePath(path));
    }

    let content = template_for(&path);
    let mut updated = files.clone();
    updated.insert(path, content);
    Ok(updated)
}

/// Remove a file. Missing paths are ignored.
pub fn delete_file(files: &FileSet, path: &str) -> FileSet {
    let mut updated = files.clone();
    updated.remove(path);
    updated
}

/// Editable form of a path, shown when a rename starts.
pub fn start_rename(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}

fn rename_target(old_path: &str, raw_new: &str) -> String {
    let trimmed = raw_new.trim().trim_end_matches('/');
    let with_extension = if extension_of(trimmed).is_some() {
        trimmed.to_string()
    } else {
        match extension_of(old_path) {
            Some(ext) => format!("{}{}", trimmed, ext),
            None => with_default_extension(trimmed),
        }
    };
    normalize_path(&with_extension)
}

/// Rename a single file.
///
/// The target keeps the old extension unless `raw_new` carries its own. The
/// renamed entry moves to the end of the iteration order.
///
/// # Errors
/// - [`FileSetError::InvalidName`] for names that are blank or only separators.
/// - [`FileSetError::ProtectedPath`] when renaming [`ENTRY_PATH`] with
///   auto-render off.
/// - [`FileSetError::MissingPath`] when `old_path` is not in the set.
/// - [`FileSetError::DuplicatePath`] when the target is taken (including
///   `old_path` itself).
pub fn apply_rename(
    files: &FileSet,
    old_path: &str,
    raw_new: &str,
    auto_render: bool,
) -> Result<FileSet, FileSetError> {
    if normalize_path(raw_new).is_empty() {
        return Err(FileSetError::InvalidName);
    }
    if old_path == ENTRY_PATH && !auto_render {
        return Err(FileSetError::ProtectedPath(ENTRY_PATH.to_string()));
    }
    if !files.contains(old_path) {
        return Err(FileSetError::MissingPath(old_path.to_string()));
    }

    let target = rename_target(old_path, raw_new);
    if target.is_empty() {
        return Err(FileSetError::InvalidName);
    }
    if files.contains(&target) {
        return Err(FileSetError::DuplicatePath(target));
    }

    let mut updated = files.clone();
    if let Some(content) = updated.remove(old_path) {
        updated.insert(target, content);
    }
    Ok(updated)
}

/// Move every file under one folder prefix to another.
///
/// Both names go through [`normalize_folder_segment`]. Every target path is
/// checked before anything is rewritten; rewritten entries move to the end of
/// the iteration order, keeping their relative order.
///
/// # Errors
/// Checked in this order:
/// - [`FileSetError::InvalidFolderName`] when either name is blank.
/// - [`FileSetError::NoOp`] when both names normalize identically.
/// - [`FileSetError::ProtectedPath`] when [`ENTRY_PATH`] lies under the old
///   prefix and auto-render is off.
/// - [`FileSetError::EmptySelection`] when no file lies under the old prefix.
/// - [`FileSetError::DuplicatePath`] naming the first target already taken.
pub fn rename_folder(
    files: &FileSet,
    raw_old: &str,
    raw_new: &str,
    auto_render: bool,
) -> Result<FileSet, FileSetError> {
    let old_base = normalize_folder_segment(raw_old);
    if old_base.is_empty() {
        return Err(FileSetError::InvalidFolderName(raw_old.to_string()));
    }
    let new_base = normalize_folder_segment(raw_new);
    if new_base.is_empty() {
        return Err(FileSetError::InvalidFolderName(raw_new.to_string()));
    }
    if old_base == new_base {
        return Err(FileSetError::NoOp);
    }

    let old_prefix = format!("/{}/", old_base);
    let new_prefix = format!("/{}/", new_base);

    if !auto_render && ENTRY_PATH.starts_with(&old_prefix) && files.contains(ENTRY_PATH) {
        return Err(FileSetError::ProtectedPath(ENTRY_PATH.to_string()));
    }

    let moves: Vec<(String, String)> = files
        .paths()
        .filter_map(|path| {
            path.strip_prefix(&old_prefix)
                .map(|rest| (path.to_string(), format!("{}{}", new_prefix, rest)))
        })
        .collect();
    if moves.is_empty() {
        return Err(FileSetError::EmptySelection(old_prefix));
    }

    if let Some((_, conflict)) = moves.iter().find(|(_, target)| files.contains(target)) {
        return Err(FileSetError::DuplicatePath(conflict.clone()));
    }

    let mut updated = files.clone();
    for (source, target) in moves {
        if let Some(content) = updated.remove(&source) {
            updated.insert(target, content);
        }
    }
    tracing::debug!("Moved folder {} to {}", old_prefix, new_prefix);
    Ok(updated)
}

/// Replace the content of an existing file.
///
/// # Errors
/// [`FileSetError::MissingPath`] when `path` is not in the set.
pub fn write_file(files: &FileSet, path: &str, content: &str) -> Result<FileSet, FileSetError> {
    if !files.contains(path) {
        return Err(FileSetError::MissingPath(path.to_string()));
    }
    let mut updated = files.clone();
    updated.insert(path.to_string(), content.to_string());
    Ok(updated)
}
