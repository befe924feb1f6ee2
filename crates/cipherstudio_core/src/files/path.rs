//! Normalization of virtual path keys and user-typed names.

use super::{DEFAULT_EXTENSION, SOURCE_EXTENSIONS};

const SEPARATOR: char = '/';

fn segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.trim().split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Normalize a raw path into a file-set key.
///
/// Surrounding whitespace is trimmed and empty segments are dropped, so
/// leading, trailing and doubled separators disappear. The result carries
/// exactly one leading separator.
///
/// # Returns
/// The normalized key, or an empty string when nothing remains. Callers must
/// treat the empty result as an invalid name.
pub fn normalize_path(raw: &str) -> String {
    let parts: Vec<&str> = segments(raw).collect();
    if parts.is_empty() {
        return String::new();
    }
    format!("{}{}", SEPARATOR, parts.join("/"))
}

/// Final segment of a path (the file name).
pub fn final_segment(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Extension (including the dot) of the final segment, if it has one.
///
/// A leading dot (`.env`) and a bare trailing dot (`name.`) do not count.
pub fn extension_of(path: &str) -> Option<&str> {
    let name = final_segment(path);
    let dot = name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let suffix = &name[dot..];
    if suffix.len() < 2 || !suffix[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(suffix)
}

/// Final segment with its extension removed.
pub fn file_stem(path: &str) -> &str {
    let name = final_segment(path);
    match extension_of(name) {
        Some(ext) => &name[..name.len() - ext.len()],
        None => name,
    }
}

/// Extension a raw name resolves to, defaulting to [`DEFAULT_EXTENSION`].
pub fn infer_extension(raw: &str) -> String {
    extension_of(raw.trim().trim_end_matches(SEPARATOR))
        .unwrap_or(DEFAULT_EXTENSION)
        .to_string()
}

/// Append [`DEFAULT_EXTENSION`] to a raw name whose final segment has none.
pub fn with_default_extension(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches(SEPARATOR);
    if extension_of(trimmed).is_some() {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, DEFAULT_EXTENSION)
    }
}

/// Returns `true` when `path` ends in one of [`SOURCE_EXTENSIONS`].
pub fn is_source_path(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn strip_source_extension(segment: &str) -> &str {
    SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| {
            segment
                .strip_suffix(ext)
                .filter(|stem| !stem.is_empty())
        })
        .unwrap_or(segment)
}

/// Normalize a user-typed folder name.
///
/// Leading and trailing separators are stripped and a source extension is
/// removed from the last segment only, so typing `components/Header.js`
/// where a folder was expected yields `components/Header`.
///
/// # Returns
/// The folder path without leading separator, or an empty string when the
/// input reduces to nothing.
pub fn normalize_folder_segment(raw: &str) -> String {
    let mut parts: Vec<&str> = segments(raw).collect();
    if let Some(last) = parts.last_mut() {
        *last = strip_source_extension(last);
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_applies_single_leading_separator() {
        assert_eq!(normalize_path("App.js"), "/App.js");
        assert_eq!(normalize_path("///App.js"), "/App.js");
        assert_eq!(normalize_path("  //a//b/ "), "/a/b");
        assert_eq!(normalize_path("components/Header.js/"), "/components/Header.js");
    }

    #[test]
    fn normalize_path_rejects_blank_input_with_empty_result() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("   "), "");
        assert_eq!(normalize_path(" /// "), "");
    }

    #[test]
    fn infer_extension_reads_last_suffix_or_defaults() {
        assert_eq!(infer_extension("Header"), ".js");
        assert_eq!(infer_extension("styles.css"), ".css");
        assert_eq!(infer_extension("archive.tar.gz"), ".gz");
        assert_eq!(infer_extension("ui.v2/Button"), ".js");
        assert_eq!(infer_extension(".env"), ".js");
        assert_eq!(infer_extension("name."), ".js");
    }

    #[test]
    fn with_default_extension_only_appends_when_missing() {
        assert_eq!(with_default_extension("Header"), "Header.js");
        assert_eq!(with_default_extension(" Header.jsx "), "Header.jsx");
        assert_eq!(with_default_extension("ui/Button/"), "ui/Button.js");
        assert_eq!(with_default_extension("index.html"), "index.html");
    }

    #[test]
    fn stem_and_final_segment_split_nested_paths() {
        assert_eq!(final_segment("/components/Header.js"), "Header.js");
        assert_eq!(file_stem("/components/Header.js"), "Header");
        assert_eq!(file_stem("/README"), "README");
        assert_eq!(final_segment("App.js"), "App.js");
    }

    #[test]
    fn source_paths_match_known_extensions_only() {
        assert!(is_source_path("/App.js"));
        assert!(is_source_path("/ui/Card.tsx"));
        assert!(!is_source_path("/styles.css"));
        assert!(!is_source_path("/Makefile"));
    }

    #[test]
    fn normalize_folder_segment_strips_separators_and_trailing_extension() {
        assert_eq!(normalize_folder_segment("components"), "components");
        assert_eq!(normalize_folder_segment(" /components/ "), "components");
        assert_eq!(
            normalize_folder_segment("/components/Header.js/"),
            "components/Header"
        );
        assert_eq!(normalize_folder_segment("lib.js/ui"), "lib.js/ui");
        assert_eq!(normalize_folder_segment("styles.css"), "styles.css");
    }

    #[test]
    fn normalize_folder_segment_returns_empty_for_blank_input() {
        assert_eq!(normalize_folder_segment(""), "");
        assert_eq!(normalize_folder_segment(" // "), "");
    }
}
