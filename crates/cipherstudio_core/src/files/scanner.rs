//! Heuristic detection of files that export a UI component.
//!
//! This is pattern matching, not parsing: markers inside string literals or
//! comments count the same as real code. Those false positives and negatives
//! are accepted behavior.

use regex::Regex;
use std::sync::OnceLock;

fn default_export() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)export\s+default").expect("static regex"))
}

fn default_function() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)export\s+default\s+function").expect("static regex"))
}

fn arrow_body() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"=>\s*\{").expect("static regex"))
}

fn markup_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[A-Za-z0-9_]+[^>]*>").expect("static regex"))
}

/// Decide whether `content` looks like an exportable component.
///
/// # Returns
/// `true` when the text has a default export and either a default-exported
/// function, an arrow-function body, or a markup tag.
pub fn looks_like_component(content: &str) -> bool {
    if !default_export().is_match(content) {
        return false;
    }
    default_function().is_match(content)
        || arrow_body().is_match(content)
        || markup_tag().is_match(content)
}

/// Convert arbitrary text into a title-cased identifier.
///
/// The input is split on runs of non-alphanumeric ASCII characters, empty
/// pieces are dropped, and each piece has its first character uppercased.
///
/// # Returns
/// The concatenated identifier; empty when the input has no alphanumerics.
pub fn to_title_identifier(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let mut chars = piece.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
