//! Starter content for newly added files, chosen by extension.

use super::path::{extension_of, file_stem};
use super::scanner::to_title_identifier;
use super::{DEFAULT_EXTENSION, SOURCE_EXTENSIONS};

const FALLBACK_COMPONENT_NAME: &str = "Component";

/// Component symbol generated for a file stem.
///
/// # Returns
/// The title-cased stem, or `Component` when the stem has no alphanumerics.
pub fn component_name(stem: &str) -> String {
    let name = to_title_identifier(stem);
    if name.is_empty() {
        FALLBACK_COMPONENT_NAME.to_string()
    } else {
        name
    }
}

fn component_template(name: &str) -> String {
    format!(
        "export default function {name}() {{\n  return (\n    <div>\n      <h2>{name} Component</h2>\n    </div>\n  );\n}}"
    )
}

fn markup_template(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <title>{title}</title>\n  </head>\n  <body></body>\n</html>\n"
    )
}

fn style_template(name: &str) -> String {
    format!("/* {name} styles */\n")
}

/// Initial content for a new file at `path`.
///
/// Source files get component boilerplate, `.html` and `.css` get minimal
/// boilerplate, anything else starts empty.
pub fn template_for(path: &str) -> String {
    let ext = extension_of(path).unwrap_or(DEFAULT_EXTENSION);
    let stem = file_stem(path);
    if SOURCE_EXTENSIONS.contains(&ext) {
        return component_template(&component_name(stem));
    }
    match ext {
        ".html" => markup_template(stem),
        ".css" => style_template(stem),
        _ => String::new(),
    }
}
