//! Derived entry-point generation.
//!
//! With auto-render on, the entry file handed to the rendering sandbox is
//! regenerated from scratch: one import and one render call per sibling file
//! that looks like a component. The file set itself is never modified.

use super::path::{extension_of, file_stem, is_source_path};
use super::scanner::{looks_like_component, to_title_identifier};
use super::{FileSet, VirtualFile, DEFAULT_ENTRY_CONTENT, ENTRY_PATH};
use indexmap::IndexMap;

const PACKAGE_INDEX_STEM: &str = "index";

/// One generated import in the synthesized entry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentImport {
    /// Identifier the component is imported as.
    pub alias: String,
    /// Relative module specifier (`./dir/Name`).
    pub source: String,
}

impl ComponentImport {
    fn for_path(path: &str) -> Self {
        let relative = path.strip_prefix('/').unwrap_or(path);
        let source = match extension_of(relative) {
            Some(ext) => &relative[..relative.len() - ext.len()],
            None => relative,
        };
        Self {
            alias: to_title_identifier(file_stem(path)),
            source: format!("./{}", source),
        }
    }
}

fn is_package_index(path: &str) -> bool {
    file_stem(path).eq_ignore_ascii_case(PACKAGE_INDEX_STEM)
}

/// Components the synthesized entry will import, in file-set order.
///
/// Only source files are considered; the entry file itself and package
/// index files are skipped, and the rest must pass the component scanner.
pub fn component_imports(files: &FileSet) -> Vec<ComponentImport> {
    files
        .iter()
        .filter(|(path, _)| is_source_path(path))
        .filter(|(path, _)| *path != ENTRY_PATH)
        .filter(|(path, _)| !is_package_index(path))
        .filter(|(_, content)| looks_like_component(content))
        .map(|(path, _)| ComponentImport::for_path(path))
        .collect()
}

fn render_entry(imports: &[ComponentImport]) -> String {
    let import_lines = imports
        .iter()
        .map(|import| format!("import {} from \"{}\";", import.alias, import.source))
        .collect::<Vec<_>>()
        .join("\n");
    let render_lines = imports
        .iter()
        .map(|import| format!("      <{} />", import.alias))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{import_lines}\n\nexport default function App(){{\n  return (\n    <div>\n      <h1>Hello CipherStudio</h1>\n{render_lines}\n    </div>\n  );\n}}"
    )
}

/// Produce the entry file the rendering sandbox should load.
///
/// # Arguments
/// - `files`: Current file set (not modified).
/// - `auto_render`: Whether to synthesize the entry from detected components.
///
/// # Returns
/// With auto-render off, the set's own entry file (or the default entry when
/// the set has none). With auto-render on, a freshly generated entry file.
/// Identical inputs always produce identical output.
pub fn synthesize_entry(files: &FileSet, auto_render: bool) -> VirtualFile {
    if !auto_render {
        let content = files.get(ENTRY_PATH).unwrap_or(DEFAULT_ENTRY_CONTENT);
        return VirtualFile::new(ENTRY_PATH, content);
    }
    VirtualFile::new(ENTRY_PATH, render_entry(&component_imports(files)))
}

/// Flat path-to-content mapping handed to the rendering sandbox.
///
/// # Returns
/// Every file in the set, with [`ENTRY_PATH`] replaced in place (or appended)
/// by the result of [`synthesize_entry`].
pub fn sandbox_view(files: &FileSet, auto_render: bool) -> IndexMap<String, String> {
    let entry = synthesize_entry(files, auto_render);
    let mut view = files.as_map().clone();
    view.insert(entry.path, entry.content);
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, &str)]) -> FileSet {
        FileSet::from_entries(entries.iter().copied()).expect("valid entries")
    }

    #[test]
    fn auto_render_off_returns_existing_entry_verbatim() {
        let files = set(&[("/App.js", "export default function App(){ return null }")]);
        let entry = synthesize_entry(&files, false);
        assert_eq!(entry.path, ENTRY_PATH);
        assert_eq!(entry.content, "export default function App(){ return null }");
    }

    #[test]
    fn auto_render_off_without_entry_uses_default_content() {
        let files = set(&[("/Header.js", "export default function Header(){}")]);
        assert_eq!(synthesize_entry(&files, false).content, DEFAULT_ENTRY_CONTENT);
    }

    #[test]
    fn generated_entry_matches_expected_layout() {
        let files = set(&[
            ("/App.js", "export default function App(){}"),
            ("/Header.js", "export default function Header(){ return <h2/> }"),
            ("/ui/nav-bar.js", "const NavBar = () => {};\nexport default NavBar;"),
        ]);
        let expected = "import Header from \"./Header\";\n\
import NavBar from \"./ui/nav-bar\";\n\
\n\
export default function App(){\n  return (\n    <div>\n      <h1>Hello CipherStudio</h1>\n      <Header />\n      <NavBar />\n    </div>\n  );\n}";
        assert_eq!(synthesize_entry(&files, true).content, expected);
    }

    #[test]
    fn generated_entry_without_components_keeps_blank_render_slot() {
        let files = set(&[("/App.js", "export default function App(){}")]);
        let expected = "\n\nexport default function App(){\n  return (\n    <div>\n      <h1>Hello CipherStudio</h1>\n\n    </div>\n  );\n}";
        assert_eq!(synthesize_entry(&files, true).content, expected);
    }

    #[test]
    fn selection_skips_entry_index_non_source_and_non_components() {
        let files = set(&[
            ("/App.js", "export default function App(){}"),
            ("/index.js", "export default function Index(){}"),
            ("/lib/INDEX.js", "export default function Index(){}"),
            ("/styles.css", "export default function Nope(){}"),
            ("/util.js", "export const add = (a, b) => a + b;"),
            ("/Card.tsx", "export default function Card(){ return <div/> }"),
        ]);
        let imports = component_imports(&files);
        assert_eq!(
            imports,
            vec![ComponentImport {
                alias: "Card".to_string(),
                source: "./Card".to_string(),
            }]
        );
    }

    #[test]
    fn alias_is_title_identifier_of_stem_even_when_empty() {
        let files = set(&[
            ("/App.js", "export default function App(){}"),
            ("/ui/my-card.js", "export default function MyCard(){}"),
            ("/__.js", "export default function Blank(){}"),
        ]);
        let aliases: Vec<String> = component_imports(&files)
            .into_iter()
            .map(|import| import.alias)
            .collect();
        assert_eq!(aliases, vec!["MyCard".to_string(), String::new()]);
        assert!(synthesize_entry(&files, true)
            .content
            .contains("import  from \"./__\";"));
    }

    #[test]
    fn sandbox_view_replaces_entry_in_place_and_keeps_other_files() {
        let files = set(&[
            ("/App.js", "original"),
            ("/Header.js", "export default function Header(){}"),
        ]);
        let view = sandbox_view(&files, true);
        let keys: Vec<&str> = view.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/App.js", "/Header.js"]);
        assert!(view["/App.js"].contains("<Header />"));
        assert_eq!(files.get("/App.js"), Some("original"));
    }

    #[test]
    fn sandbox_view_always_contains_entry_path() {
        let files = set(&[("/Header.js", "plain text")]);
        for auto_render in [true, false] {
            let view = sandbox_view(&files, auto_render);
            assert!(view.contains_key(ENTRY_PATH), "auto_render: {auto_render}");
            assert_eq!(view.len(), 2);
        }
    }
}
