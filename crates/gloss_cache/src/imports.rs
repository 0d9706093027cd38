//! Extraction of `@import` directives from stylesheet sources.
//!
//! Handles the directive forms shared by LESS, SCSS and Sass: quoted and
//! bare paths, the LESS `(reference)` and `(inline)` modifiers, and
//! comma-separated lists. `url(...)` imports are left to the browser and
//! never followed.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use gloss_common::StyleDialect;
use regex::Regex;

use crate::error::CacheError;

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@import\s*(url|\(reference\)|\(inline\))?\s*\(?([^;]+?)\)?;")
        .expect("import pattern is a valid regex")
});

/// Resolves the direct imports of a stylesheet to files on disk.
pub struct ImportParser;

impl ImportParser {
    /// Reads `path` and returns the files it directly imports.
    ///
    /// The result preserves first-seen order and contains each canonical
    /// path at most once. Imports that resolve to no existing file are
    /// dropped.
    pub fn parse_file(path: &Path) -> Result<Vec<PathBuf>, CacheError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| CacheError::from_read(path, e))?;
        Ok(Self::parse_source(path, &source))
    }

    /// Like [`ImportParser::parse_file`] but with the file contents supplied.
    ///
    /// `path` is still used to locate candidates relative to the importing
    /// file and to pick the extension tried for extensionless imports.
    pub fn parse_source(path: &Path, source: &str) -> Vec<PathBuf> {
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let extension = path.extension().and_then(|e| e.to_str());
        let dialect = StyleDialect::from_path(path);

        let mut resolved: Vec<PathBuf> = Vec::new();
        for line in source.lines() {
            if line.trim_start().starts_with("//") {
                continue;
            }
            for target in Self::import_targets(line) {
                let Some(found) = resolve_target(base_dir, &target, extension, dialect) else {
                    continue;
                };
                if !resolved.contains(&found) {
                    resolved.push(found);
                }
            }
        }
        resolved
    }

    /// Returns the raw import targets named on one line, unquoted.
    ///
    /// `url(...)` imports are excluded.
    pub fn import_targets(line: &str) -> Vec<String> {
        let mut targets = Vec::new();
        for caps in IMPORT_PATTERN.captures_iter(line) {
            if caps.get(1).is_some_and(|m| m.as_str() == "url") {
                continue;
            }
            let Some(args) = caps.get(2) else { continue };
            for arg in args.as_str().split(',') {
                let target = arg.trim().trim_matches(|c| c == '"' || c == '\'').trim();
                if !target.is_empty() {
                    targets.push(target.to_string());
                }
            }
        }
        targets
    }
}

/// Tries each candidate spelling of `target` and returns the first that is a
/// regular file, canonicalized.
fn resolve_target(
    base_dir: &Path,
    target: &str,
    extension: Option<&str>,
    dialect: Option<StyleDialect>,
) -> Option<PathBuf> {
    candidates(base_dir, target, extension, dialect)
        .into_iter()
        .filter(|candidate| candidate.is_file())
        .find_map(|candidate| std::fs::canonicalize(candidate).ok())
}

fn candidates(
    base_dir: &Path,
    target: &str,
    extension: Option<&str>,
    dialect: Option<StyleDialect>,
) -> Vec<PathBuf> {
    let mut out = vec![base_dir.join(target)];
    let Some(ext) = extension else { return out };
    out.push(base_dir.join(format!("{target}.{ext}")));

    if dialect.is_some_and(StyleDialect::supports_partials) {
        let target_path = Path::new(target);
        if let Some(name) = target_path.file_name().and_then(|n| n.to_str()) {
            let partial = format!("_{name}.{ext}");
            let dir = target_path.parent().unwrap_or_else(|| Path::new(""));
            out.push(base_dir.join(dir).join(partial));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn canon(p: &Path) -> PathBuf {
        fs::canonicalize(p).unwrap()
    }

    #[test]
    fn extracts_quoted_and_bare_targets() {
        assert_eq!(ImportParser::import_targets(r#"@import "base";"#), vec!["base"]);
        assert_eq!(ImportParser::import_targets("@import 'mixins.less';"), vec!["mixins.less"]);
        assert_eq!(ImportParser::import_targets("@import vars;"), vec!["vars"]);
    }

    #[test]
    fn less_modifiers_are_followed() {
        assert_eq!(
            ImportParser::import_targets(r#"@import (reference) "theme";"#),
            vec!["theme"]
        );
        assert_eq!(
            ImportParser::import_targets(r#"@import (inline) "raw.css";"#),
            vec!["raw.css"]
        );
    }

    #[test]
    fn url_imports_are_skipped() {
        assert!(ImportParser::import_targets(r#"@import url("http://fonts/x.css");"#).is_empty());
        assert!(ImportParser::import_targets("@import url(print.css);").is_empty());
    }

    #[test]
    fn comma_lists_split() {
        assert_eq!(
            ImportParser::import_targets(r#"@import "reset", 'grid',  layout;"#),
            vec!["reset", "grid", "layout"]
        );
    }

    #[test]
    fn lines_without_imports_yield_nothing() {
        assert!(ImportParser::import_targets("body { color: red; }").is_empty());
        assert!(ImportParser::import_targets("@import \"unterminated\"").is_empty());
    }

    #[test]
    fn resolves_literal_then_extension_then_partial() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("main.scss"), "").unwrap();
        fs::write(root.join("plain.css"), "").unwrap();
        fs::write(root.join("mixins.scss"), "").unwrap();
        fs::create_dir(root.join("lib")).unwrap();
        fs::write(root.join("lib/_vars.scss"), "").unwrap();

        let source = "@import \"plain.css\";\n@import \"mixins\";\n@import \"lib/vars\";\n";
        let found = ImportParser::parse_source(&root.join("main.scss"), source);
        assert_eq!(
            found,
            vec![
                canon(&root.join("plain.css")),
                canon(&root.join("mixins.scss")),
                canon(&root.join("lib/_vars.scss")),
            ]
        );
    }

    #[test]
    fn less_does_not_try_partials() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("_vars.less"), "").unwrap();

        let found = ImportParser::parse_source(&root.join("main.less"), "@import \"vars\";");
        assert!(found.is_empty());
    }

    #[test]
    fn sass_tries_partials() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("_colors.sass"), "").unwrap();

        let found = ImportParser::parse_source(&root.join("main.sass"), "@import \"colors\";");
        assert_eq!(found, vec![canon(&root.join("_colors.sass"))]);
    }

    #[test]
    fn commented_lines_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("old.less"), "").unwrap();

        let found =
            ImportParser::parse_source(&root.join("main.less"), "   // @import \"old\";\n");
        assert!(found.is_empty());
    }

    #[test]
    fn duplicate_spellings_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("parts")).unwrap();
        fs::write(root.join("parts/grid.less"), "").unwrap();

        let source = "@import \"parts/grid\";\n@import \"./parts/../parts/grid.less\";\n";
        let found = ImportParser::parse_source(&root.join("main.less"), source);
        assert_eq!(found, vec![canon(&root.join("parts/grid.less"))]);
    }

    #[test]
    fn directories_do_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("theme")).unwrap();

        let found = ImportParser::parse_source(&root.join("main.less"), "@import \"theme\";");
        assert!(found.is_empty());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImportParser::parse_file(&dir.path().join("missing.scss")).unwrap_err();
        assert!(matches!(err, CacheError::ResourceNotFound { .. }));
    }
}
