//! User script loading.
//!
//! Scripts are plain `.js` files placed directly inside a directory. Each
//! file becomes one [`ScriptPayload`] named after the file; its content is
//! sent to targets verbatim.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Extension of files treated as scripts.
pub const SCRIPT_EXTENSION: &str = "js";

// ============================================================================
// ScriptPayload
// ============================================================================

/// One user script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPayload {
    /// File name, used as display and log key.
    pub name: String,
    /// Code text, opaque to the injector.
    pub content: String,
}

impl ScriptPayload {
    /// Creates a payload.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Loads every script directly inside `dir`.
///
/// Symlinked scripts are followed; subdirectories are not descended into.
/// Scripts are returned sorted by file name; that order is the order they
/// are injected in.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if the directory or a script
/// cannot be read.
pub fn load_scripts(dir: impl AsRef<Path>) -> Result<Vec<ScriptPayload>> {
    let dir = dir.as_ref();
    let mut scripts = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !has_script_extension(&path) || !path.is_file() {
            continue;
        }

        let bytes = fs::read(&path)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let content = String::from_utf8_lossy(&bytes).into_owned();

        debug!(script = %name, bytes = bytes.len(), "Loaded script");
        scripts.push(ScriptPayload { name, content });
    }

    scripts.sort_by(|a, b| a.name.cmp(&b.name));

    if scripts.is_empty() {
        warn!(dir = %dir.display(), "No scripts found");
    }

    Ok(scripts)
}

/// Returns `true` if the path ends in `.js`.
fn has_script_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_loads_only_js_files_sorted() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("b.js"), "console.log('b');").expect("write");
        fs::write(dir.path().join("a.js"), "console.log('a');").expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");
        fs::write(dir.path().join("style.css"), "body {}").expect("write");

        let scripts = load_scripts(dir.path()).expect("load");

        assert_eq!(
            scripts,
            vec![
                ScriptPayload::new("a.js", "console.log('a');"),
                ScriptPayload::new("b.js", "console.log('b');"),
            ]
        );
    }

    #[test]
    fn test_does_not_descend_into_subdirectories() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested.js");
        fs::create_dir(&nested).expect("mkdir");
        fs::write(nested.join("inner.js"), "inner").expect("write");

        assert!(load_scripts(dir.path()).expect("load").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_script_is_loaded() {
        let dir = tempdir().expect("tempdir");
        let shared = tempdir().expect("tempdir");
        let source = shared.path().join("shared.js");
        fs::write(&source, "window.shared = true;").expect("write");
        std::os::unix::fs::symlink(&source, dir.path().join("linked.js")).expect("symlink");

        let scripts = load_scripts(dir.path()).expect("load");

        assert_eq!(
            scripts,
            vec![ScriptPayload::new("linked.js", "window.shared = true;")]
        );
    }

    #[test]
    fn test_content_is_verbatim() {
        let dir = tempdir().expect("tempdir");
        let source = "(() => {\r\n  const s = `tpl ${1}`;\n})();\n";
        fs::write(dir.path().join("x.js"), source).expect("write");

        let scripts = load_scripts(dir.path()).expect("load");
        assert_eq!(scripts[0].content, source);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = load_scripts(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_extension_match() {
        assert!(has_script_extension(Path::new("a.js")));
        assert!(has_script_extension(Path::new("A.JS")));
        assert!(!has_script_extension(Path::new("a.json")));
        assert!(!has_script_extension(Path::new("js")));
    }
}
