//! Target installation lookup.
//!
//! Squirrel-style installs keep one `app-X.Y.Z` directory per version under a
//! per-user root; the executable lives inside the newest one:
//!
//! ```text
//! <local data dir>/slack/
//! ├── app-4.9.3/slack.exe
//! └── app-4.10.0/slack.exe   ◄── picked
//! ```
//!
//! Versions compare component by component as integers, so `4.10.0` is newer
//! than `4.9.3`. When the root holds no usable install, well-known system
//! locations are tried in order.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default application name, used for the install root and executable.
pub const DEFAULT_APP_NAME: &str = "slack";

/// Matches versioned install directories.
static APP_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^app-(\d+(?:\.\d+)*)$").expect("app directory regex must compile")
});

// ============================================================================
// InstallLocator
// ============================================================================

/// Finds the target application's executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocator {
    /// Directory holding `app-X.Y.Z` subdirectories.
    root: PathBuf,
    /// Executable stem.
    app_name: String,
    /// Paths tried when the root has no install.
    fallbacks: Vec<PathBuf>,
}

impl InstallLocator {
    /// Creates a locator searching `root` for `app_name`.
    ///
    /// Well-known system locations for the current platform are used as
    /// fallbacks.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        Self {
            root: root.into(),
            fallbacks: system_fallbacks(&app_name),
            app_name,
        }
    }

    /// Creates a locator for `app_name` under the per-user data directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the platform has no local data directory.
    pub fn for_app(app_name: impl Into<String>) -> Result<Self> {
        let app_name = app_name.into();
        let root = dirs::data_local_dir()
            .ok_or_else(|| Error::config("No local data directory on this platform"))?
            .join(&app_name);
        Ok(Self::new(root, app_name))
    }

    /// Replaces the fallback paths.
    #[inline]
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: Vec<PathBuf>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Returns the searched root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locates the executable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstallNotFound`] if neither the newest versioned
    /// install nor any fallback contains the executable.
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(dir) = latest_app_dir(&self.root) {
            let exe = dir.join(executable_name(&self.app_name));
            if exe.is_file() {
                info!(path = %exe.display(), "Located target install");
                return Ok(exe);
            }
            debug!(path = %exe.display(), "Newest install has no executable");
        }

        if let Some(exe) = self.fallbacks.iter().find(|p| p.is_file()) {
            info!(path = %exe.display(), "Located target at system path");
            return Ok(exe.clone());
        }

        Err(Error::install_not_found(&self.root))
    }
}

// ============================================================================
// Binary Resolution
// ============================================================================

/// Returns the explicit binary if given, otherwise the located install.
///
/// # Errors
///
/// - [`Error::BinaryNotFound`] if `explicit` does not exist
/// - [`Error::InstallNotFound`] if location fails
pub fn resolve_binary(explicit: Option<&Path>, locator: &InstallLocator) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(Error::binary_not_found(path)),
        None => locator.locate(),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses the version of an `app-X.Y.Z` directory name.
#[must_use]
pub fn parse_app_version(name: &str) -> Option<Vec<u64>> {
    let captures = APP_DIR_RE.captures(name)?;
    captures[1]
        .split('.')
        .map(|part| part.parse().ok())
        .collect()
}

/// Returns the newest `app-X.Y.Z` directory under `root`.
fn latest_app_dir(root: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let version = parse_app_version(entry.file_name().to_str()?)?;
            Some((version, entry.path()))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, path)| path)
}

/// Returns the platform executable file name.
fn executable_name(app_name: &str) -> String {
    if cfg!(windows) {
        format!("{app_name}.exe")
    } else {
        app_name.to_string()
    }
}

/// Well-known install paths for the current platform.
fn system_fallbacks(app_name: &str) -> Vec<PathBuf> {
    if cfg!(target_os = "linux") {
        vec![
            PathBuf::from(format!("/usr/bin/{app_name}")),
            PathBuf::from(format!("/usr/lib/{app_name}/{app_name}")),
            PathBuf::from(format!("/snap/bin/{app_name}")),
        ]
    } else if cfg!(target_os = "macos") {
        let bundle = capitalize(app_name);
        vec![PathBuf::from(format!(
            "/Applications/{bundle}.app/Contents/MacOS/{bundle}"
        ))]
    } else {
        Vec::new()
    }
}

/// Uppercases the first character.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn install(root: &Path, dir: &str) -> PathBuf {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).expect("mkdir");
        let exe = dir.join(executable_name(DEFAULT_APP_NAME));
        fs::write(&exe, b"").expect("write");
        exe
    }

    #[test]
    fn test_new_keeps_root() {
        let root = Path::new("/opt/demo");
        assert_eq!(InstallLocator::new(root, "demo").root(), root);
    }

    fn locator(root: &Path) -> InstallLocator {
        InstallLocator::new(root, DEFAULT_APP_NAME).with_fallbacks(Vec::new())
    }

    #[test]
    fn test_parse_app_version() {
        assert_eq!(parse_app_version("app-4.10.0"), Some(vec![4, 10, 0]));
        assert_eq!(parse_app_version("app-12"), Some(vec![12]));
        assert_eq!(parse_app_version("app-"), None);
        assert_eq!(parse_app_version("app-4.x"), None);
        assert_eq!(parse_app_version("packages"), None);
    }

    #[test]
    fn test_picks_numerically_highest_version() {
        let root = tempdir().expect("tempdir");
        install(root.path(), "app-4.9.3");
        let newest = install(root.path(), "app-4.10.0");
        install(root.path(), "app-4.2.11");

        assert_eq!(locator(root.path()).locate().expect("locate"), newest);
    }

    #[test]
    fn test_ignores_non_version_directories() {
        let root = tempdir().expect("tempdir");
        let exe = install(root.path(), "app-1.0.0");
        fs::create_dir(root.path().join("packages")).expect("mkdir");
        fs::write(root.path().join("app-9.9.9"), b"file, not dir").expect("write");

        assert_eq!(locator(root.path()).locate().expect("locate"), exe);
    }

    #[test]
    fn test_missing_executable_falls_back() {
        let root = tempdir().expect("tempdir");
        fs::create_dir(root.path().join("app-5.0.0")).expect("mkdir");
        let fallback = root.path().join("fallback-bin");
        fs::write(&fallback, b"").expect("write");

        let found = locator(root.path())
            .with_fallbacks(vec![root.path().join("nope"), fallback.clone()])
            .locate()
            .expect("locate");

        assert_eq!(found, fallback);
    }

    #[test]
    fn test_nothing_found() {
        let root = tempdir().expect("tempdir");
        let err = locator(root.path()).locate().unwrap_err();
        assert!(matches!(err, Error::InstallNotFound { .. }));

        let err = locator(&root.path().join("missing")).locate().unwrap_err();
        assert!(matches!(err, Error::InstallNotFound { .. }));
    }

    #[test]
    fn test_resolve_binary_prefers_explicit() {
        let root = tempdir().expect("tempdir");
        let explicit = root.path().join("custom");
        fs::write(&explicit, b"").expect("write");

        let found = resolve_binary(Some(&explicit), &locator(root.path())).expect("resolve");
        assert_eq!(found, explicit);
    }

    #[test]
    fn test_resolve_binary_missing_explicit() {
        let root = tempdir().expect("tempdir");
        let missing = root.path().join("missing");

        let err = resolve_binary(Some(&missing), &locator(root.path())).unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound { .. }));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("slack"), "Slack");
        assert_eq!(capitalize(""), "");
    }
}
