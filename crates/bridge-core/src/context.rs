//! Project context
//!
//! The project root is resolved once, by a fallible constructor, and passed
//! to everything that touches project files.

use crate::error::{BridgeError, BridgeResult};
use std::path::{Component, Path, PathBuf};

/// Sub-directory holding project assets
pub const ASSETS_DIR: &str = "Assets";
/// Sub-directory holding project settings
pub const SETTINGS_DIR: &str = "ProjectSettings";
/// Sub-directory holding package manifests
pub const PACKAGES_DIR: &str = "Packages";

/// A validated Unity project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    root: PathBuf,
}

impl ProjectContext {
    /// Open a project at `root`
    ///
    /// # Errors
    /// `BridgeError::NotAProject` unless both `Assets/` and
    /// `ProjectSettings/` exist.
    pub fn open(root: impl Into<PathBuf>) -> BridgeResult<Self> {
        let root = root.into();
        for missing in [ASSETS_DIR, SETTINGS_DIR] {
            if !root.join(missing).is_dir() {
                return Err(BridgeError::NotAProject {
                    path: root,
                    missing,
                });
            }
        }
        Ok(Self { root })
    }

    /// Find the nearest project root at or above `start`
    ///
    /// # Errors
    /// `BridgeError::ProjectNotFound` if no ancestor qualifies.
    pub fn discover(start: impl AsRef<Path>) -> BridgeResult<Self> {
        let start = start.as_ref();
        let absolute = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
        absolute
            .ancestors()
            .find_map(|candidate| Self::open(candidate).ok())
            .ok_or_else(|| BridgeError::ProjectNotFound(start.to_path_buf()))
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `Assets/`
    #[inline]
    #[must_use]
    pub fn assets(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    /// `ProjectSettings/`
    #[inline]
    #[must_use]
    pub fn project_settings(&self) -> PathBuf {
        self.root.join(SETTINGS_DIR)
    }

    /// `Packages/`
    #[inline]
    #[must_use]
    pub fn packages(&self) -> PathBuf {
        self.root.join(PACKAGES_DIR)
    }

    /// Project directory name
    #[must_use]
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Resolve a project-relative path, refusing anything that escapes the root
    ///
    /// # Errors
    /// `BridgeError::InvalidArgument` for absolute paths or `..` components.
    pub fn resolve(&self, relative: &str) -> BridgeResult<PathBuf> {
        Ok(self.root.join(checked_relative(relative)?))
    }

    /// Resolve a path relative to `Assets/`
    ///
    /// # Errors
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_in_assets(&self, relative: &str) -> BridgeResult<PathBuf> {
        Ok(self.assets().join(checked_relative(relative)?))
    }

    /// Render `path` relative to the root with forward slashes
    #[must_use]
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn checked_relative(relative: &str) -> BridgeResult<PathBuf> {
    let path = Path::new(relative.trim());
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(BridgeError::InvalidArgument(format!(
                    "path must stay inside the project: {relative}"
                )));
            }
        }
    }
    Ok(clean)
}
