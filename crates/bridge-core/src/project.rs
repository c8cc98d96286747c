//! Project metadata and asset listings

use crate::context::{ProjectContext, SETTINGS_DIR};
use crate::error::{BridgeError, BridgeResult};
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Reported when the editor version cannot be read
pub const UNKNOWN_VERSION: &str = "Unknown";

const VERSION_FILE: &str = "ProjectVersion.txt";
const VERSION_KEY: &str = "m_EditorVersion:";

/// Basic project facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    /// Absolute project root
    pub project_root: String,
    /// Root directory name
    pub project_name: String,
    /// Editor version the project was last saved with
    pub unity_version: String,
}

/// One scene document under `Assets/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneEntry {
    /// File stem
    pub name: String,
    /// Project-relative path
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// One script under `Assets/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptEntry {
    /// File stem
    pub name: String,
    /// Project-relative path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Containing folder relative to `Assets/` (`.` for `Assets/` itself)
    pub folder: String,
}

/// Read project facts; never fails, missing data becomes [`UNKNOWN_VERSION`]
#[must_use]
pub fn project_info(context: &ProjectContext) -> ProjectInfo {
    let version_path = context.root().join(SETTINGS_DIR).join(VERSION_FILE);
    let unity_version = std::fs::read_to_string(&version_path)
        .ok()
        .and_then(|text| editor_version(&text))
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
    ProjectInfo {
        project_root: context.root().display().to_string(),
        project_name: context.name(),
        unity_version,
    }
}

fn editor_version(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(VERSION_KEY))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// All `*.unity` files under `Assets/`, sorted by path
#[must_use]
pub fn list_scenes(context: &ProjectContext) -> Vec<SceneEntry> {
    let mut scenes: Vec<SceneEntry> = assets_with_extension(context, "unity")
        .map(|(path, size)| SceneEntry {
            name: stem(&path),
            path: context.relative(&path),
            size,
        })
        .collect();
    scenes.sort_by(|a, b| a.path.cmp(&b.path));
    scenes
}

/// All `*.cs` files under `Assets/`, sorted by path
#[must_use]
pub fn list_scripts(context: &ProjectContext) -> Vec<ScriptEntry> {
    let assets = context.assets();
    let mut scripts: Vec<ScriptEntry> = assets_with_extension(context, "cs")
        .map(|(path, size)| {
            let folder = path
                .parent()
                .and_then(|p| p.strip_prefix(&assets).ok())
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| ".".to_string());
            ScriptEntry {
                name: stem(&path),
                path: context.relative(&path),
                size,
                folder,
            }
        })
        .collect();
    scripts.sort_by(|a, b| a.path.cmp(&b.path));
    scripts
}

/// Read a script by project-relative path
///
/// # Errors
/// - `BridgeError::InvalidArgument` if the path escapes the project
/// - `BridgeError::NotFound` if there is no such file
/// - `BridgeError::Io` for other read failures
pub async fn read_script(context: &ProjectContext, relative: &str) -> BridgeResult<String> {
    let path = context.resolve(relative)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BridgeError::NotFound {
            kind: "Script",
            path: relative.to_string(),
        }),
        Err(e) => Err(BridgeError::io_error(path, e)),
    }
}

fn assets_with_extension(
    context: &ProjectContext,
    extension: &'static str,
) -> impl Iterator<Item = (std::path::PathBuf, u64)> {
    WalkDir::new(context.assets())
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| entry.path().extension().and_then(|e| e.to_str()) == Some(extension))
        .map(|entry| {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (entry.into_path(), size)
        })
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
