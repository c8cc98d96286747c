//! Script authoring and forced asset refresh
//!
//! The editor only reimports when it notices a change under `Assets/`. A
//! refresh is forced by creating a throwaway script, giving the file watcher
//! a moment, then removing it again.

use crate::context::ProjectContext;
use crate::error::{BridgeError, BridgeResult};
use crate::templates::{self, REFRESH_TRIGGER_FILE};
use chrono::Local;
use serde::Serialize;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Result of [`create_script`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    /// Always true; failures are errors
    pub success: bool,
    /// Project-relative path of the new script
    pub script_path: String,
    /// Line count of the written source
    pub lines: usize,
    /// How the editor was told about the file
    pub auto_refresh: &'static str,
}

/// Result of [`force_refresh`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Always true; failures are errors
    pub success: bool,
    /// Constant `force_refresh`
    pub action: &'static str,
    /// Caller-supplied reason, echoed
    pub reason: String,
    /// RFC 3339 time the trigger was written
    pub timestamp: String,
}

/// Create a `MonoBehaviour` script under `Assets/<folder>/` and force a refresh
///
/// # Errors
/// - `BridgeError::InvalidArgument` for unusable names or folders escaping `Assets/`
/// - `BridgeError::AlreadyExists` if the script is already there
/// - `BridgeError::Io` on write failures
pub async fn create_script(
    context: &ProjectContext,
    name: &str,
    folder: &str,
    settle: Duration,
) -> BridgeResult<ScriptReport> {
    let class_name = templates::sanitize_class_name(name)
        .ok_or_else(|| BridgeError::InvalidArgument(format!("Invalid script name: {name}")))?;
    let dir = context.resolve_in_assets(folder)?;
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| BridgeError::io_error(&dir, e))?;

    let path = dir.join(format!("{class_name}.cs"));
    let script_path = context.relative(&path);
    let source = templates::mono_behaviour(&class_name);

    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(BridgeError::AlreadyExists {
                kind: "Script",
                path: script_path,
            });
        }
        Err(e) => return Err(BridgeError::io_error(&path, e)),
    };
    file.write_all(source.as_bytes())
        .await
        .map_err(|e| BridgeError::io_error(&path, e))?;
    file.flush()
        .await
        .map_err(|e| BridgeError::io_error(&path, e))?;
    drop(file);

    tracing::info!(script = %script_path, "created script");
    force_refresh(context, &format!("Created script: {class_name}"), settle).await?;

    Ok(ScriptReport {
        success: true,
        script_path,
        lines: source.lines().count(),
        auto_refresh: "forced",
    })
}

/// Write the refresh trigger, wait `settle`, delete it
///
/// # Errors
/// `BridgeError::Io` if the trigger cannot be written. Failing to delete it
/// afterwards is only logged.
pub async fn force_refresh(
    context: &ProjectContext,
    reason: &str,
    settle: Duration,
) -> BridgeResult<RefreshReport> {
    let now = Local::now();
    let trigger = context.assets().join(REFRESH_TRIGGER_FILE);
    tokio::fs::write(&trigger, templates::refresh_trigger(reason, now))
        .await
        .map_err(|e| BridgeError::io_error(&trigger, e))?;
    tracing::debug!(reason, "refresh trigger written");

    tokio::time::sleep(settle).await;

    if let Err(e) = tokio::fs::remove_file(&trigger).await {
        tracing::warn!(path = %trigger.display(), error = %e, "failed to remove refresh trigger");
    }

    Ok(RefreshReport {
        success: true,
        action: "force_refresh",
        reason: reason.to_string(),
        timestamp: now.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_test_utils::TempProject;

    const SETTLE: Duration = Duration::from_millis(5);

    fn project() -> (TempProject, ProjectContext) {
        let project = TempProject::new("2022.3.0f1").unwrap();
        let ctx = ProjectContext::open(project.root()).unwrap();
        (project, ctx)
    }

    #[tokio::test]
    async fn creates_sanitized_script() {
        let (project, ctx) = project();
        let report = create_script(&ctx, "Enemy AI!", "Scripts", SETTLE).await.unwrap();

        assert_eq!(report.script_path, "Assets/Scripts/EnemyAI.cs");
        assert_eq!(report.auto_refresh, "forced");
        let written = std::fs::read_to_string(project.root().join("Assets/Scripts/EnemyAI.cs")).unwrap();
        assert!(written.contains("public class EnemyAI : MonoBehaviour"));
        assert_eq!(report.lines, written.lines().count());
        assert!(!project.root().join("Assets").join(REFRESH_TRIGGER_FILE).exists());
    }

    #[tokio::test]
    async fn refuses_overwrite() {
        let (project, ctx) = project();
        project.write("Assets/Scripts/Player.cs", "// mine").unwrap();

        let err = create_script(&ctx, "Player", "Scripts", SETTLE).await.unwrap_err();
        assert_eq!(err.to_string(), "Script already exists: Assets/Scripts/Player.cs");
        let kept = std::fs::read_to_string(project.root().join("Assets/Scripts/Player.cs")).unwrap();
        assert_eq!(kept, "// mine");
    }

    #[tokio::test]
    async fn rejects_invalid_names_and_folders() {
        let (_project, ctx) = project();
        let err = create_script(&ctx, "3D", "Scripts", SETTLE).await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        let err = create_script(&ctx, "Ok", "../Outside", SETTLE).await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn refresh_cleans_up_trigger() {
        let (project, ctx) = project();
        let report = force_refresh(&ctx, "manual", SETTLE).await.unwrap();
        assert_eq!(report.action, "force_refresh");
        assert_eq!(report.reason, "manual");
        assert!(!project.root().join("Assets").join(REFRESH_TRIGGER_FILE).exists());
    }
}
