//! Testing utilities for the bridge workspace
//!
//! Shared test helpers, fixtures, and a simulated editor.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Small but realistic scene: camera, light, a parented player with a
/// script, two same-named enemies, an orphan transform and blocks that must
/// be skipped.
pub const SAMPLE_SCENE: &str = r"%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!29 &1
OcclusionCullingSettings:
  m_ObjectHideFlags: 0
  serializedVersion: 2
--- !u!1 &100
GameObject:
  m_ObjectHideFlags: 0
  m_Component:
  - component: {fileID: 101}
  - component: {fileID: 102}
  m_Layer: 0
  m_Name: Main Camera
  m_TagString: MainCamera
  m_IsActive: 1
--- !u!4 &101
Transform:
  m_GameObject: {fileID: 100}
  m_LocalRotation: {x: 0, y: 0, z: 0, w: 1}
  m_LocalPosition: {x: 0, y: 1, z: -10}
  m_LocalScale: {x: 1, y: 1, z: 1}
  m_Children: []
  m_Father: {fileID: 0}
--- !u!20 &102
Camera:
  m_GameObject: {fileID: 100}
  m_Enabled: 1
  field of view: 60
--- !u!1 &200
GameObject:
  m_Name: Player
  m_IsActive: 1
--- !u!4 &201
Transform:
  m_GameObject: {fileID: 200}
  m_LocalRotation: {x: 0, y: 0.7071068, z: 0, w: 0.7071068}
  m_LocalPosition:
    x: 2
    y: 0.5
  m_LocalScale: {x: 1, y: 1, z: 1}
  m_Children:
  - {fileID: 301}
  m_Father: {fileID: 0}
--- !u!114 &202
MonoBehaviour:
  m_ObjectHideFlags: 0
  m_GameObject: {fileID: 200}
  m_Enabled: 1
  m_Script: {fileID: 11500000, guid: 5f3a9c1e2b7d4e08a1c6f0b9d2e4a7c3, type: 3}
  m_EditorClassIdentifier:
  moveSpeed: 5
  jumpHeight: 1.25
--- !u!1 &300
GameObject:
  m_Name: Weapon
  m_IsActive: 0
--- !u!4 &301
Transform:
  m_GameObject: {fileID: 300}
  m_LocalPosition: {x: 0.3, y: 0, z: 0.5}
  m_Father: {fileID: 201}
--- !u!23 &302
MeshRenderer:
  m_GameObject: {fileID: 300}
  m_Enabled: 0
--- !u!1 &400
GameObject:
  m_Name: Enemy
--- !u!1 &401
GameObject:
  m_Name: Enemy
--- !u!4 &402
Transform:
  m_LocalPosition: {x: 9, y: 9, z: 9}
--- !u!108 &500
Light:
  m_GameObject: {fileID: 400}
  m_Enabled: 1
  m_Intensity: 1.5
--- !u!1
GameObject:
  m_Name: NoHandle
--- !u!1 &600
Transfrom:
  m_Name: Mangled
";

/// Builder for ad hoc scene documents
#[derive(Debug, Default, Clone)]
pub struct SceneDocBuilder {
    text: String,
}

impl SceneDocBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n".to_string(),
        }
    }

    #[must_use]
    pub fn entity(mut self, handle: i64, name: &str) -> Self {
        let _ = write!(
            self.text,
            "--- !u!1 &{handle}\nGameObject:\n  m_Name: {name}\n  m_IsActive: 1\n"
        );
        self
    }

    #[must_use]
    pub fn transform(mut self, handle: i64, owner: i64, parent: i64, children: &[i64]) -> Self {
        let _ = write!(
            self.text,
            "--- !u!4 &{handle}\nTransform:\n  m_GameObject: {{fileID: {owner}}}\n  m_Father: {{fileID: {parent}}}\n"
        );
        if children.is_empty() {
            self.text.push_str("  m_Children: []\n");
        } else {
            self.text.push_str("  m_Children:\n");
            for child in children {
                let _ = writeln!(self.text, "  - {{fileID: {child}}}");
            }
        }
        self
    }

    #[must_use]
    pub fn script(mut self, handle: i64, owner: i64, guid: &str) -> Self {
        let _ = write!(
            self.text,
            "--- !u!114 &{handle}\nMonoBehaviour:\n  m_GameObject: {{fileID: {owner}}}\n  m_Enabled: 1\n  m_Script: {{fileID: 11500000, guid: {guid}, type: 3}}\n"
        );
        self
    }

    /// Append raw text verbatim
    #[must_use]
    pub fn raw(mut self, text: &str) -> Self {
        self.text.push_str(text);
        if !text.ends_with('\n') {
            self.text.push('\n');
        }
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.text
    }
}

/// Temporary on-disk Unity project (`Assets/`, `ProjectSettings/`, `Packages/`)
#[derive(Debug)]
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    /// Create a project reporting the given editor version
    pub fn new(editor_version: &str) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("unity-project-").tempdir()?;
        std::fs::create_dir_all(dir.path().join("Assets"))?;
        std::fs::create_dir_all(dir.path().join("ProjectSettings"))?;
        std::fs::create_dir_all(dir.path().join("Packages"))?;
        std::fs::write(
            dir.path().join("ProjectSettings/ProjectVersion.txt"),
            format!("m_EditorVersion: {editor_version}\nm_EditorVersionWithRevision: {editor_version} (abc)\n"),
        )?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Simulated editor polling a channel directory
///
/// Each time the command file appears it is read and deleted, the line is
/// recorded, and `respond` decides what (if anything) to write back.
pub struct EditorStub {
    received: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl EditorStub {
    pub fn spawn<F>(command_file: PathBuf, result_file: PathBuf, respond: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + 'static,
    {
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);
        let task = tokio::spawn(async move {
            loop {
                if let Ok(line) = tokio::fs::read_to_string(&command_file).await {
                    let _ = tokio::fs::remove_file(&command_file).await;
                    if let Ok(mut log) = log.lock() {
                        log.push(line.clone());
                    }
                    if let Some(reply) = respond(&line) {
                        // Publish by rename so a poller never sees a half-written file.
                        let staging = result_file.with_extension("staging");
                        if tokio::fs::write(&staging, reply).await.is_ok() {
                            let _ = tokio::fs::rename(&staging, &result_file).await;
                        }
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        Self { received, task }
    }

    /// Command lines seen so far
    #[must_use]
    pub fn received(&self) -> Vec<String> {
        self.received.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Drop for EditorStub {
    fn drop(&mut self) {
        self.task.abort();
    }
}
