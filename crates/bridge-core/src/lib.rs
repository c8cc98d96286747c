//! Unity editor bridge
//!
//! Gives tools outside the editor a way to inspect a project and drive a
//! running editor:
//!
//! - **Project**: discovery, editor version, scene and script listings
//! - **Authoring**: template scripts and forced asset refresh
//! - **Scenes**: offline inspection via [`bridge_scene`]
//! - **Commands**: editor automation via [`bridge_channel`]
//!
//! Everything is reachable through [`Bridge::handle`], which maps any
//! [`ToolRequest`] to a [`ToolResponse`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod authoring;
pub mod config;
pub mod context;
pub mod error;
pub mod project;
pub mod templates;
pub mod tools;

pub use authoring::{create_script, force_refresh, RefreshReport, ScriptReport};
pub use config::{BridgeConfig, CONFIG_FILE, DEFAULT_CHANNEL_DIR};
pub use context::ProjectContext;
pub use error::{BridgeError, BridgeResult};
pub use project::{list_scenes, list_scripts, project_info, read_script, ProjectInfo, SceneEntry, ScriptEntry};
pub use tools::{Bridge, ResponseStatus, SceneFormat, ToolCall, ToolRequest, ToolResponse};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name reported to clients
pub const SERVER_NAME: &str = "unity-mcp";
