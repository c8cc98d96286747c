//! Bridge configuration
//!
//! Defaults match the editor hooks' expectations. A project may override
//! them with `unity-bridge.toml` at its root; CLI flags override both.

use crate::context::ProjectContext;
use crate::error::{BridgeError, BridgeResult};
use bridge_channel::ChannelConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Config file name looked up at the project root
pub const CONFIG_FILE: &str = "unity-bridge.toml";

/// Default channel directory, relative to the project root
pub const DEFAULT_CHANNEL_DIR: &str = "Temp/UnityBridge";

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Channel directory; relative paths resolve against the project root
    pub channel_dir: PathBuf,
    /// Sleep between result checks, in milliseconds
    pub poll_interval_ms: u64,
    /// Sleeps before a command times out
    pub max_attempts: u32,
    /// How long the refresh trigger file stays on disk, in milliseconds
    pub refresh_settle_ms: u64,
    /// Default folder under `Assets/` for new scripts
    pub script_folder: String,
}

impl BridgeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With channel directory
    #[inline]
    #[must_use]
    pub fn with_channel_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.channel_dir = dir.into();
        self
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// With maximum attempts
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// With refresh settle time
    #[inline]
    #[must_use]
    pub fn with_refresh_settle_ms(mut self, ms: u64) -> Self {
        self.refresh_settle_ms = ms;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `BridgeError::Config` on malformed TOML or wrong field types.
    pub fn from_toml(text: &str) -> BridgeResult<Self> {
        toml::from_str(text).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Load `unity-bridge.toml` from the project root, or defaults if absent
    ///
    /// # Errors
    /// `BridgeError::Io` if the file exists but cannot be read;
    /// `BridgeError::Config` if it does not parse.
    pub fn load(context: &ProjectContext) -> BridgeResult<Self> {
        let path = context.root().join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loading bridge config");
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(BridgeError::io_error(path, e)),
        }
    }

    /// Refresh settle time
    #[inline]
    #[must_use]
    pub fn refresh_settle(&self) -> Duration {
        Duration::from_millis(self.refresh_settle_ms)
    }

    /// Channel configuration for a project
    #[must_use]
    pub fn channel_config(&self, context: &ProjectContext) -> ChannelConfig {
        let dir = if self.channel_dir.is_absolute() {
            self.channel_dir.clone()
        } else {
            context.root().join(&self.channel_dir)
        };
        ChannelConfig::new(dir)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_attempts(self.max_attempts)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_dir: PathBuf::from(DEFAULT_CHANNEL_DIR),
            poll_interval_ms: 500,
            max_attempts: 10,
            refresh_settle_ms: 100,
            script_folder: "Scripts".to_string(),
        }
    }
}
