//! Error types for the bridge
//!
//! Provides error handling for:
//! - Project discovery and path resolution
//! - Script authoring and refresh triggers
//! - Scene loading and command channel failures

use bridge_channel::ChannelError;
use bridge_scene::SceneError;
use std::path::PathBuf;

/// Main bridge error type
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// No project found walking up from the start directory
    #[error("unity project not found from {0}")]
    ProjectNotFound(PathBuf),

    /// Directory exists but is not a project root
    #[error("not a unity project: {path} (missing {missing})")]
    NotAProject {
        /// Candidate root
        path: PathBuf,
        /// Missing sub-directory
        missing: &'static str,
    },

    /// Requested file does not exist
    #[error("{kind} not found: {path}")]
    NotFound {
        /// What was looked up (`Script`, `Scene`)
        kind: &'static str,
        /// Project-relative path
        path: String,
    },

    /// Refuses to overwrite an existing file
    #[error("{kind} already exists: {path}")]
    AlreadyExists {
        /// What was being created
        kind: &'static str,
        /// Project-relative path
        path: String,
    },

    /// Caller-supplied argument is unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("io error at {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Response data could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Scene loading failed
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Command channel failed
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}

impl BridgeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors caused by the request rather than the environment
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::InvalidArgument(_)
                | Self::Channel(
                    ChannelError::EmptyVerb
                        | ChannelError::InvalidVerb { .. }
                        | ChannelError::InvalidArgument { .. }
                )
        )
    }
}

/// Result alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = BridgeError::NotFound {
            kind: "Script",
            path: "Assets/Scripts/Missing.cs".to_string(),
        };
        assert_eq!(err.to_string(), "Script not found: Assets/Scripts/Missing.cs");
        assert!(err.is_caller_error());
    }

    #[test]
    fn already_exists_display() {
        let err = BridgeError::AlreadyExists {
            kind: "Script",
            path: "Assets/Scripts/Player.cs".to_string(),
        };
        assert_eq!(err.to_string(), "Script already exists: Assets/Scripts/Player.cs");
    }

    #[test]
    fn error_conversions() {
        let err: BridgeError = ChannelError::EmptyVerb.into();
        assert!(matches!(err, BridgeError::Channel(_)));
        assert!(err.is_caller_error());

        let err: BridgeError = ChannelError::InvalidVerb {
            verb: "play\nstop".to_string(),
        }
        .into();
        assert!(err.is_caller_error());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BridgeError = ChannelError::io_error("write command", "/tmp/command.txt", io).into();
        assert!(!err.is_caller_error());
    }
}
