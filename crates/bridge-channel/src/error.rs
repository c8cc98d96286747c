//! Error types for the command channel
//!
//! Success, failure and timeout are outcomes, not errors. Errors are reserved
//! for commands that cannot be written and filesystem operations that fail.

use std::path::PathBuf;

/// Channel errors
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Command has no verb
    #[error("command verb is empty")]
    EmptyVerb,

    /// Verb would corrupt the single-line wire format
    #[error("verb contains a delimiter or line break: {verb:?}")]
    InvalidVerb {
        /// Offending verb
        verb: String,
    },

    /// Argument would corrupt the single-line wire format
    #[error("argument {index} of '{verb}' contains a delimiter or line break: {argument:?}")]
    InvalidArgument {
        /// Command verb
        verb: String,
        /// Zero-based argument position
        index: usize,
        /// Offending argument
        argument: String,
    },

    /// Filesystem operation failed
    #[error("{op} failed for {path}: {source}")]
    Io {
        /// Operation name (`create channel dir`, `write command`, ...)
        op: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ChannelError {
    /// Create IO error for an operation on a path
    pub fn io_error(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Result alias for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_op_and_path() {
        let err = ChannelError::io_error(
            "write command",
            "/tmp/chan/command.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "write command failed for /tmp/chan/command.txt: denied"
        );
    }

    #[test]
    fn invalid_argument_display() {
        let err = ChannelError::InvalidArgument {
            verb: "delete_gameobject".to_string(),
            index: 0,
            argument: "a|b".to_string(),
        };
        assert!(err.to_string().contains("argument 0 of 'delete_gameobject'"));
    }

    #[test]
    fn invalid_verb_display_has_no_index() {
        let err = ChannelError::InvalidVerb {
            verb: "a|b".to_string(),
        };
        assert_eq!(err.to_string(), "verb contains a delimiter or line break: \"a|b\"");
    }
}
