//! Error types for scene inspection
//!
//! Parsing itself never fails; malformed blocks are skipped and counted.
//! Errors only come from reading a document off disk.

use std::path::PathBuf;

/// Errors while loading a scene document
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// File is not a scene document this parser reads
    #[error("unsupported scene extension: '{0}'")]
    UnsupportedExtension(String),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl SceneError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for scene loading
pub type SceneResult<T> = Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = SceneError::io_error(
            "Assets/Main.unity",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("Assets/Main.unity"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn extension_error_display() {
        let err = SceneError::UnsupportedExtension("txt".to_string());
        assert_eq!(err.to_string(), "unsupported scene extension: 'txt'");
    }
}
