//! Theme error types.

use std::path::PathBuf;

/// Error returned when a theme cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// No theme directory with this name exists in any search directory.
    #[error("Theme not found: {name} (searched: {searched})")]
    NotFound {
        /// Theme name.
        name: String,
        /// Search directories, comma-separated.
        searched: String,
    },
    /// The configured `custom_dir` does not exist.
    #[error("Theme custom_dir not found: {}", .0.display())]
    CustomDirNotFound(PathBuf),
    /// Neither a name nor a `custom_dir` was given.
    #[error("Theme requires a name or custom_dir")]
    Unnamed,
    /// A theme extends itself, directly or transitively.
    #[error("Theme inheritance cycle at {0}")]
    InheritanceCycle(String),
    /// The theme manifest is malformed.
    #[error("Invalid theme manifest {}: {message}", .path.display())]
    Manifest {
        /// Manifest file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
