//! Build error types.

use rw_theme::ThemeError;

/// Error returned by the static site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Theme could not be loaded.
    #[error("{0}")]
    Theme(#[from] ThemeError),
    /// Template loading or rendering error.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    /// Page front matter is not valid YAML.
    #[error("Invalid front matter in {path}: {message}")]
    FrontMatter {
        /// Page source path.
        path: String,
        /// Parser message.
        message: String,
    },
}
