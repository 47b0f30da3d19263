//! Theme manifest parsing.
//!
//! Every installed theme directory carries a YAML manifest describing the
//! theme it extends, the templates it renders to the site root, and default
//! option values.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ThemeError;

/// Manifest filename inside a theme directory.
pub const THEME_MANIFEST: &str = "mkdocs_theme.yml";

/// Parsed theme manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ThemeManifest {
    /// Parent theme whose directories are searched after this one.
    pub extends: Option<String>,
    /// Templates rendered to the site root.
    pub static_templates: Vec<String>,
    /// Default locale.
    pub locale: Option<String>,
    /// Remaining keys become theme option defaults.
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

impl ThemeManifest {
    /// Read the manifest from a theme directory.
    ///
    /// An empty manifest file is valid and yields defaults.
    pub(crate) fn load(theme_dir: &Path) -> Result<Self, ThemeError> {
        let path = theme_dir.join(THEME_MANIFEST);
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|e| ThemeError::Manifest {
            path,
            message: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(trimmed)
    }
}
