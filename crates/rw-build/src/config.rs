//! Resolved build configuration.

use std::path::PathBuf;
use std::sync::Arc;

use rw_config::Config;
use rw_theme::Theme;
use serde::Serialize;

use crate::error::BuildError;

/// Configuration for a single site build.
///
/// `theme` is the primary theme. Plugins may replace it while the
/// configuration hooks run; page rendering receives the effective theme
/// through [`PageContext`](crate::PageContext) instead.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site name exposed to templates.
    pub site_name: String,
    /// Markdown source directory.
    pub docs_dir: PathBuf,
    /// Output directory.
    pub site_dir: PathBuf,
    /// Write `page/index.html` instead of `page.html`.
    pub use_directory_urls: bool,
    /// Explicit navigation order as page source paths.
    pub nav: Option<Vec<String>>,
    /// Primary theme.
    pub theme: Arc<Theme>,
    /// Directories searched for installed themes.
    pub theme_search_dirs: Vec<PathBuf>,
    /// Names of the plugins registered with the builder, in hook order.
    pub plugins: Vec<String>,
}

/// Configuration values exposed to templates as `config`.
#[derive(Debug, Serialize)]
pub(crate) struct ConfigContext<'a> {
    site_name: &'a str,
    use_directory_urls: bool,
}

impl BuildConfig {
    /// Build configuration with defaults for everything but paths and theme.
    pub fn new(docs_dir: impl Into<PathBuf>, site_dir: impl Into<PathBuf>, theme: Theme) -> Self {
        Self {
            site_name: "Documentation".to_owned(),
            docs_dir: docs_dir.into(),
            site_dir: site_dir.into(),
            use_directory_urls: true,
            nav: None,
            theme: Arc::new(theme),
            theme_search_dirs: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Resolve the primary theme and paths from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Theme`] if the primary theme cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let search_dirs = config.themes_resolved.search_dirs.clone();
        let theme = Theme::load(&config.theme, &search_dirs)?;
        let site = &config.site_resolved;
        Ok(Self {
            site_name: site.site_name.clone(),
            docs_dir: config.docs_resolved.source_dir.clone(),
            site_dir: site.site_dir.clone(),
            use_directory_urls: site.use_directory_urls,
            nav: site.nav.clone(),
            theme: Arc::new(theme),
            theme_search_dirs: search_dirs,
            plugins: Vec::new(),
        })
    }

    pub(crate) fn context(&self) -> ConfigContext<'_> {
        ConfigContext {
            site_name: &self.site_name,
            use_directory_urls: self.use_directory_urls,
        }
    }
}
