//! Configuration management for RW.
//!
//! Parses `rw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.source_dir`
//! - `site.site_dir`
//! - `theme.custom_dir`
//! - `plugins.multi_theme.additional_themes[].theme.custom_dir`
//!
//! ## Themes
//!
//! The `[theme]` section selects the primary theme. Additional themes that
//! apply to a subset of pages are declared under `[plugins.multi_theme]`:
//!
//! ```toml
//! [theme]
//! name = "material"
//!
//! [[plugins.multi_theme.additional_themes]]
//! pages = ["special.md"]
//! theme = { name = "readthedocs" }
//! ```

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override site output directory.
    pub site_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Site output configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Primary theme.
    pub theme: ThemeConfig,
    /// Theme discovery configuration.
    themes: ThemesConfigRaw,
    /// Plugin configuration.
    pub plugins: PluginsConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved theme discovery configuration (set after loading).
    #[serde(skip)]
    pub themes_resolved: ThemesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
}

/// Raw site configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    site_dir: Option<String>,
    site_name: Option<String>,
    use_directory_urls: Option<bool>,
    nav: Option<Vec<String>>,
}

/// Resolved site output configuration.
#[derive(Debug)]
pub struct SiteConfig {
    /// Output directory for the generated site.
    pub site_dir: PathBuf,
    /// Site name exposed to templates.
    pub site_name: String,
    /// Whether pages are written as `page/index.html` (true) or `page.html`.
    pub use_directory_urls: bool,
    /// Explicit navigation order as page source paths (e.g., `"guide.md"`).
    pub nav: Option<Vec<String>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("site"),
            site_name: "Documentation".to_owned(),
            use_directory_urls: true,
            nav: None,
        }
    }
}

/// Theme selection, either as a bare name or a table.
///
/// Both forms are accepted:
///
/// ```toml
/// theme = "readthedocs"
/// theme = { name = "material", locale = "de", palette = "slate" }
/// ```
///
/// Keys other than the known ones are collected into [`ThemeConfig::options`]
/// and exposed to templates as theme options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "ThemeSpec")]
pub struct ThemeConfig {
    /// Name of an installed theme.
    pub name: Option<String>,
    /// Directory with template and asset overrides (searched before the theme).
    pub custom_dir: Option<PathBuf>,
    /// Theme locale.
    pub locale: Option<String>,
    /// Extra templates rendered to the site root.
    pub static_templates: Vec<String>,
    /// Free-form theme options.
    pub options: BTreeMap<String, toml::Value>,
}

impl ThemeConfig {
    /// Theme selection by name only.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match (&self.name, &self.custom_dir) {
            (None, None) => Err(ConfigError::Validation(format!(
                "{field} requires name or custom_dir"
            ))),
            (Some(name), _) => require_non_empty(name, &format!("{field}.name")),
            (None, Some(_)) => Ok(()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ThemeSpec {
    Name(String),
    Table(ThemeTable),
}

#[derive(Deserialize)]
struct ThemeTable {
    name: Option<String>,
    custom_dir: Option<String>,
    locale: Option<String>,
    #[serde(default)]
    static_templates: Vec<String>,
    #[serde(flatten)]
    options: BTreeMap<String, toml::Value>,
}

impl From<ThemeSpec> for ThemeConfig {
    fn from(spec: ThemeSpec) -> Self {
        match spec {
            ThemeSpec::Name(name) => Self::named(name),
            ThemeSpec::Table(table) => Self {
                name: table.name,
                custom_dir: table.custom_dir.map(PathBuf::from),
                locale: table.locale,
                static_templates: table.static_templates,
                options: table.options,
            },
        }
    }
}

/// Raw theme discovery configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ThemesConfigRaw {
    search_dirs: Option<Vec<String>>,
}

/// Resolved theme discovery configuration.
#[derive(Debug, Default)]
pub struct ThemesConfig {
    /// Directories searched for installed themes, in order.
    pub search_dirs: Vec<PathBuf>,
}

/// Plugin configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Per-page theme overlays. The plugin is active when this section exists.
    pub multi_theme: Option<MultiThemeConfig>,
}

/// Configuration for the per-page theme overlay plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiThemeConfig {
    /// Additional themes, in declaration order.
    #[serde(default)]
    pub additional_themes: Vec<AdditionalThemeConfig>,
}

/// A theme applied to an explicit list of pages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdditionalThemeConfig {
    /// Page source paths relative to the docs directory (e.g., `"special.md"`).
    #[serde(default)]
    pub pages: Vec<String>,
    /// Theme to render the pages with.
    pub theme: ThemeConfig,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.site_dir`").
        field: String,
        /// Error message (e.g., "${`SITE_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion, or validation fails.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(site_dir) = &settings.site_dir {
            self.site_resolved.site_dir.clone_from(site_dir);
        }
    }

    /// Additional themes declared for the multi-theme plugin.
    ///
    /// Empty when the plugin section is absent.
    pub fn additional_themes(&self) -> &[AdditionalThemeConfig] {
        self.plugins
            .multi_theme
            .as_ref()
            .map(|mt| mt.additional_themes.as_slice())
            .unwrap_or_default()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            site: SiteConfigRaw::default(),
            theme: ThemeConfig::default(),
            themes: ThemesConfigRaw::default(),
            plugins: PluginsConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
            },
            site_resolved: SiteConfig {
                site_dir: base.join("site"),
                ..SiteConfig::default()
            },
            themes_resolved: ThemesConfig {
                search_dirs: vec![base.join("themes")],
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.theme.validate("theme")?;
        self.validate_additional_themes()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site_resolved.site_name, "site.site_name")?;
        if let Some(nav) = &self.site_resolved.nav {
            for (i, entry) in nav.iter().enumerate() {
                require_non_empty(entry, &format!("site.nav[{i}]"))?;
            }
        }
        Ok(())
    }

    /// Validate additional theme declarations.
    fn validate_additional_themes(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.additional_themes().iter().enumerate() {
            let field = format!("plugins.multi_theme.additional_themes[{i}]");
            entry.theme.validate(&format!("{field}.theme"))?;
            for (j, page) in entry.pages.iter().enumerate() {
                require_non_empty(page, &format!("{field}.pages[{j}]"))?;
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(dir, "docs.source_dir")?);
        }
        if let Some(ref dir) = self.site.site_dir {
            self.site.site_dir = Some(expand::expand_env(dir, "site.site_dir")?);
        }
        expand_theme_dir(&mut self.theme, "theme")?;
        if let Some(multi_theme) = &mut self.plugins.multi_theme {
            for (i, entry) in multi_theme.additional_themes.iter_mut().enumerate() {
                let field = format!("plugins.multi_theme.additional_themes[{i}].theme");
                expand_theme_dir(&mut entry.theme, &field)?;
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
        };

        let defaults = SiteConfig::default();
        self.site_resolved = SiteConfig {
            site_dir: resolve(self.site.site_dir.as_deref(), "site"),
            site_name: self.site.site_name.clone().unwrap_or(defaults.site_name),
            use_directory_urls: self
                .site
                .use_directory_urls
                .unwrap_or(defaults.use_directory_urls),
            nav: self.site.nav.clone(),
        };

        self.themes_resolved = ThemesConfig {
            search_dirs: match &self.themes.search_dirs {
                Some(dirs) => dirs.iter().map(|d| config_dir.join(d)).collect(),
                None => vec![config_dir.join("themes")],
            },
        };

        resolve_theme_dir(&mut self.theme, config_dir);
        if let Some(multi_theme) = &mut self.plugins.multi_theme {
            for entry in &mut multi_theme.additional_themes {
                resolve_theme_dir(&mut entry.theme, config_dir);
            }
        }
    }
}

fn expand_theme_dir(theme: &mut ThemeConfig, field: &str) -> Result<(), ConfigError> {
    if let Some(dir) = &theme.custom_dir {
        let field = format!("{field}.custom_dir");
        let expanded = expand::expand_env(&dir.to_string_lossy(), &field)?;
        theme.custom_dir = Some(PathBuf::from(expanded));
    }
    Ok(())
}

fn resolve_theme_dir(theme: &mut ThemeConfig, config_dir: &Path) {
    if let Some(dir) = theme.custom_dir.take() {
        theme.custom_dir = Some(config_dir.join(dir));
    }
}
