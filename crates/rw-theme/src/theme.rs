//! Theme descriptors.
//!
//! A [`Theme`] is resolved from a [`ThemeConfig`] by locating the named theme
//! in the search directories, following `extends` chains, and prepending the
//! optional `custom_dir`. The resulting ordered directory list is used both
//! for template lookup and for static asset discovery: earlier directories
//! win.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rw_config::ThemeConfig;
use serde::Serialize;

use crate::assets::AssetFilter;
use crate::error::ThemeError;
use crate::manifest::{THEME_MANIFEST, ThemeManifest};

/// Default theme locale.
const DEFAULT_LOCALE: &str = "en";

/// A resolved theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    dirs: Vec<PathBuf>,
    static_templates: Vec<String>,
    locale: String,
    options: BTreeMap<String, serde_json::Value>,
}

/// Theme values exposed to templates as `theme`.
#[derive(Debug, Serialize)]
pub struct ThemeContext<'a> {
    /// Theme name.
    pub name: &'a str,
    /// Theme locale.
    pub locale: &'a str,
    /// Merged theme options.
    pub options: &'a BTreeMap<String, serde_json::Value>,
}

impl Theme {
    /// Resolve a theme from configuration.
    ///
    /// Settings from `config` take precedence over manifest defaults, and a
    /// child theme's manifest takes precedence over its parents'.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::NotFound`] if a named theme (or one of its
    /// parents) is not installed, [`ThemeError::CustomDirNotFound`] if
    /// `custom_dir` is missing, and [`ThemeError::Manifest`] for malformed
    /// manifests.
    pub fn load(config: &ThemeConfig, search_dirs: &[PathBuf]) -> Result<Self, ThemeError> {
        let mut dirs = Vec::new();
        if let Some(custom_dir) = &config.custom_dir {
            if !custom_dir.is_dir() {
                return Err(ThemeError::CustomDirNotFound(custom_dir.clone()));
            }
            dirs.push(custom_dir.clone());
        }

        let mut static_templates = Vec::new();
        let mut options = BTreeMap::new();
        let mut manifest_locale = None;

        let mut next = config.name.clone();
        let mut seen = HashSet::new();
        while let Some(name) = next {
            if !seen.insert(name.clone()) {
                return Err(ThemeError::InheritanceCycle(name));
            }
            let dir = locate(&name, search_dirs)?;
            let manifest = ThemeManifest::load(&dir)?;
            tracing::debug!(theme = %name, dir = %dir.display(), "Resolved theme directory");
            dirs.push(dir);

            for template in manifest.static_templates {
                push_unique(&mut static_templates, template);
            }
            for (key, value) in manifest.options {
                if let Ok(value) = serde_json::to_value(value) {
                    options.entry(key).or_insert(value);
                }
            }
            manifest_locale = manifest_locale.or(manifest.locale);
            next = manifest.extends;
        }

        for template in &config.static_templates {
            push_unique(&mut static_templates, template.clone());
        }
        for (key, value) in &config.options {
            if let Ok(value) = serde_json::to_value(value) {
                options.insert(key.clone(), value);
            }
        }

        let name = match (&config.name, &config.custom_dir) {
            (Some(name), _) => name.clone(),
            (None, Some(custom_dir)) => custom_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            (None, None) => return Err(ThemeError::Unnamed),
        };

        let locale = config
            .locale
            .clone()
            .or(manifest_locale)
            .unwrap_or_else(|| DEFAULT_LOCALE.to_owned());

        Ok(Self {
            name,
            dirs,
            static_templates,
            locale,
            options,
        })
    }

    /// Build a theme directly from its parts.
    #[must_use]
    pub fn from_parts(name: impl Into<String>, dirs: Vec<PathBuf>, static_templates: Vec<String>) -> Self {
        Self {
            name: name.into(),
            dirs,
            static_templates,
            locale: DEFAULT_LOCALE.to_owned(),
            options: BTreeMap::new(),
        }
    }

    /// Copy of this theme reporting a different name.
    ///
    /// Directories, templates, and options are unchanged.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Theme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directories searched for templates and assets, highest precedence first.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Templates rendered to the site root rather than copied.
    pub fn static_templates(&self) -> &[String] {
        &self.static_templates
    }

    /// Theme locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Merged theme options.
    pub fn options(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.options
    }

    /// Values exposed to templates as `theme`.
    pub fn context(&self) -> ThemeContext<'_> {
        ThemeContext {
            name: &self.name,
            locale: &self.locale,
            options: &self.options,
        }
    }

    /// Relative paths of every static asset in the theme, sorted.
    ///
    /// Files from all theme directories are merged and passed through the
    /// theme's [`AssetFilter`]. Paths use forward slashes.
    pub fn asset_paths(&self) -> BTreeSet<String> {
        let filter = AssetFilter::for_theme(self);
        let mut paths = BTreeSet::new();
        for dir in &self.dirs {
            walk_dir(dir, dir, &mut paths);
        }
        paths.retain(|path| filter.is_asset(path));
        paths
    }

    /// First theme directory that contains `rel_path` as a regular file.
    pub fn find_asset_dir(&self, rel_path: &str) -> Option<&Path> {
        self.dirs
            .iter()
            .map(PathBuf::as_path)
            .find(|dir| dir.join(rel_path).is_file())
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Find the installed theme directory for `name`.
fn locate(name: &str, search_dirs: &[PathBuf]) -> Result<PathBuf, ThemeError> {
    search_dirs
        .iter()
        .map(|dir| dir.join(name))
        .find(|dir| dir.join(THEME_MANIFEST).is_file())
        .ok_or_else(|| ThemeError::NotFound {
            name: name.to_owned(),
            searched: search_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Recursively collect file paths under `dir`, relative to `base`.
fn walk_dir(base: &Path, dir: &Path, result: &mut BTreeSet<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_dir(base, &path, result);
        } else if let Ok(rel) = path.strip_prefix(base) {
            result.insert(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn install_theme(root: &Path, name: &str, manifest: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(THEME_MANIFEST), manifest).unwrap();
        dir
    }

    #[test]
    fn test_load_named_theme() {
        let root = tempfile::tempdir().unwrap();
        let dir = install_theme(root.path(), "material", "static_templates: [404.html]\n");

        let theme = Theme::load(
            &ThemeConfig::named("material"),
            &[root.path().to_path_buf()],
        )
        .unwrap();

        assert_eq!(theme.name(), "material");
        assert_eq!(theme.dirs(), &[dir]);
        assert_eq!(theme.static_templates(), &["404.html".to_owned()]);
        assert_eq!(theme.locale(), "en");
    }

    #[test]
    fn test_load_missing_theme() {
        let root = tempfile::tempdir().unwrap();
        let err = Theme::load(
            &ThemeConfig::named("nope"),
            &[root.path().to_path_buf()],
        )
        .unwrap_err();
        assert!(matches!(err, ThemeError::NotFound { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_load_searches_dirs_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        install_theme(second.path(), "readthedocs", "");
        let expected = install_theme(first.path(), "readthedocs", "");

        let theme = Theme::load(
            &ThemeConfig::named("readthedocs"),
            &[first.path().to_path_buf(), second.path().to_path_buf()],
        )
        .unwrap();

        assert_eq!(theme.dirs(), &[expected]);
    }

    #[test]
    fn test_extends_appends_parent_dirs_and_merges_manifest() {
        let root = tempfile::tempdir().unwrap();
        let parent = install_theme(
            root.path(),
            "base",
            "static_templates: [404.html]\nlocale: de\nnav_style: dark\ncollapse: true\n",
        );
        let child = install_theme(
            root.path(),
            "child",
            "extends: base\nstatic_templates: [sitemap.xml]\nnav_style: light\n",
        );

        let theme =
            Theme::load(&ThemeConfig::named("child"), &[root.path().to_path_buf()]).unwrap();

        assert_eq!(theme.dirs(), &[child, parent]);
        assert_eq!(
            theme.static_templates(),
            &["sitemap.xml".to_owned(), "404.html".to_owned()]
        );
        assert_eq!(theme.locale(), "de");
        assert_eq!(
            theme.options().get("nav_style"),
            Some(&serde_json::Value::from("light"))
        );
        assert_eq!(
            theme.options().get("collapse"),
            Some(&serde_json::Value::from(true))
        );
    }

    #[test]
    fn test_extends_cycle_is_error() {
        let root = tempfile::tempdir().unwrap();
        install_theme(root.path(), "a", "extends: b\n");
        install_theme(root.path(), "b", "extends: a\n");

        let err = Theme::load(&ThemeConfig::named("a"), &[root.path().to_path_buf()]).unwrap_err();

        assert!(matches!(err, ThemeError::InheritanceCycle(ref n) if n == "a"));
    }

    #[test]
    fn test_config_overrides_manifest() {
        let root = tempfile::tempdir().unwrap();
        install_theme(root.path(), "material", "locale: fr\npalette: default\n");
        let mut config = ThemeConfig::named("material");
        config.locale = Some("ja".to_owned());
        config.static_templates = vec!["robots.txt".to_owned()];
        config
            .options
            .insert("palette".to_owned(), toml::Value::from("slate"));

        let theme = Theme::load(&config, &[root.path().to_path_buf()]).unwrap();

        assert_eq!(theme.locale(), "ja");
        assert_eq!(theme.static_templates(), &["robots.txt".to_owned()]);
        assert_eq!(
            theme.options().get("palette"),
            Some(&serde_json::Value::from("slate"))
        );
    }
}
