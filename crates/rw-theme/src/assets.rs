//! Static asset filtering for theme directories.
//!
//! Theme directories mix copyable assets (stylesheets, scripts, images) with
//! files that must never land in the site output: template sources, Python
//! helpers, manifests, translations, and the theme's own static templates
//! (which are rendered, not copied).

use glob::{MatchOptions, Pattern};

use crate::manifest::THEME_MANIFEST;
use crate::theme::Theme;

/// File extensions treated as markdown sources.
pub const MARKDOWN_EXTENSIONS: &[&str] = &[".markdown", ".mdown", ".mkdn", ".mkd", ".md"];

/// Patterns excluded from every theme, matched against lowercased paths.
const EXCLUDED_PATTERNS: &[&str] = &[
    ".*",
    "*/.*",
    "*.py",
    "*.pyc",
    "*.html",
    "*readme*",
    "locales/*",
    "*/locales/*",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Decides whether a theme-relative path is a copyable static asset.
#[derive(Debug)]
pub struct AssetFilter {
    patterns: Vec<Pattern>,
}

impl AssetFilter {
    /// Filter for `theme`, excluding its static templates in addition to the
    /// common patterns.
    pub fn for_theme(theme: &Theme) -> Self {
        Self::with_static_templates(theme.static_templates())
    }

    /// Filter excluding the common patterns and the given static templates.
    pub fn with_static_templates(static_templates: &[String]) -> Self {
        let mut patterns: Vec<Pattern> = EXCLUDED_PATTERNS
            .iter()
            .map(|p| Pattern::new(p).expect("invalid glob pattern"))
            .collect();

        let manifest = Pattern::escape(THEME_MANIFEST);
        let literals = [manifest.clone(), format!("*/{manifest}")]
            .into_iter()
            .chain(
                MARKDOWN_EXTENSIONS
                    .iter()
                    .map(|ext| format!("*{}", Pattern::escape(ext))),
            )
            .chain(
                static_templates
                    .iter()
                    .map(|t| Pattern::escape(&t.to_lowercase())),
            );
        patterns.extend(literals.filter_map(|p| Pattern::new(&p).ok()));

        Self { patterns }
    }

    /// Whether `path` (relative, forward slashes) should be copied.
    pub fn is_asset(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        !self
            .patterns
            .iter()
            .any(|p| p.matches_with(&lower, MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> AssetFilter {
        AssetFilter::with_static_templates(&["404.html".to_owned(), "sitemap.xml".to_owned()])
    }

    #[test]
    fn test_plain_assets_pass() {
        let filter = filter();
        assert!(filter.is_asset("style.css"));
        assert!(filter.is_asset("css/theme.css"));
        assert!(filter.is_asset("js/app.js"));
        assert!(filter.is_asset("img/logo.png"));
        assert!(filter.is_asset("fonts/Roboto.woff2"));
    }

    #[test]
    fn test_dotfiles_excluded() {
        let filter = filter();
        assert!(!filter.is_asset(".gitignore"));
        assert!(!filter.is_asset(".git/config"));
        assert!(!filter.is_asset("css/.DS_Store"));
    }

    #[test]
    fn test_sources_excluded() {
        let filter = filter();
        assert!(!filter.is_asset("notes.py"));
        assert!(!filter.is_asset("__pycache__/theme.cpython-312.pyc"));
        assert!(!filter.is_asset("main.html"));
        assert!(!filter.is_asset("partials/header.HTML"));
    }

    #[test]
    fn test_readme_excluded_case_insensitive() {
        let filter = filter();
        assert!(!filter.is_asset("README.md"));
        assert!(!filter.is_asset("Readme.txt"));
        assert!(!filter.is_asset("docs/readme-images/shot.png"));
    }

    #[test]
    fn test_manifest_excluded_at_any_depth() {
        let filter = filter();
        assert!(!filter.is_asset("mkdocs_theme.yml"));
        assert!(!filter.is_asset("theme/mkdocs_theme.yml"));
        assert!(filter.is_asset("theme/config.yml"));
    }

    #[test]
    fn test_locales_excluded() {
        let filter = filter();
        assert!(!filter.is_asset("locales/en.json"));
        assert!(!filter.is_asset("locales/de/LC_MESSAGES/messages.mo"));
        assert!(!filter.is_asset("theme/locales/fr.json"));
        assert!(filter.is_asset("js/locales.js"));
    }

    #[test]
    fn test_markdown_excluded() {
        let filter = filter();
        assert!(!filter.is_asset("CHANGELOG.md"));
        assert!(!filter.is_asset("notes.markdown"));
        assert!(!filter.is_asset("docs/guide.MKD"));
    }

    #[test]
    fn test_static_templates_excluded() {
        let filter = filter();
        assert!(!filter.is_asset("sitemap.xml"));
        assert!(!filter.is_asset("SITEMAP.XML"));
        assert!(filter.is_asset("feeds/sitemap.xml.gz"));
    }

    #[test]
    fn test_static_template_with_glob_characters_is_literal() {
        let filter = AssetFilter::with_static_templates(&["[id].json".to_owned()]);
        assert!(!filter.is_asset("[id].json"));
        assert!(filter.is_asset("i.json"));
    }
}
