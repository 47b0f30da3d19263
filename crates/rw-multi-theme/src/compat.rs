//! Compatibility with plugins that only accept certain primary themes.

use std::sync::Arc;

use rw_build::BuildConfig;
use rw_theme::Theme;

/// Plugins that reject unknown primary themes, with the theme name they
/// accept.
pub const NARROW_THEME_PLUGINS: &[(&str, &str)] = &[("techdocs-core", "material")];

/// Temporarily renames the primary theme while configuration hooks run.
#[derive(Debug, Default)]
pub(crate) struct ThemeCoercion {
    original: Option<Arc<Theme>>,
}

impl ThemeCoercion {
    /// Rename the primary theme if a narrow-theme plugin is registered.
    ///
    /// Only the name changes; directories and options stay those of the
    /// real theme.
    pub(crate) fn apply(&mut self, config: &mut BuildConfig) {
        let Some((plugin, fallback)) = NARROW_THEME_PLUGINS
            .iter()
            .find(|(plugin, _)| config.plugins.iter().any(|p| p == plugin))
        else {
            return;
        };
        if config.theme.name() == *fallback {
            return;
        }

        tracing::debug!(
            plugin = %plugin,
            theme = config.theme.name(),
            fallback = %fallback,
            "Coercing primary theme name during configuration"
        );
        let coerced = Arc::new(config.theme.renamed(*fallback));
        self.original = Some(std::mem::replace(&mut config.theme, coerced));
    }

    /// Put back the theme replaced by [`apply`](Self::apply).
    pub(crate) fn restore(&mut self, config: &mut BuildConfig) {
        if let Some(original) = self.original.take() {
            tracing::debug!(theme = original.name(), "Restored primary theme");
            config.theme = original;
        }
    }
}
