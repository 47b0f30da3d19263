//! Additional themes and their template environments.

use std::path::PathBuf;
use std::sync::Arc;

use minijinja::Environment;
use rw_config::AdditionalThemeConfig;
use rw_theme::{Theme, ThemeError};

/// A loaded additional theme.
pub(crate) struct RegisteredTheme {
    pub(crate) theme: Arc<Theme>,
    pub(crate) env: Environment<'static>,
}

/// Additional themes in declaration order.
#[derive(Default)]
pub(crate) struct ThemeRegistry {
    themes: Vec<RegisteredTheme>,
}

impl ThemeRegistry {
    /// Load every declared theme and create its environment.
    pub(crate) fn load(
        declarations: &[AdditionalThemeConfig],
        search_dirs: &[PathBuf],
    ) -> Result<Self, ThemeError> {
        let themes = declarations
            .iter()
            .map(|declaration| {
                let theme = Theme::load(&declaration.theme, search_dirs)?;
                tracing::debug!(
                    theme = theme.name(),
                    pages = declaration.pages.len(),
                    "Loaded additional theme"
                );
                let env = theme.environment();
                Ok(RegisteredTheme {
                    theme: Arc::new(theme),
                    env,
                })
            })
            .collect::<Result<Vec<_>, ThemeError>>()?;
        Ok(Self { themes })
    }

    pub(crate) fn get(&self, index: usize) -> Option<&RegisteredTheme> {
        self.themes.get(index)
    }

    /// Environment of a registered theme, matched by identity rather than
    /// name. Declarations sharing a theme name keep separate entries.
    pub(crate) fn environment_for(&self, theme: &Arc<Theme>) -> Option<&Environment<'static>> {
        self.themes
            .iter()
            .find(|t| Arc::ptr_eq(&t.theme, theme))
            .map(|t| &t.env)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RegisteredTheme> {
        self.themes.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.themes.len()
    }
}
