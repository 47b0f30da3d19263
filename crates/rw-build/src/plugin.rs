//! Build plugin hooks.
//!
//! Plugins observe and adjust the build at fixed points. [`StaticSiteBuilder`]
//! runs the hooks in this order, visiting plugins by descending
//! [`Plugin::priority`] (registration order breaks ties):
//!
//! 1. [`on_config`](Plugin::on_config), then
//!    [`on_config_finalized`](Plugin::on_config_finalized) once every plugin
//!    has seen the configuration
//! 2. [`on_files`](Plugin::on_files)
//! 3. [`on_nav`](Plugin::on_nav)
//! 4. [`on_env`](Plugin::on_env), after the primary theme's static
//!    templates are written
//! 5. per page: [`on_page_context`](Plugin::on_page_context),
//!    [`on_page_template`](Plugin::on_page_template),
//!    [`on_post_page`](Plugin::on_post_page)
//!
//! [`StaticSiteBuilder`]: crate::StaticSiteBuilder

use std::sync::Arc;

use minijinja::{Environment, Template};
use rw_theme::Theme;

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::files::Files;
use crate::nav::Navigation;
use crate::page::Page;

/// Per-page render state.
///
/// Created fresh for every page with the primary theme and the page's
/// requested template; dropped once the page is written.
#[derive(Debug)]
pub struct PageContext<'a> {
    page: &'a Page,
    /// Theme the page renders under.
    pub theme: Arc<Theme>,
    /// Template name to render.
    pub template_name: String,
}

impl<'a> PageContext<'a> {
    /// Context rendering `page` under `theme`.
    pub fn new(page: &'a Page, theme: Arc<Theme>) -> Self {
        Self {
            page,
            theme,
            template_name: page.template_name().to_owned(),
        }
    }

    /// Page being rendered.
    pub fn page(&self) -> &'a Page {
        self.page
    }
}

/// A build plugin.
///
/// All hooks default to no-ops.
pub trait Plugin {
    /// Plugin name, recorded in [`BuildConfig::plugins`].
    fn name(&self) -> &str;

    /// Hook ordering. Higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    /// Adjust configuration before other plugins see it finalized.
    fn on_config(&mut self, _config: &mut BuildConfig) -> Result<(), BuildError> {
        Ok(())
    }

    /// Runs after every plugin's [`on_config`](Self::on_config).
    fn on_config_finalized(&mut self, _config: &mut BuildConfig) -> Result<(), BuildError> {
        Ok(())
    }

    /// Adjust the output file set.
    fn on_files(&mut self, _files: &mut Files, _config: &BuildConfig) -> Result<(), BuildError> {
        Ok(())
    }

    /// Observe the finished navigation.
    fn on_nav(
        &mut self,
        _nav: &Arc<Navigation>,
        _config: &BuildConfig,
        _files: &Files,
    ) -> Result<(), BuildError> {
        Ok(())
    }

    /// Adjust the primary template environment or write extra outputs.
    fn on_env(
        &mut self,
        _env: &mut Environment<'static>,
        _config: &BuildConfig,
        _files: &mut Files,
    ) -> Result<(), BuildError> {
        Ok(())
    }

    /// Adjust the page's render context (theme, template name).
    fn on_page_context(&self, _ctx: &mut PageContext<'_>, _config: &BuildConfig) {}

    /// Supply the page's template instead of the primary environment.
    ///
    /// The first plugin returning `Some` wins.
    fn on_page_template<'a>(
        &'a self,
        _ctx: &PageContext<'_>,
    ) -> Result<Option<Template<'a, 'a>>, BuildError> {
        Ok(None)
    }

    /// Post-process rendered page HTML.
    fn on_post_page(
        &self,
        output: String,
        _page: &Page,
        _config: &BuildConfig,
    ) -> Result<String, BuildError> {
        Ok(output)
    }
}
