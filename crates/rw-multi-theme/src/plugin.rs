//! Theme overlay plugin.

use std::sync::Arc;

use minijinja::{Environment, Template};
use rw_build::{
    BuildConfig, BuildError, Files, Navigation, PageContext, Plugin, build_theme_template,
};
use rw_config::MultiThemeConfig;

use crate::assets::collect_assets;
use crate::compat::ThemeCoercion;
use crate::registry::ThemeRegistry;
use crate::router::PageRouter;

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "multi_theme";

/// Runs before default-priority plugins so the coerced theme name is in
/// place when they read the configuration.
const PRIORITY: i32 = 100;

/// Renders listed pages under additional themes.
pub struct MultiThemePlugin {
    config: MultiThemeConfig,
    coercion: ThemeCoercion,
    registry: ThemeRegistry,
    router: PageRouter,
    nav: Option<Arc<Navigation>>,
}

impl MultiThemePlugin {
    /// Create the plugin. Themes are loaded when the build starts.
    pub fn new(config: MultiThemeConfig) -> Self {
        Self {
            config,
            coercion: ThemeCoercion::default(),
            registry: ThemeRegistry::default(),
            router: PageRouter::default(),
            nav: None,
        }
    }
}

impl Plugin for MultiThemePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn on_config(&mut self, config: &mut BuildConfig) -> Result<(), BuildError> {
        self.coercion.apply(config);
        self.registry =
            ThemeRegistry::load(&self.config.additional_themes, &config.theme_search_dirs)?;
        self.router = PageRouter::new(&self.config.additional_themes);
        tracing::info!(
            themes = self.registry.len(),
            pages = self.router.len(),
            "Additional themes configured"
        );
        Ok(())
    }

    fn on_config_finalized(&mut self, config: &mut BuildConfig) -> Result<(), BuildError> {
        self.coercion.restore(config);
        Ok(())
    }

    fn on_files(&mut self, files: &mut Files, config: &BuildConfig) -> Result<(), BuildError> {
        collect_assets(&self.registry, files, config);
        Ok(())
    }

    fn on_nav(
        &mut self,
        nav: &Arc<Navigation>,
        _config: &BuildConfig,
        _files: &Files,
    ) -> Result<(), BuildError> {
        self.nav = Some(Arc::clone(nav));
        Ok(())
    }

    fn on_env(
        &mut self,
        _env: &mut Environment<'static>,
        config: &BuildConfig,
        files: &mut Files,
    ) -> Result<(), BuildError> {
        let empty = Navigation::default();
        let nav = self.nav.as_deref().unwrap_or(&empty);
        for registered in self.registry.iter() {
            for name in registered.theme.static_templates() {
                build_theme_template(name, &registered.env, files, config, nav)?;
            }
        }
        Ok(())
    }

    fn on_page_context(&self, ctx: &mut PageContext<'_>, _config: &BuildConfig) {
        let Some(registered) = self
            .router
            .route(ctx.page().src_uri())
            .and_then(|index| self.registry.get(index))
        else {
            return;
        };
        tracing::debug!(
            page = ctx.page().src_uri(),
            theme = registered.theme.name(),
            "Rendering page with additional theme"
        );
        ctx.theme = Arc::clone(&registered.theme);
    }

    fn on_page_template<'a>(
        &'a self,
        ctx: &PageContext<'_>,
    ) -> Result<Option<Template<'a, 'a>>, BuildError> {
        let Some(env) = self.registry.environment_for(&ctx.theme) else {
            return Ok(None);
        };
        Ok(Some(env.get_template(&ctx.template_name)?))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use rw_build::{Page, StaticSiteBuilder};
    use rw_config::{AdditionalThemeConfig, ThemeConfig};
    use rw_theme::{THEME_MANIFEST, Theme};

    use super::*;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    struct Site {
        root: tempfile::TempDir,
    }

    impl Site {
        fn new() -> Self {
            let site = Self {
                root: tempfile::tempdir().unwrap(),
            };
            site.install_theme(
                "material",
                "static_templates: [404.html]\n",
                "material|{{ theme.name }}|{{ page.title }}|{{ config.site_name }}",
            );
            site.install_theme(
                "readthedocs",
                "static_templates: [404.html, sitemap.xml]\n",
                "readthedocs|{{ theme.name }}|{{ page.title }}",
            );
            site.write("docs/index.md", "# Home page");
            site.write("docs/special.md", "# Special page");
            site
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.root.path().join(rel)
        }

        fn write(&self, rel: &str, content: &str) {
            write(&self.path(rel), content);
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.path(rel)).unwrap()
        }

        fn install_theme(&self, name: &str, manifest: &str, main: &str) {
            self.write(&format!("themes/{name}/{THEME_MANIFEST}"), manifest);
            self.write(&format!("themes/{name}/main.html"), main);
            self.write(&format!("themes/{name}/404.html"), &format!("{name} 404"));
        }

        fn build_config(&self, primary: &str) -> BuildConfig {
            let search_dirs = vec![self.path("themes")];
            let theme = Theme::load(&ThemeConfig::named(primary), &search_dirs).unwrap();
            let mut config = BuildConfig::new(self.path("docs"), self.path("site"), theme);
            config.theme_search_dirs = search_dirs;
            config
        }
    }

    fn plugin(declarations: &[(&str, &[&str])]) -> MultiThemePlugin {
        MultiThemePlugin::new(MultiThemeConfig {
            additional_themes: declarations
                .iter()
                .map(|(theme, pages)| AdditionalThemeConfig {
                    pages: pages.iter().map(|p| (*p).to_owned()).collect(),
                    theme: ThemeConfig::named(*theme),
                })
                .collect(),
        })
    }

    #[test]
    fn test_listed_page_renders_with_additional_theme() {
        let site = Site::new();
        let mut builder = StaticSiteBuilder::new(site.build_config("material"))
            .with_plugin(plugin(&[("readthedocs", &["special.md"])]));

        builder.build().unwrap();

        assert_eq!(
            site.read("site/index.html"),
            "material|material|Home page|Documentation"
        );
        assert_eq!(
            site.read("site/special/index.html"),
            "readthedocs|readthedocs|Special page"
        );
        assert_eq!(builder.config().theme.name(), "material");
    }

    #[test]
    fn test_primary_static_templates_win() {
        let site = Site::new();
        site.write("themes/readthedocs/sitemap.xml", "<urlset>{{ nav.items|length }}</urlset>");
        let mut builder = StaticSiteBuilder::new(site.build_config("material"))
            .with_plugin(plugin(&[("readthedocs", &["special.md"])]));

        let report = builder.build().unwrap();

        assert_eq!(site.read("site/404.html"), "material 404");
        assert_eq!(site.read("site/sitemap.xml"), "<urlset>2</urlset>");
        assert_eq!(report.generated, 2);
    }

    #[test]
    fn test_primary_static_template_beats_additional_asset() {
        let site = Site::new();
        site.write(
            &format!("themes/material/{THEME_MANIFEST}"),
            "static_templates: [404.html, sitemap.xml]\n",
        );
        site.write("themes/material/sitemap.xml", "PRIMARY {{ nav.items|length }}");
        site.write(&format!("themes/readthedocs/{THEME_MANIFEST}"), "");
        site.write("themes/readthedocs/sitemap.xml", "RTD STATIC ASSET");
        let mut builder = StaticSiteBuilder::new(site.build_config("material"))
            .with_plugin(plugin(&[("readthedocs", &["special.md"])]));

        builder.build().unwrap();

        assert_eq!(site.read("site/sitemap.xml"), "PRIMARY 2");
    }

    #[test]
    fn test_additional_theme_assets_copied_without_clobbering() {
        let site = Site::new();
        site.write("themes/material/css/theme.css", "material css");
        site.write("themes/readthedocs/css/theme.css", "readthedocs css");
        site.write("themes/readthedocs/style.css", "rtd style");
        site.write("themes/readthedocs/theme/mkdocs_theme.yml", "");
        site.write("themes/readthedocs/locales/en.json", "{}");
        let mut builder = StaticSiteBuilder::new(site.build_config("material"))
            .with_plugin(plugin(&[("readthedocs", &["special.md"])]));

        builder.build().unwrap();

        assert_eq!(site.read("site/css/theme.css"), "material css");
        assert_eq!(site.read("site/style.css"), "rtd style");
        assert!(!site.path("site/theme/mkdocs_theme.yml").exists());
        assert!(!site.path("site/locales/en.json").exists());
    }

    #[test]
    fn test_first_declaration_wins() {
        let site = Site::new();
        site.install_theme("mkdocs", "", "mkdocs|{{ page.title }}");
        let mut builder = StaticSiteBuilder::new(site.build_config("material")).with_plugin(
            plugin(&[
                ("readthedocs", &["./special.md"]),
                ("mkdocs", &["special.md"]),
            ]),
        );

        builder.build().unwrap();

        assert_eq!(
            site.read("site/special/index.html"),
            "readthedocs|readthedocs|Special page"
        );
    }

    #[test]
    fn test_front_matter_template_resolved_in_page_theme() {
        let site = Site::new();
        site.write(
            "docs/special.md",
            "---\ntemplate: landing.html\n---\n# Special page",
        );
        site.write("themes/readthedocs/landing.html", "rtd landing|{{ page.title }}");
        let mut builder = StaticSiteBuilder::new(site.build_config("material"))
            .with_plugin(plugin(&[("readthedocs", &["special.md"])]));

        builder.build().unwrap();

        assert_eq!(
            site.read("site/special/index.html"),
            "rtd landing|Special page"
        );
    }

    #[test]
    fn test_missing_additional_theme_fails_build() {
        let site = Site::new();
        let mut builder = StaticSiteBuilder::new(site.build_config("material"))
            .with_plugin(plugin(&[("missing", &["special.md"])]));

        let err = builder.build().unwrap_err();

        assert!(matches!(err, BuildError::Theme(_)));
    }

    /// Stands in for a plugin that only accepts some primary themes.
    struct NarrowPlugin {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Plugin for NarrowPlugin {
        fn name(&self) -> &str {
            "techdocs-core"
        }

        fn on_config(&mut self, config: &mut BuildConfig) -> Result<(), BuildError> {
            self.seen
                .borrow_mut()
                .push(format!("config:{}", config.theme.name()));
            Ok(())
        }

        fn on_post_page(
            &self,
            output: String,
            page: &Page,
            config: &BuildConfig,
        ) -> Result<String, BuildError> {
            self.seen
                .borrow_mut()
                .push(format!("{}:{}", page.src_uri(), config.theme.name()));
            Ok(output)
        }
    }

    #[test]
    fn test_theme_coerced_for_narrow_plugin_then_restored() {
        let site = Site::new();
        site.install_theme("custom", "", "custom|{{ theme.name }}");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut builder = StaticSiteBuilder::new(site.build_config("custom"))
            .with_plugin(NarrowPlugin {
                seen: Rc::clone(&seen),
            })
            .with_plugin(plugin(&[("readthedocs", &["special.md"])]));

        builder.build().unwrap();

        assert_eq!(
            *seen.borrow(),
            vec!["config:material", "index.md:custom", "special.md:custom"]
        );
        assert_eq!(site.read("site/index.html"), "custom|custom");
        assert_eq!(builder.config().theme.name(), "custom");
    }
}
