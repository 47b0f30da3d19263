//! Static site builder.

use std::cmp::Reverse;
use std::fs;
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::files::Files;
use crate::nav::Navigation;
use crate::page::Page;
use crate::plugin::{PageContext, Plugin};
use crate::template::{build_theme_template, render_page};

/// Summary of a finished build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages rendered.
    pub pages: usize,
    /// Static files copied.
    pub static_files: usize,
    /// Static templates rendered, across all themes.
    pub generated: usize,
}

/// Builds a static documentation site from a docs directory.
pub struct StaticSiteBuilder {
    config: BuildConfig,
    plugins: Vec<Box<dyn Plugin>>,
}

impl StaticSiteBuilder {
    /// Create a builder without plugins.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            plugins: Vec::new(),
        }
    }

    /// Register a plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.config.plugins.push(plugin.name().to_owned());
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the full build.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a plugin hook, theme, template, or
    /// filesystem operation.
    pub fn build(&mut self) -> Result<BuildReport, BuildError> {
        self.plugins.sort_by_key(|p| Reverse(p.priority()));
        self.config.plugins = self.plugins.iter().map(|p| p.name().to_owned()).collect();

        for plugin in &mut self.plugins {
            plugin.on_config(&mut self.config)?;
        }
        for plugin in &mut self.plugins {
            plugin.on_config_finalized(&mut self.config)?;
        }

        let config = &self.config;
        fs::create_dir_all(&config.site_dir)?;

        let mut files = Files::from_docs_dir(
            &config.docs_dir,
            &config.site_dir,
            config.use_directory_urls,
        )?;
        let theme_assets =
            files.add_files_from_theme(&config.theme, &config.site_dir, config.use_directory_urls);
        tracing::debug!(
            theme = config.theme.name(),
            count = theme_assets.len(),
            "Registered primary theme assets"
        );
        for plugin in &mut self.plugins {
            plugin.on_files(&mut files, config)?;
        }

        let pages = files
            .documentation_pages()
            .cloned()
            .map(Page::load)
            .collect::<Result<Vec<_>, _>>()?;
        let nav = Arc::new(Navigation::build(&pages, config.nav.as_deref()));
        for plugin in &mut self.plugins {
            plugin.on_nav(&nav, config, &files)?;
        }

        let mut env = config.theme.environment();
        let mut report = BuildReport::default();
        for name in config.theme.static_templates() {
            if build_theme_template(name, &env, &mut files, config, &nav)? {
                report.generated += 1;
            }
        }
        let claimed = files.len();
        for plugin in &mut self.plugins {
            plugin.on_env(&mut env, config, &mut files)?;
        }
        report.generated += files.len() - claimed;

        for file in files.static_files() {
            let Some(src) = file.abs_src_path() else {
                continue;
            };
            let dest = file.abs_dest_path();
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dest)?;
            report.static_files += 1;
        }

        for page in &pages {
            let mut ctx = PageContext::new(page, Arc::clone(&config.theme));
            for plugin in &self.plugins {
                plugin.on_page_context(&mut ctx, config);
            }

            let mut selected = None;
            for plugin in &self.plugins {
                if let Some(template) = plugin.on_page_template(&ctx)? {
                    selected = Some(template);
                    break;
                }
            }
            let template = match selected {
                Some(template) => template,
                None => env.get_template(&ctx.template_name)?,
            };

            let mut output = render_page(&template, &ctx, config, &nav)?;
            for plugin in &self.plugins {
                output = plugin.on_post_page(output, page, config)?;
            }

            let dest = page.file().abs_dest_path();
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, output)?;
            tracing::debug!(page = page.src_uri(), theme = ctx.theme.name(), "Page written");
            report.pages += 1;
        }

        tracing::info!(
            pages = report.pages,
            static_files = report.static_files,
            generated = report.generated,
            "Site built"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use rw_theme::{THEME_MANIFEST, Theme};

    use super::*;

    struct Fixture {
        _root: tempfile::TempDir,
        docs: std::path::PathBuf,
        site: std::path::PathBuf,
        theme: Theme,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        let site = root.path().join("site");
        let theme_dir = root.path().join("themes/material");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::create_dir_all(theme_dir.join("css")).unwrap();
        fs::write(docs.join("index.md"), "# Welcome\n\nHello.").unwrap();
        fs::write(docs.join("guide/setup.md"), "# Setup").unwrap();
        fs::write(docs.join("guide/shot.png"), "png").unwrap();
        fs::write(theme_dir.join(THEME_MANIFEST), "").unwrap();
        fs::write(
            theme_dir.join("main.html"),
            "<title>{{ page.title }}</title><link href=\"{{ 'css/site.css' | url }}\">{{ page.content|safe }}",
        )
        .unwrap();
        fs::write(theme_dir.join("404.html"), "Not found on {{ config.site_name }}").unwrap();
        fs::write(theme_dir.join("css/site.css"), "body{}").unwrap();
        let theme = Theme::from_parts("material", vec![theme_dir], vec!["404.html".to_owned()]);
        Fixture {
            _root: root,
            docs,
            site,
            theme,
        }
    }

    #[test]
    fn test_build_writes_pages_assets_and_static_templates() {
        let f = fixture();
        let mut builder = StaticSiteBuilder::new(BuildConfig::new(&f.docs, &f.site, f.theme.clone()));

        let report = builder.build().unwrap();

        assert_eq!(
            report,
            BuildReport {
                pages: 2,
                static_files: 2,
                generated: 1,
            }
        );
        let index = fs::read_to_string(f.site.join("index.html")).unwrap();
        assert!(index.contains("<title>Welcome</title>"));
        assert!(index.contains("href=\"css/site.css\""));
        let setup = fs::read_to_string(f.site.join("guide/setup/index.html")).unwrap();
        assert!(setup.contains("href=\"../../css/site.css\""));
        assert!(f.site.join("css/site.css").is_file());
        assert!(f.site.join("guide/shot.png").is_file());
        assert_eq!(
            fs::read_to_string(f.site.join("404.html")).unwrap(),
            "Not found on Documentation"
        );
        assert!(!f.site.join("main.html").exists());
    }

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    struct RecordingPlugin {
        name: &'static str,
        priority: i32,
        recorder: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingPlugin {
        fn record(&self, event: &str) {
            self.recorder
                .borrow_mut()
                .push(format!("{}:{event}", self.name));
        }
    }

    impl Plugin for RecordingPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn on_config(&mut self, _config: &mut BuildConfig) -> Result<(), BuildError> {
            self.record("config");
            Ok(())
        }

        fn on_config_finalized(&mut self, _config: &mut BuildConfig) -> Result<(), BuildError> {
            self.record("config_finalized");
            Ok(())
        }

        fn on_files(&mut self, _files: &mut Files, _config: &BuildConfig) -> Result<(), BuildError> {
            self.record("files");
            Ok(())
        }

        fn on_nav(
            &mut self,
            nav: &Arc<Navigation>,
            _config: &BuildConfig,
            _files: &Files,
        ) -> Result<(), BuildError> {
            self.record(&format!("nav({})", nav.len()));
            Ok(())
        }

        fn on_env(
            &mut self,
            _env: &mut minijinja::Environment<'static>,
            _config: &BuildConfig,
            files: &mut Files,
        ) -> Result<(), BuildError> {
            let claimed = files.contains("404.html");
            self.record(&format!("env(404 claimed: {claimed})"));
            Ok(())
        }

        fn on_post_page(
            &self,
            output: String,
            page: &Page,
            _config: &BuildConfig,
        ) -> Result<String, BuildError> {
            self.record(&format!("post_page({})", page.src_uri()));
            Ok(output)
        }
    }

    #[test]
    fn test_hook_order_and_priority() {
        let f = fixture();
        let recorder = Recorder::default();
        let plugin = |name, priority| RecordingPlugin {
            name,
            priority,
            recorder: Rc::clone(&recorder.events),
        };
        let mut builder = StaticSiteBuilder::new(BuildConfig::new(&f.docs, &f.site, f.theme.clone()))
            .with_plugin(plugin("low", 0))
            .with_plugin(plugin("high", 10));

        builder.build().unwrap();

        assert_eq!(builder.config().plugins, vec!["high", "low"]);
        assert_eq!(
            *recorder.events.borrow(),
            vec![
                "high:config",
                "low:config",
                "high:config_finalized",
                "low:config_finalized",
                "high:files",
                "low:files",
                "high:nav(2)",
                "low:nav(2)",
                "high:env(404 claimed: true)",
                "low:env(404 claimed: true)",
                "high:post_page(guide/setup.md)",
                "low:post_page(guide/setup.md)",
                "high:post_page(index.md)",
                "low:post_page(index.md)",
            ]
        );
    }

    #[test]
    fn test_missing_template_is_error() {
        let f = fixture();
        fs::write(f.docs.join("custom.md"), "---\ntemplate: nope.html\n---\n# Custom").unwrap();
        let mut builder = StaticSiteBuilder::new(BuildConfig::new(&f.docs, &f.site, f.theme.clone()));

        let err = builder.build().unwrap_err();

        assert!(matches!(err, BuildError::Template(_)));
        assert!(!Path::new(&f.site.join("custom/index.html")).exists());
    }
}
