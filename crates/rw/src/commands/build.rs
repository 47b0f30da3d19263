//! `rw build` command implementation.

use std::path::PathBuf;

use clap::Args;
use rw_build::{BuildConfig, StaticSiteBuilder};
use rw_config::{CliSettings, Config};
use rw_multi_theme::MultiThemePlugin;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short = 'o', long)]
    site_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, theme loading, or the build fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            site_dir: self.site_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(path = ?config.config_path, "Configuration loaded");

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!("Output: {}", config.site_resolved.site_dir.display()));

        let build_config = BuildConfig::from_config(&config)?;
        output.info(&format!("Theme: {}", build_config.theme.name()));

        let mut builder = StaticSiteBuilder::new(build_config);
        if let Some(multi_theme) = &config.plugins.multi_theme {
            for entry in &multi_theme.additional_themes {
                let name = entry.theme.name.as_deref().unwrap_or("custom");
                output.info(&format!("Theme: {name} ({} pages)", entry.pages.len()));
            }
            builder = builder.with_plugin(MultiThemePlugin::new(multi_theme.clone()));
        }

        let report = builder.build()?;
        if report.pages == 0 {
            output.warning("No markdown pages found");
        }

        output.success(&format!(
            "Built {} pages to {}",
            report.pages,
            builder.config().site_dir.display()
        ));
        Ok(())
    }
}
