//! Static asset collection for additional themes.

use rw_build::{BuildConfig, Files};

use crate::registry::ThemeRegistry;

/// Register the static assets of every additional theme in `files`.
///
/// Themes are visited in declaration order and never displace an existing
/// entry, so the docs directory and the primary theme keep their files and an
/// earlier additional theme beats a later one. Paths the primary theme
/// renders from static templates are left unclaimed. Returns the number of
/// files added.
pub(crate) fn collect_assets(
    registry: &ThemeRegistry,
    files: &mut Files,
    config: &BuildConfig,
) -> usize {
    let mut total = 0;
    for registered in registry.iter() {
        let added = files.add_files_from_theme_except(
            &registered.theme,
            &config.site_dir,
            config.use_directory_urls,
            config.theme.static_templates(),
        );
        tracing::debug!(
            theme = registered.theme.name(),
            count = added.len(),
            "Added additional theme assets"
        );
        total += added.len();
    }
    total
}
