//! Per-page theme overlays for RW site builds.
//!
//! [`MultiThemePlugin`] renders selected pages under themes other than the
//! site's primary theme:
//!
//! ```toml
//! [theme]
//! name = "material"
//!
//! [[plugins.multi_theme.additional_themes]]
//! pages = ["special.md"]
//! theme = { name = "readthedocs" }
//! ```
//!
//! Each additional theme gets its own template environment. Its static
//! assets and static templates are added to the site without overwriting
//! anything the primary theme (or the docs directory) already provides, and
//! listed pages resolve their template from that theme's environment. The
//! primary theme stays in [`BuildConfig`](rw_build::BuildConfig) throughout;
//! the per-page theme travels in [`PageContext`](rw_build::PageContext).

mod assets;
mod compat;
mod plugin;
mod registry;
mod router;

pub use compat::NARROW_THEME_PLUGINS;
pub use plugin::{MultiThemePlugin, PLUGIN_NAME};
pub use router::normalize_page;
