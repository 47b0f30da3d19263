//! Static site build pipeline for RW.
//!
//! [`StaticSiteBuilder`] turns a directory of markdown into an HTML site
//! rendered with a [`Theme`](rw_theme::Theme). Pages, theme assets, and
//! static templates flow through a [`Files`] set that plugins can inspect
//! and extend via the [`Plugin`] hooks.

mod builder;
mod config;
mod error;
mod files;
mod nav;
mod page;
mod plugin;
mod template;

pub use builder::{BuildReport, StaticSiteBuilder};
pub use config::BuildConfig;
pub use error::BuildError;
pub use files::{File, FileKind, Files};
pub use nav::{NavItem, Navigation};
pub use page::{DEFAULT_TEMPLATE, Page, PageMeta};
pub use plugin::{PageContext, Plugin};
pub use template::build_theme_template;
