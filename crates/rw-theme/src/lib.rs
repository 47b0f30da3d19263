//! Theme loading, asset filtering, and template environments for RW.
//!
//! A [`Theme`] is an ordered list of directories (optional custom directory,
//! the named theme, then any themes it extends) plus the metadata read from
//! each directory's manifest. Themes produce their own template
//! [`Environment`](minijinja::Environment) and enumerate their copyable static
//! assets through an [`AssetFilter`].

mod assets;
mod environment;
mod error;
mod manifest;
mod theme;

pub use assets::{AssetFilter, MARKDOWN_EXTENSIONS};
pub use error::ThemeError;
pub use manifest::THEME_MANIFEST;
pub use theme::{Theme, ThemeContext};
