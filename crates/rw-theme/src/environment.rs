//! Template environments for themes.
//!
//! Each theme gets its own [`minijinja::Environment`] whose loader searches
//! the theme's directories in precedence order, so `{% extends "base.html" %}`
//! inside a custom directory resolves to the parent theme's `base.html`
//! unless the custom directory overrides it.

use std::path::{Component, Path, PathBuf};

use minijinja::{Environment, Error, ErrorKind, State, Value};

use crate::theme::Theme;

impl Theme {
    /// Create a template environment for this theme.
    ///
    /// The environment exposes the theme as the `theme` global and registers
    /// the `url` filter, which makes site-relative links relative to the
    /// `base_url` of the page being rendered.
    pub fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        let dirs = self.dirs().to_vec();
        env.set_loader(move |name| load_template(&dirs, name));
        env.add_global("theme", Value::from_serialize(self.context()));
        env.add_filter("url", url_filter);
        env
    }
}

/// Read `name` from the first directory that contains it.
fn load_template(dirs: &[PathBuf], name: &str) -> Result<Option<String>, Error> {
    if !is_safe_template_name(name) {
        return Ok(None);
    }
    for dir in dirs {
        match std::fs::read_to_string(dir.join(name)) {
            Ok(source) => return Ok(Some(source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(
                    Error::new(ErrorKind::InvalidOperation, "could not read template")
                        .with_source(e),
                );
            }
        }
    }
    Ok(None)
}

/// Template names must stay inside the theme directories.
fn is_safe_template_name(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// `{{ "css/theme.css" | url }}` → `../css/theme.css` on a nested page.
///
/// The result is marked safe so auto-escaping in `.html` templates leaves the
/// slashes intact.
fn url_filter(state: &State, value: String) -> Value {
    if value.is_empty()
        || value.starts_with('/')
        || value.starts_with('#')
        || value.contains("://")
        || value.starts_with("mailto:")
    {
        return Value::from_safe_string(value);
    }
    let base_url = state
        .lookup("base_url")
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| ".".to_owned());
    if base_url == "." || base_url.is_empty() {
        Value::from_safe_string(value)
    } else {
        Value::from_safe_string(format!("{}/{value}", base_url.trim_end_matches('/')))
    }
}
