//! Template rendering for pages and theme static templates.

use std::fs;

use minijinja::{Environment, ErrorKind, Template, context};
use serde::Serialize;

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::files::{File, Files};
use crate::nav::Navigation;
use crate::page::{Page, PageMeta};
use crate::plugin::PageContext;

/// Page values exposed to templates as `page`.
#[derive(Serialize)]
struct PageView<'a> {
    title: &'a str,
    url: &'a str,
    src_uri: &'a str,
    content: &'a str,
    meta: &'a PageMeta,
}

impl<'a> From<&'a Page> for PageView<'a> {
    fn from(page: &'a Page) -> Self {
        Self {
            title: page.title(),
            url: page.url(),
            src_uri: page.src_uri(),
            content: page.content(),
            meta: page.meta(),
        }
    }
}

/// Render a theme static template into the site directory.
///
/// The template is skipped (returning `Ok(false)`) when `files` already
/// claims `name`, when `env` has no such template, or when it renders to
/// whitespace only. On success the output is claimed in `files` so later
/// calls for the same name are skipped.
///
/// # Errors
///
/// Returns [`BuildError::Template`] if the template fails to compile or
/// render and [`BuildError::Io`] if the output can't be written.
pub fn build_theme_template(
    name: &str,
    env: &Environment<'_>,
    files: &mut Files,
    config: &BuildConfig,
    nav: &Navigation,
) -> Result<bool, BuildError> {
    if files.contains(name) {
        tracing::debug!(template = %name, "Static template output already claimed");
        return Ok(false);
    }

    let template = match env.get_template(name) {
        Ok(template) => template,
        Err(e) if e.kind() == ErrorKind::TemplateNotFound => {
            tracing::warn!(template = %name, "Static template not found in theme");
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    let output = template.render(context! {
        config => config.context(),
        nav => nav,
        base_url => ".",
    })?;
    if output.trim().is_empty() {
        tracing::debug!(template = %name, "Static template rendered empty output");
        return Ok(false);
    }

    let file = File::generated(name, &config.site_dir, config.use_directory_urls);
    let dest = file.abs_dest_path();
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&dest, output)?;
    files.append(file);
    tracing::debug!(template = %name, "Static template written");
    Ok(true)
}

/// Render a page through its selected template.
pub(crate) fn render_page(
    template: &Template<'_, '_>,
    ctx: &PageContext<'_>,
    config: &BuildConfig,
    nav: &Navigation,
) -> Result<String, BuildError> {
    let page = ctx.page();
    Ok(template.render(context! {
        config => config.context(),
        page => PageView::from(page),
        nav => nav,
        base_url => page.base_url(),
        theme => ctx.theme.context(),
    })?)
}
