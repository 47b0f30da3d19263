//! Markdown pages.

use std::collections::BTreeMap;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::files::File;

/// Template used when a page doesn't name one.
pub const DEFAULT_TEMPLATE: &str = "main.html";

/// Front matter fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageMeta {
    /// Page title override.
    pub title: Option<String>,
    /// Template override (e.g., `"landing.html"`).
    pub template: Option<String>,
    /// Remaining keys, exposed to templates as `page.meta`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A rendered markdown page.
#[derive(Debug, Clone)]
pub struct Page {
    file: File,
    title: String,
    meta: PageMeta,
    content: String,
}

impl Page {
    /// Read and render the page's markdown source.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if the source can't be read and
    /// [`BuildError::FrontMatter`] if the front matter is malformed.
    pub fn load(file: File) -> Result<Self, BuildError> {
        let source = match file.abs_src_path() {
            Some(path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };
        Self::from_source(file, &source)
    }

    /// Render a page from markdown source.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::FrontMatter`] if the front matter is malformed.
    pub fn from_source(file: File, source: &str) -> Result<Self, BuildError> {
        let (front_matter, body) = split_front_matter(source);
        let meta = match front_matter {
            Some(yaml) if !yaml.trim().is_empty() => {
                serde_yaml::from_str(yaml).map_err(|e| BuildError::FrontMatter {
                    path: file.src_uri().to_owned(),
                    message: e.to_string(),
                })?
            }
            _ => PageMeta::default(),
        };

        let (content, heading) = render_markdown(body);
        let title = meta
            .title
            .clone()
            .or(heading)
            .unwrap_or_else(|| title_from_path(file.src_uri()));

        Ok(Self {
            file,
            title,
            meta,
            content,
        })
    }

    /// Underlying file.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Source path relative to the docs directory (e.g., `"guide/setup.md"`).
    pub fn src_uri(&self) -> &str {
        self.file.src_uri()
    }

    /// Page title: front matter, then first H1, then file name.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Front matter.
    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Rendered HTML body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Site-relative URL.
    pub fn url(&self) -> &str {
        self.file.url()
    }

    /// Template the page asks for.
    pub fn template_name(&self) -> &str {
        self.meta.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Relative path from the page's output location to the site root.
    pub fn base_url(&self) -> String {
        let depth = self.file.dest_uri().matches('/').count();
        if depth == 0 {
            ".".to_owned()
        } else {
            vec![".."; depth].join("/")
        }
    }
}

/// Split `---` delimited YAML front matter from the markdown body.
fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, source)
}

/// Render markdown to HTML and extract the text of the first H1.
fn render_markdown(markdown: &str) -> (String, Option<String>) {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, options).collect();

    let mut title: Option<String> = None;
    let mut in_h1 = false;
    for event in &events {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if title.is_none() => {
                in_h1 = true;
                title = Some(String::new());
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_h1 => break,
            Event::Text(text) | Event::Code(text) if in_h1 => {
                if let Some(t) = title.as_mut() {
                    t.push_str(text);
                }
            }
            _ => {}
        }
    }

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    (html, title.filter(|t| !t.trim().is_empty()))
}

/// `guide/getting-started.md` → `Getting started`; `api/index.md` → `Api`.
fn title_from_path(src_uri: &str) -> String {
    let mut segments: Vec<&str> = src_uri.split('/').collect();
    let file_name = segments.pop().unwrap_or_default();
    let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);
    let name = if stem == "index" {
        match segments.pop() {
            Some(dir) => dir,
            None => return "Home".to_owned(),
        }
    } else {
        stem
    };
    let words = name.replace(['-', '_'], " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
