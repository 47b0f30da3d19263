//! Output file set.
//!
//! [`Files`] holds every file that will be written to the site directory:
//! markdown pages, static files from the docs directory and themes, and
//! outputs generated from static templates. Entries are keyed by their
//! source path and are never replaced once registered, so whoever registers
//! a path first owns it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rw_theme::{MARKDOWN_EXTENSIONS, Theme};

use crate::error::BuildError;

/// What a [`File`] represents in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Markdown source rendered into a page.
    Documentation,
    /// File copied verbatim.
    Static,
    /// Output produced by rendering a static template.
    Generated,
}

/// A file destined for the site directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    src_uri: String,
    src_dir: Option<PathBuf>,
    dest_dir: PathBuf,
    dest_uri: String,
    url: String,
    kind: FileKind,
}

impl File {
    /// Register `path` (relative to `src_dir`) for output under `dest_dir`.
    ///
    /// Markdown sources map to `stem/index.html` with directory URLs, or
    /// `stem.html` without. Everything else keeps its path.
    pub fn new(
        path: impl Into<String>,
        src_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
        use_directory_urls: bool,
    ) -> Self {
        let src_uri = normalize_uri(&path.into());
        let kind = if is_markdown(&src_uri) {
            FileKind::Documentation
        } else {
            FileKind::Static
        };
        let dest_uri = dest_uri_for(&src_uri, kind, use_directory_urls);
        let url = url_for(&dest_uri, use_directory_urls);
        Self {
            src_uri,
            src_dir: Some(src_dir.into()),
            dest_dir: dest_dir.into(),
            dest_uri,
            url,
            kind,
        }
    }

    /// Claim `path` for output produced by a static template.
    pub fn generated(
        path: impl Into<String>,
        dest_dir: impl Into<PathBuf>,
        use_directory_urls: bool,
    ) -> Self {
        let src_uri = normalize_uri(&path.into());
        let url = url_for(&src_uri, use_directory_urls);
        Self {
            dest_uri: src_uri.clone(),
            src_uri,
            src_dir: None,
            dest_dir: dest_dir.into(),
            url,
            kind: FileKind::Generated,
        }
    }

    /// Source path relative to its source directory, with forward slashes.
    pub fn src_uri(&self) -> &str {
        &self.src_uri
    }

    /// Directory the source was found in. `None` for generated files.
    pub fn src_dir(&self) -> Option<&Path> {
        self.src_dir.as_deref()
    }

    /// Output directory root.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Output path relative to the output directory.
    pub fn dest_uri(&self) -> &str {
        &self.dest_uri
    }

    /// Site-relative URL of the output.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// File kind.
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Absolute source path. `None` for generated files.
    pub fn abs_src_path(&self) -> Option<PathBuf> {
        self.src_dir.as_ref().map(|dir| dir.join(&self.src_uri))
    }

    /// Absolute output path.
    pub fn abs_dest_path(&self) -> PathBuf {
        self.dest_dir.join(&self.dest_uri)
    }
}

fn normalize_uri(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_owned()
}

fn is_markdown(uri: &str) -> bool {
    let lower = uri.to_lowercase();
    MARKDOWN_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn dest_uri_for(src_uri: &str, kind: FileKind, use_directory_urls: bool) -> String {
    if kind != FileKind::Documentation {
        return src_uri.to_owned();
    }
    let (parent, file_name) = match src_uri.rsplit_once('/') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, src_uri),
    };
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let name = if stem == "index" || !use_directory_urls {
        format!("{stem}.html")
    } else {
        format!("{stem}/index.html")
    };
    match parent {
        Some(parent) => format!("{parent}/{name}"),
        None => name,
    }
}

fn url_for(dest_uri: &str, use_directory_urls: bool) -> String {
    if use_directory_urls {
        if dest_uri == "index.html" {
            return String::new();
        }
        if let Some(dir) = dest_uri.strip_suffix("/index.html") {
            return format!("{dir}/");
        }
    }
    dest_uri.to_owned()
}

/// Ordered set of output files keyed by source path.
#[derive(Debug, Clone, Default)]
pub struct Files {
    files: Vec<File>,
    index: HashMap<String, usize>,
}

impl Files {
    /// Create an empty file set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every file under `docs_dir`, skipping hidden entries.
    ///
    /// Returns an empty set if the directory doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if a directory cannot be read.
    pub fn from_docs_dir(
        docs_dir: &Path,
        site_dir: &Path,
        use_directory_urls: bool,
    ) -> Result<Self, BuildError> {
        let mut paths = Vec::new();
        if docs_dir.is_dir() {
            collect_docs(docs_dir, docs_dir, &mut paths)?;
        }
        paths.sort();

        let mut files = Self::new();
        for path in paths {
            files.append(File::new(path, docs_dir, site_dir, use_directory_urls));
        }
        Ok(files)
    }

    /// Look up a file by source path.
    pub fn get(&self, src_uri: &str) -> Option<&File> {
        self.index.get(src_uri).map(|&i| &self.files[i])
    }

    /// Whether a file with this source path is registered.
    pub fn contains(&self, src_uri: &str) -> bool {
        self.index.contains_key(src_uri)
    }

    /// Register a file.
    ///
    /// Returns `false` and leaves the set unchanged if the source path is
    /// already registered.
    pub fn append(&mut self, file: File) -> bool {
        if self.index.contains_key(file.src_uri()) {
            return false;
        }
        self.index.insert(file.src_uri.clone(), self.files.len());
        self.files.push(file);
        true
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate files in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.files.iter()
    }

    /// Iterate markdown pages.
    pub fn documentation_pages(&self) -> impl Iterator<Item = &File> {
        self.iter().filter(|f| f.kind == FileKind::Documentation)
    }

    /// Iterate files copied verbatim.
    pub fn static_files(&self) -> impl Iterator<Item = &File> {
        self.iter().filter(|f| f.kind == FileKind::Static)
    }

    /// Register the static assets of `theme` that no existing entry claims.
    ///
    /// Each path is sourced from the first theme directory that contains it.
    /// Paths missing from every directory are skipped. Returns the source
    /// paths that were added, in sorted order.
    pub fn add_files_from_theme(
        &mut self,
        theme: &Theme,
        dest_dir: &Path,
        use_directory_urls: bool,
    ) -> Vec<String> {
        self.add_files_from_theme_except(theme, dest_dir, use_directory_urls, &[])
    }

    /// Like [`add_files_from_theme`](Self::add_files_from_theme), but never
    /// registers a path in `reserved` (compared case-insensitively).
    ///
    /// `reserved` typically holds another theme's static template names.
    pub fn add_files_from_theme_except(
        &mut self,
        theme: &Theme,
        dest_dir: &Path,
        use_directory_urls: bool,
        reserved: &[String],
    ) -> Vec<String> {
        let mut added = Vec::new();
        for path in theme.asset_paths() {
            if self.contains(&path) {
                continue;
            }
            if reserved.iter().any(|r| r.eq_ignore_ascii_case(&path)) {
                tracing::debug!(
                    theme = theme.name(),
                    path = %path,
                    "Theme asset reserved for a static template"
                );
                continue;
            }
            let Some(dir) = theme.find_asset_dir(&path) else {
                tracing::debug!(theme = theme.name(), path = %path, "Theme asset not found on disk");
                continue;
            };
            let file = File::new(path.clone(), dir, dest_dir, use_directory_urls);
            if self.append(file) {
                added.push(path);
            }
        }
        added
    }
}

fn collect_docs(base: &Path, dir: &Path, result: &mut Vec<String>) -> Result<(), BuildError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_docs(base, &path, result)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            result.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}
