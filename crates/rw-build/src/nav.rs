//! Site navigation.

use serde::Serialize;

use crate::page::Page;

/// A navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Page title.
    pub title: String,
    /// Site-relative URL.
    pub url: String,
    /// Page source path.
    pub src_uri: String,
}

/// Ordered list of navigable pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    items: Vec<NavItem>,
}

impl Navigation {
    /// Build navigation from rendered pages.
    ///
    /// With an explicit `order`, only the listed pages appear, in that order;
    /// unknown entries are logged and skipped. Otherwise every page appears,
    /// grouped by directory with each directory's `index` page first.
    pub fn build(pages: &[Page], order: Option<&[String]>) -> Self {
        let items = match order {
            Some(order) => order
                .iter()
                .filter_map(|src_uri| {
                    let page = pages.iter().find(|p| p.src_uri() == src_uri);
                    if page.is_none() {
                        tracing::warn!(page = %src_uri, "Navigation entry does not match any page");
                    }
                    page
                })
                .map(NavItem::from)
                .collect(),
            None => {
                let mut sorted: Vec<&Page> = pages.iter().collect();
                sorted.sort_by_key(|p| sort_key(p.src_uri()));
                sorted.into_iter().map(NavItem::from).collect()
            }
        };
        Self { items }
    }

    /// Navigation entries in display order.
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the navigation is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Page> for NavItem {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title().to_owned(),
            url: page.url().to_owned(),
            src_uri: page.src_uri().to_owned(),
        }
    }
}

fn sort_key(src_uri: &str) -> (String, bool, String) {
    let (dir, file) = src_uri.rsplit_once('/').unwrap_or(("", src_uri));
    let is_index = file.rsplit_once('.').is_some_and(|(stem, _)| stem == "index");
    (dir.to_owned(), !is_index, file.to_owned())
}
