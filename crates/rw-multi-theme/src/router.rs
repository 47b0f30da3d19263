//! Page to theme routing.

use std::collections::HashMap;

use rw_config::AdditionalThemeConfig;

/// Normalize a page path for lookup: forward slashes, no leading `./` or `/`.
///
/// ```
/// assert_eq!(rw_multi_theme::normalize_page("./guide\\special.md"), "guide/special.md");
/// ```
pub fn normalize_page(page: &str) -> String {
    let mut path = page.trim().replace('\\', "/");
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest.to_owned();
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest.to_owned();
        } else {
            return path;
        }
    }
}

/// Maps page source paths to the index of the additional theme that renders
/// them.
#[derive(Debug, Default)]
pub(crate) struct PageRouter {
    routes: HashMap<String, usize>,
}

impl PageRouter {
    /// Build routes from declarations. The first declaration listing a page
    /// wins.
    pub(crate) fn new(declarations: &[AdditionalThemeConfig]) -> Self {
        let mut routes = HashMap::new();
        for (index, declaration) in declarations.iter().enumerate() {
            for page in &declaration.pages {
                let page = normalize_page(page);
                match routes.get(&page) {
                    Some(&first) if first != index => {
                        tracing::warn!(
                            page = %page,
                            used = first,
                            ignored = index,
                            "Page listed by several additional themes, using the first"
                        );
                    }
                    Some(_) => {}
                    None => {
                        routes.insert(page, index);
                    }
                }
            }
        }
        Self { routes }
    }

    /// Additional theme index for `src_uri`, if any.
    pub(crate) fn route(&self, src_uri: &str) -> Option<usize> {
        self.routes.get(src_uri).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }
}
