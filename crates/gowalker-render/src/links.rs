//! Cross-reference targets used while highlighting code.

use gowalker_core::{Package, base_name};
use std::borrow::Cow;

/// A name the highlighter can turn into an anchor.
///
/// `path` is empty for declarations on the same page. Import qualifiers
/// are stored with a trailing period (`"http."`) and the import path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub path: String,
    /// Tooltip text, unescaped.
    pub comment: String,
}

impl Link {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            comment: comment.into(),
        }
    }
}

/// Builds the link table for one package page: every type and function
/// declared in the package plus one qualifier per import. Cgo's `"C"`
/// pseudo-import is skipped.
pub fn package_links(pkg: &Package) -> Vec<Link> {
    let mut links = Vec::new();
    for t in pkg.types.iter().chain(&pkg.itypes) {
        links.push(Link::new(&t.name, "", &t.doc));
        for f in t.funcs.iter().chain(&t.ifuncs) {
            links.push(Link::new(&f.name, "", &f.doc));
        }
    }
    for f in pkg.funcs.iter().chain(&pkg.ifuncs) {
        links.push(Link::new(&f.name, "", &f.doc));
    }
    for import in &pkg.imports {
        if import == "C" {
            continue;
        }
        links.push(Link::new(format!("{}.", base_name(import)), import, ""));
    }
    links
}

/// Looks up `word` in `links`.
///
/// A plain name matches a link of the same name. A qualified `left.right`
/// matches the link named `left.` and targets `right` inside that link's
/// package, or inside the current page when the link has no path. The
/// first matching link wins.
pub fn find_link<'l>(word: &str, links: &'l [Link]) -> Option<Cow<'l, Link>> {
    match word.find('.') {
        None => links.iter().find(|l| l.name == word).map(Cow::Borrowed),
        Some(dot) => {
            let (left, right) = (&word[..=dot], &word[dot + 1..]);
            let link = links.iter().find(|l| l.name == left)?;
            let path = if link.path.is_empty() {
                format!("#{}", right)
            } else {
                format!("/{}#{}", link.path, right)
            };
            Some(Cow::Owned(Link {
                name: word.to_string(),
                path,
                comment: link.comment.clone(),
            }))
        }
    }
}
