//! Documentation model shared by the extractor, renderer and codecs.
//!
//! A [`Package`] is built fresh on every successful fetch and replaces the
//! previous snapshot for its import path as a whole. Fields marked
//! `#[serde(skip)]` are transient and never reach any codec.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A const or var declaration group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub name: String,
    pub doc: String,
    pub decl: String,
    /// Highlighted declaration, filled in by the renderer.
    #[serde(default)]
    pub fmt_decl: String,
    pub url: String,
}

/// A function or method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    pub name: String,
    pub doc: String,
    pub decl: String,
    #[serde(default)]
    pub fmt_decl: String,
    pub url: String,
    /// Body text between the braces.
    pub code: String,
    /// `Type_Method` for methods, the plain name otherwise.
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub examples: Vec<Example>,
}

/// A named type together with the functions the extractor associated with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    pub doc: String,
    pub decl: String,
    #[serde(default)]
    pub fmt_decl: String,
    pub url: String,
    /// Exported functions returning this type.
    pub funcs: Vec<Func>,
    /// Unexported functions returning this type.
    pub ifuncs: Vec<Func>,
    pub methods: Vec<Func>,
    pub imethods: Vec<Func>,
    #[serde(default)]
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// `Type_Method`, `Func`, `Type` or empty for package examples, with an
    /// optional lower-case `_suffix`.
    pub name: String,
    pub doc: String,
    pub code: String,
    pub output: String,
    /// Set once a declaration claimed this example during rendering.
    #[serde(skip)]
    pub used: bool,
}

/// A source file descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub browse_url: String,
    pub raw_url: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        browse_url: impl Into<String>,
        raw_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            browse_url: browse_url.into(),
            raw_url: raw_url.into(),
            data: Vec::new(),
        }
    }

    /// Returns the content as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Root aggregate for one import path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub import_path: String,
    pub project_root: String,
    pub project_name: String,
    pub project_url: String,
    pub view_dir_path: String,
    pub vcs: String,
    pub tag: String,
    /// Revision of the fetched source; changes iff the content changed.
    pub etag: String,
    pub created: i64,
    pub viewed_time: i64,

    pub name: String,
    pub synopsis: String,
    pub doc: String,

    pub is_cmd: bool,
    pub truncated: bool,
    pub has_subdir: bool,
    pub has_file: bool,
    pub has_export: bool,
    pub has_example: bool,

    pub consts: Vec<Value>,
    pub iconsts: Vec<Value>,
    pub vars: Vec<Value>,
    pub ivars: Vec<Value>,
    pub funcs: Vec<Func>,
    pub ifuncs: Vec<Func>,
    pub types: Vec<Type>,
    pub itypes: Vec<Type>,
    pub examples: Vec<Example>,

    pub files: Vec<Source>,
    pub test_files: Vec<Source>,
    pub imports: Vec<String>,
    pub test_imports: Vec<String>,
    pub dirs: Vec<String>,
    /// README text keyed by language code.
    pub readme: BTreeMap<String, String>,

    pub id: i64,
    pub views: i64,
    pub imported_num: i64,
    /// Reverse-import index as a `$id|` delimited list.
    pub import_pids: String,
    pub rank: i64,
    pub stars: i64,
}

impl Package {
    /// Last path element, used as the default qualifier for examples.
    pub fn base_name(&self) -> &str {
        base_name(&self.import_path)
    }

    pub fn has_exports(&self) -> bool {
        !(self.consts.is_empty()
            && self.vars.is_empty()
            && self.funcs.is_empty()
            && self.types.is_empty())
    }
}

/// Returns the last `/`-separated element of `path`.
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("github.com/foo/bar"), "bar");
        assert_eq!(base_name("fmt"), "fmt");
        assert_eq!(base_name("net/http/"), "http");
    }

    #[test]
    fn test_source_text_lossy() {
        let mut source = Source::new("a.go", "b", "r");
        source.data = b"package a\xff".to_vec();
        assert!(source.text().starts_with("package a"));
    }

    #[test]
    fn test_has_exports() {
        let mut pkg = Package::default();
        assert!(!pkg.has_exports());
        pkg.funcs.push(Func {
            name: "New".into(),
            ..Default::default()
        });
        assert!(pkg.has_exports());
    }
}
