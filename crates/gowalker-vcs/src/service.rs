//! The hosting-service trait and what a service hands back.

use crate::groups::MatchGroups;
use async_trait::async_trait;
use gowalker_core::{HttpFetcher, Result, Source};
use regex::Regex;

/// Project information reported by a hosting service or a go-import
/// meta tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMeta {
    /// Import path of the repository root, e.g. `github.com/foo/bar`.
    pub root: String,
    pub name: String,
    pub url: String,
    /// Browse URL of the package directory.
    pub view_dir_path: String,
    pub vcs: String,
}

/// The files of one package directory at one revision.
#[derive(Debug, Clone, Default)]
pub struct FetchedTree {
    /// Direct files, content already downloaded.
    pub files: Vec<Source>,
    pub dirs: Vec<String>,
    pub revision: String,
    pub project: ProjectMeta,
    /// Appended to browse URLs before a line number, e.g. `#L`.
    pub line_anchor: String,
    pub stars: i64,
}

/// One hosting service: how its import paths look and how to fetch a
/// package directory from it.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use gowalker_core::{HttpFetcher, Result};
/// use gowalker_vcs::{FetchedTree, MatchGroups, Service};
/// use regex::Regex;
///
/// struct Local {
///     pattern: Regex,
/// }
///
/// #[async_trait]
/// impl Service for Local {
///     fn name(&self) -> &'static str {
///         "local"
///     }
///
///     fn prefix(&self) -> &str {
///         "local.test/"
///     }
///
///     fn pattern(&self) -> &Regex {
///         &self.pattern
///     }
///
///     async fn fetch_tree(
///         &self,
///         _http: &HttpFetcher,
///         _groups: &MatchGroups,
///         _tag: &str,
///         _saved_revision: &str,
///     ) -> Result<FetchedTree> {
///         Ok(FetchedTree::default())
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync {
    /// Short identifier used in logs and lookups.
    fn name(&self) -> &'static str;

    /// Literal prefix an import path must start with.
    fn prefix(&self) -> &str;

    /// Pattern with named captures (`owner`, `repo`, `dir`) applied to
    /// import paths that carry [`prefix`](Self::prefix).
    fn pattern(&self) -> &Regex;

    /// Fetches the package directory described by `groups` at `tag`
    /// (empty for the default branch).
    ///
    /// # Errors
    ///
    /// `NotModified` when the current revision equals `saved_revision`,
    /// checked before any file content is downloaded. `NoSourceFiles` when
    /// the directory holds neither Go files nor package subdirectories.
    async fn fetch_tree(
        &self,
        http: &HttpFetcher,
        groups: &MatchGroups,
        tag: &str,
        saved_revision: &str,
    ) -> Result<FetchedTree>;

    /// Fetches a single presentation file (`.slide`, `.article`) from the
    /// package directory. Services without support return `Ok(None)`.
    async fn fetch_presentation(
        &self,
        _http: &HttpFetcher,
        _groups: &MatchGroups,
        _file: &str,
    ) -> Result<Option<Source>> {
        Ok(None)
    }
}
