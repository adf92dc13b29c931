//! Request orchestration: cache check, fetch with a deadline, render and
//! persist.

use crate::config::WalkerConfig;
use crate::fetcher::PackageFetcher;
use crate::store::{PackageStore, PackageSummary};
use gowalker_core::codec::{self, record, snapshot};
use gowalker_core::{Package, RecentProject, RecentProjects, Result, WalkerError};
use gowalker_render::{PageTemplate, has_doc_shards, render_package, write_doc_shards, write_readmes};
use std::sync::Arc;
use std::time::Duration;

/// Layout version of stored packages. Stored etags are `"{PACKAGE_VER}-{revision}"`;
/// anything else is re-fetched from scratch.
pub const PACKAGE_VER: &str = "2";

/// Browser URL prefix of the standard library sources.
const GO_SOURCE_PREFIX: &str = "github.com/golang/go/tree/master/src/";

/// Paths with at most this many segments are never purged.
const MIN_PURGE_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A page view: a current stored copy is served as is.
    Human,
    /// Always checks the remote for a new revision.
    Refresh,
}

/// Path of the rendered page for `path` at `tag`, relative to the shard
/// directory.
pub fn doc_path(path: &str, tag: &str) -> String {
    if tag.is_empty() {
        path.to_string()
    } else {
        format!("{}@{}", path, tag)
    }
}

/// Strips the standard library browser prefix and trailing slashes.
///
/// # Errors
///
/// `InvalidRemotePath` when nothing is left.
pub fn normalize_path(path: &str) -> Result<&str> {
    let path = path.trim().trim_end_matches('/');
    let path = path.strip_prefix(GO_SOURCE_PREFIX).unwrap_or(path);
    if path.is_empty() {
        return Err(WalkerError::InvalidRemotePath(path.to_string()));
    }
    Ok(path)
}

fn saved_revision(etag: &str) -> Option<&str> {
    match etag.split_once('-') {
        Some((version, revision)) if version == PACKAGE_VER => Some(revision),
        _ => None,
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Serves documentation pages, fetching and storing packages on demand.
///
/// # Examples
///
/// ```no_run
/// use gowalker::config::WalkerConfig;
/// use gowalker::service::{DocService, RequestKind};
/// use gowalker::store::MemoryStore;
/// use gowalker_core::{HttpFetcher, RecentProjects};
/// use gowalker_render::BasicTemplate;
/// use gowalker_vcs::{Crawler, ServiceRegistry};
/// use std::sync::Arc;
///
/// # async fn example() -> gowalker_core::Result<()> {
/// let config = WalkerConfig::default();
/// let http = Arc::new(HttpFetcher::new((&config.http).into())?);
/// let registry = Arc::new(ServiceRegistry::standard(
///     (&config.github).into(),
///     (&config.bitbucket).into(),
/// ));
///
/// let service = DocService::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(Crawler::new(registry, http)),
///     Arc::new(BasicTemplate),
///     Arc::new(RecentProjects::new(config.recent_projects.capacity)),
///     config,
/// );
///
/// let summary = service.check_package("github.com/foo/bar", "", RequestKind::Human).await?;
/// println!("{} ({} views)", summary.synopsis, summary.views);
/// # Ok(())
/// # }
/// ```
pub struct DocService {
    store: Arc<dyn PackageStore>,
    fetcher: Arc<dyn PackageFetcher>,
    template: Arc<dyn PageTemplate>,
    recent: Arc<RecentProjects>,
    config: WalkerConfig,
    fetch_timeout: Duration,
}

impl DocService {
    pub fn new(
        store: Arc<dyn PackageStore>,
        fetcher: Arc<dyn PackageFetcher>,
        template: Arc<dyn PageTemplate>,
        recent: Arc<RecentProjects>,
        config: WalkerConfig,
    ) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
            store,
            fetcher,
            template,
            recent,
            config,
        }
    }

    /// Overrides the configured fetch deadline.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn recent(&self) -> &RecentProjects {
        &self.recent
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// All known import paths, for the search index.
    pub async fn known_paths(&self) -> Result<Vec<String>> {
        self.store.all_paths().await
    }

    /// Returns the summary of `path` at `tag`, fetching, rendering and
    /// storing the package when there is no current copy or `kind` is
    /// [`RequestKind::Refresh`].
    ///
    /// # Errors
    ///
    /// - `InvalidRemotePath` for an empty path or a malformed path on a
    ///   known host
    /// - `FetchTimeout` when the fetch misses its deadline; its result is
    ///   discarded and never stored
    /// - not-found errors, including a malformed path on a known host,
    ///   after the stored copy has been purged
    /// - any fetch, render or store failure
    pub async fn check_package(&self, path: &str, tag: &str, kind: RequestKind) -> Result<PackageSummary> {
        let path = normalize_path(path)?;
        let stored = self.store.get_summary(path, tag).await?;

        let mut revision = "";
        if let Some(summary) = &stored {
            match saved_revision(&summary.etag) {
                Some(_) if kind == RequestKind::Human => {
                    tracing::debug!(path = %path, tag = %tag, "serving stored package");
                    return self.serve_stored(summary).await;
                }
                Some(saved) => revision = saved,
                None => tracing::debug!(path = %path, etag = %summary.etag, "stored package too old"),
            }
        }

        match self.fetch(path, tag, revision).await {
            Ok(pkg) => self.persist(pkg).await,
            Err(e) if e.is_not_modified() => {
                tracing::debug!(path = %path, "package not modified");
                stored.ok_or(e)
            }
            // Also taken for InvalidRemotePath: a stored path its host
            // rejects is as dead as a deleted repository.
            Err(e) if e.is_not_found() => {
                self.purge(path).await;
                Err(e)
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to fetch package");
                Err(e)
            }
        }
    }

    /// Runs the fetch on its own task, raced against the deadline. A fetch
    /// that misses the deadline keeps running detached and its result is
    /// dropped.
    async fn fetch(&self, path: &str, tag: &str, saved_revision: &str) -> Result<Package> {
        let fetcher = Arc::clone(&self.fetcher);
        let (task_path, task_tag, task_revision) =
            (path.to_string(), tag.to_string(), saved_revision.to_string());
        let handle = tokio::spawn(async move {
            fetcher
                .fetch(&task_path, &task_tag, &task_revision)
                .await
        });

        match tokio::time::timeout(self.fetch_timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(WalkerError::Task(join.to_string())),
            Err(_) => {
                tracing::warn!(path = %path, "fetch timed out");
                Err(WalkerError::FetchTimeout {
                    path: path.to_string(),
                    secs: self.fetch_timeout.as_secs(),
                })
            }
        }
    }

    async fn serve_stored(&self, summary: &PackageSummary) -> Result<PackageSummary> {
        if let Err(e) = self.ensure_rendered(summary).await {
            tracing::warn!(path = %summary.path, error = %e, "failed to re-render stored package");
        }
        self.count_view(&summary.path, &summary.tag).await
    }

    /// Re-renders the page of a stored package whose shards are missing,
    /// from the local snapshot when there is one and from the stored
    /// declaration record otherwise.
    async fn ensure_rendered(&self, summary: &PackageSummary) -> Result<()> {
        let doc = doc_path(&summary.path, &summary.tag);
        if has_doc_shards(&self.config.docs_js_path, &doc).await {
            return Ok(());
        }

        let mut pkg = match self.read_snapshot(summary).await {
            Some(pkg) => pkg,
            None => {
                let decl = self.store.load_decl(&summary.path, &summary.tag).await?.ok_or_else(|| {
                    WalkerError::Store(format!("no declaration record for {}", summary.path))
                })?;
                codec::decode_decl(&decl)?
            }
        };
        summary.apply_to(&mut pkg);
        tracing::debug!(path = %summary.path, "re-rendering missing page");
        self.write_page(&pkg).await
    }

    async fn read_snapshot(&self, summary: &PackageSummary) -> Option<Package> {
        if self.config.prod_mode || !summary.tag.is_empty() {
            return None;
        }
        match snapshot::read(&self.config.snapshot_path, &summary.path).await {
            Ok(pkg) => pkg,
            Err(e) => {
                tracing::warn!(path = %summary.path, error = %e, "unreadable snapshot");
                None
            }
        }
    }

    async fn write_page(&self, pkg: &Package) -> Result<()> {
        let page = render_package(pkg);
        let html = self.template.render(&page)?;
        let doc = doc_path(&pkg.import_path, &pkg.tag);
        write_doc_shards(&self.config.docs_js_path, &doc, &html).await?;
        write_readmes(&self.config.docs_js_path, &doc, &pkg.readme).await
    }

    async fn persist(&self, mut pkg: Package) -> Result<PackageSummary> {
        let timestamp = now();
        if pkg.created == 0 {
            pkg.created = timestamp;
        }
        pkg.viewed_time = timestamp;

        // Snapshots cover the default branch only.
        if !self.config.prod_mode
            && pkg.tag.is_empty()
            && let Err(e) = snapshot::write(&self.config.snapshot_path, &pkg).await
        {
            tracing::warn!(path = %pkg.import_path, error = %e, "failed to write snapshot");
        }

        self.write_page(&pkg).await?;

        let etag = format!("{}-{}", PACKAGE_VER, pkg.etag);
        let summary = PackageSummary::from_package(&pkg, etag);
        let id = self.store.save_package(summary, record::encode(&pkg)?).await?;
        self.store.update_import_index(id, &pkg.imports).await?;

        tracing::info!(path = %pkg.import_path, tag = %pkg.tag, id, "stored package");
        self.count_view(&pkg.import_path, &pkg.tag).await
    }

    async fn count_view(&self, path: &str, tag: &str) -> Result<PackageSummary> {
        self.store.add_view(path, tag, now()).await?;
        let summary = self
            .store
            .get_summary(path, tag)
            .await?
            .ok_or_else(|| WalkerError::Store(format!("{} vanished while counting a view", path)))?;

        if path.len() < self.config.recent_projects.max_path_len {
            self.recent.upsert(RecentProject {
                path: summary.path.clone(),
                synopsis: summary.synopsis.clone(),
                views: summary.views,
                viewed_time: summary.viewed_time,
            });
        }
        Ok(summary)
    }

    async fn purge(&self, path: &str) {
        if path.split('/').count() < MIN_PURGE_SEGMENTS {
            tracing::debug!(path = %path, "keeping short path");
            return;
        }
        match self.store.delete_package(path).await {
            Ok(true) => tracing::info!(path = %path, "purged missing package"),
            Ok(false) => {}
            Err(e) => tracing::warn!(path = %path, error = %e, "failed to purge package"),
        }
        self.recent.evict(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("github.com/golang/go/tree/master/src/net/http").unwrap(),
            "net/http"
        );
        assert_eq!(normalize_path("github.com/a/b/").unwrap(), "github.com/a/b");
        assert!(matches!(
            normalize_path("  ").unwrap_err(),
            WalkerError::InvalidRemotePath(_)
        ));
    }

    #[test]
    fn test_doc_path() {
        assert_eq!(doc_path("github.com/a/b", ""), "github.com/a/b");
        assert_eq!(doc_path("github.com/a/b", "v1.2"), "github.com/a/b@v1.2");
    }

    #[test]
    fn test_saved_revision() {
        assert_eq!(saved_revision("2-abc"), Some("abc"));
        assert_eq!(saved_revision("2-"), Some(""));
        assert_eq!(saved_revision("1-abc"), None);
        assert_eq!(saved_revision("abc"), None);
    }
}
