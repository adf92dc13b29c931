//! One crawl: resolve, fetch the tree, walk the sources.

use crate::registry::{Resolved, ServiceRegistry};
use gowalker_core::{HttpFetcher, Package, Result, Source, WalkerError};
use gowalker_go::{WalkOptions, build, is_go_repo_path};
use std::sync::Arc;

const LIBGO_MIRROR: &str = "/libgo/go/";

/// Resolves, fetches and walks one package.
///
/// # Examples
///
/// ```no_run
/// use gowalker_core::{HttpConfig, HttpFetcher};
/// use gowalker_vcs::{Crawler, ServiceRegistry};
/// use std::sync::Arc;
///
/// # async fn example() -> gowalker_core::Result<()> {
/// let registry = Arc::new(ServiceRegistry::standard(Default::default(), Default::default()));
/// let http = Arc::new(HttpFetcher::new(HttpConfig::default())?);
/// let crawler = Crawler::new(registry, http);
///
/// let pkg = crawler.crawl("github.com/foo/bar", "", "").await?;
/// println!("{}: {}", pkg.import_path, pkg.synopsis);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Crawler {
    registry: Arc<ServiceRegistry>,
    http: Arc<HttpFetcher>,
}

impl Crawler {
    pub fn new(registry: Arc<ServiceRegistry>, http: Arc<HttpFetcher>) -> Self {
        Self { registry, http }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Crawls `import_path` at `tag`.
    ///
    /// `saved_revision` is the revision of the stored copy without its
    /// version prefix, or empty to force a download. The HTTP client is
    /// recycled afterwards whatever the outcome.
    ///
    /// # Errors
    ///
    /// `NotModified` when the revision did not change, the resolver and
    /// fetch errors of the service, and `Extract` when the sources do not
    /// parse.
    pub async fn crawl(&self, import_path: &str, tag: &str, saved_revision: &str) -> Result<Package> {
        let result = self.walk(import_path, tag, saved_revision).await;
        self.recycle();
        result
    }

    /// Fetches a presentation file such as
    /// `github.com/foo/talks/2014/intro.slide` from the default branch.
    ///
    /// # Errors
    ///
    /// `NotFound` when the hosting service does not serve presentations,
    /// plus the resolver and fetch errors of the service.
    pub async fn fetch_presentation(&self, path: &str) -> Result<Source> {
        let result = self.presentation(path).await;
        self.recycle();
        result
    }

    async fn presentation(&self, path: &str) -> Result<Source> {
        let (dir, file) = path
            .rsplit_once('/')
            .filter(|(dir, file)| !dir.is_empty() && !file.is_empty())
            .ok_or_else(|| WalkerError::InvalidRemotePath(path.to_string()))?;

        let Resolved {
            service,
            mut groups,
            ..
        } = self.registry.resolve(&self.http, dir).await?;
        groups.insert("tag", "");
        tracing::debug!(path = %path, service = service.name(), "fetching presentation");

        service
            .fetch_presentation(&self.http, &groups, file)
            .await?
            .ok_or_else(|| {
                WalkerError::not_found(
                    path,
                    format!("{} does not serve presentations", service.name()),
                )
            })
    }

    fn recycle(&self) {
        if let Err(e) = self.http.close_idle_connections() {
            tracing::warn!(error = %e, "failed to recycle HTTP client");
        }
    }

    async fn walk(&self, import_path: &str, tag: &str, saved_revision: &str) -> Result<Package> {
        if let Some(i) = import_path.find(LIBGO_MIRROR)
            && i > 0
            && is_go_repo_path(&import_path[i + LIBGO_MIRROR.len()..])
        {
            return Err(WalkerError::InvalidRemotePath(format!(
                "{} is a Go frontend source tree mirror",
                import_path
            )));
        }

        let Resolved {
            service,
            mut groups,
            project,
        } = self.registry.resolve(&self.http, import_path).await?;
        groups.insert("tag", tag);
        tracing::debug!(path = %import_path, service = service.name(), "resolved");

        let tree = service
            .fetch_tree(&self.http, &groups, tag, saved_revision)
            .await?;

        let opts = WalkOptions {
            import_path: import_path.to_string(),
            line_anchor: tree.line_anchor.clone(),
        };
        let mut pkg = build(&tree.files, &opts).map_err(|e| e.for_package(import_path))?;

        let mut meta = tree.project;
        if let Some(over) = project {
            meta.name = over.name;
            meta.url = over.url;
            meta.vcs = over.vcs;
            if !over.root.is_empty() {
                meta.root = over.root;
            }
        }
        pkg.project_root = meta.root;
        pkg.project_name = meta.name;
        pkg.project_url = meta.url;
        pkg.view_dir_path = meta.view_dir_path;
        pkg.vcs = meta.vcs;
        pkg.tag = tag.to_string();
        pkg.etag = tree.revision;
        pkg.stars = tree.stars;
        pkg.has_subdir = !tree.dirs.is_empty();
        pkg.dirs = tree.dirs;
        pkg.has_file = !pkg.files.is_empty();

        tracing::info!(
            path = %import_path,
            revision = %pkg.etag,
            files = pkg.files.len(),
            "walked package"
        );
        Ok(pkg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gowalker_core::HttpConfig;

    fn crawler() -> Crawler {
        Crawler::new(
            Arc::new(ServiceRegistry::standard(Default::default(), Default::default())),
            Arc::new(HttpFetcher::new(HttpConfig::default()).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_libgo_mirror_rejected() {
        let err = crawler()
            .crawl("code.google.com/p/gofrontend/libgo/go/fmt", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, WalkerError::InvalidRemotePath(_)));
    }

    #[tokio::test]
    async fn test_crawl_github_package() {
        use crate::github::GitHubConfig;
        use mockito::{Matcher, Server};

        let mut server = Server::new_async().await;
        let api = server.url();
        let _repo = server
            .mock("GET", "/repos/foo/bar")
            .with_status(200)
            .with_body(r#"{"default_branch":"master","watchers":7}"#)
            .create_async()
            .await;
        let _commit = server
            .mock("GET", "/repos/foo/bar/commits/v1")
            .with_status(200)
            .with_body(r#"{"sha":"f00d"}"#)
            .create_async()
            .await;
        let _tree = server
            .mock("GET", "/repos/foo/bar/git/trees/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "url": format!("{}/repos/foo/bar/git/trees/f00d", api),
                    "tree": [{"path": "bar.go", "type": "blob"}, {"path": "sub/s.go", "type": "blob"}]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _file = server
            .mock("GET", "/raw/foo/bar/v1/bar.go")
            .with_status(200)
            .with_body("// Package bar is a bar.\npackage bar\n\n// Open opens.\nfunc Open() {}\n")
            .create_async()
            .await;

        let github = GitHubConfig {
            api_url: api.clone(),
            raw_url: format!("{}/raw", api),
            ..GitHubConfig::default()
        };
        let crawler = Crawler::new(
            Arc::new(ServiceRegistry::standard(github, Default::default())),
            Arc::new(HttpFetcher::new(HttpConfig::default()).unwrap()),
        );

        let pkg = crawler.crawl("github.com/foo/bar", "v1", "").await.unwrap();
        assert_eq!(pkg.name, "bar");
        assert_eq!(pkg.synopsis, "Package bar is a bar.");
        assert_eq!(pkg.etag, "f00d");
        assert_eq!(pkg.tag, "v1");
        assert_eq!(pkg.stars, 7);
        assert_eq!(pkg.project_root, "github.com/foo/bar");
        assert_eq!(pkg.dirs, vec!["sub"]);
        assert!(pkg.has_subdir);
        assert_eq!(pkg.funcs[0].url, "https://github.com/foo/bar/blob/v1/bar.go#L5");
    }

    #[tokio::test]
    async fn test_malformed_known_host() {
        let err = crawler().crawl("github.com/onlyowner", "", "").await.unwrap_err();
        assert!(matches!(err, WalkerError::InvalidRemotePath(_)));
    }

    #[tokio::test]
    async fn test_failed_crawl_still_recycles_client() {
        let http = Arc::new(HttpFetcher::new(HttpConfig::default()).unwrap());
        let crawler = Crawler::new(
            Arc::new(ServiceRegistry::standard(Default::default(), Default::default())),
            Arc::clone(&http),
        );

        assert!(crawler.crawl("github.com/onlyowner", "", "").await.is_err());
        assert_eq!(http.generation(), 1);
        assert!(crawler.fetch_presentation("noslash").await.is_err());
        assert_eq!(http.generation(), 2);
    }

    #[tokio::test]
    async fn test_presentation_path_needs_a_file() {
        for path in ["intro.slide", "github.com/foo/bar/", "/intro.slide"] {
            let err = crawler().fetch_presentation(path).await.unwrap_err();
            assert!(matches!(err, WalkerError::InvalidRemotePath(_)), "{}", path);
        }
    }

    #[tokio::test]
    async fn test_presentation_unsupported_host() {
        let err = crawler()
            .fetch_presentation("git.oschina.net/u/proj/intro.slide")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_github_presentation() {
        use crate::github::GitHubConfig;
        use mockito::Server;

        let mut server = Server::new_async().await;
        let _raw = server
            .mock("GET", "/raw/foo/talks/master/2014/intro.slide")
            .with_status(200)
            .with_body("Intro\n\n* Welcome")
            .create_async()
            .await;

        let github = GitHubConfig {
            raw_url: format!("{}/raw", server.url()),
            ..GitHubConfig::default()
        };
        let crawler = Crawler::new(
            Arc::new(ServiceRegistry::standard(github, Default::default())),
            Arc::new(HttpFetcher::new(HttpConfig::default()).unwrap()),
        );

        let source = crawler
            .fetch_presentation("github.com/foo/talks/2014/intro.slide")
            .await
            .unwrap();
        assert_eq!(source.name, "intro.slide");
        assert!(source.text().starts_with("Intro"));
    }
}
