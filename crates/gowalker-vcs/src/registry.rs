//! Resolution of import paths to hosting services.
//!
//! Known hosts match statically by prefix and pattern. Standard library
//! paths map to the Go repository, and anything else goes through
//! `go-import` meta discovery.

use crate::bitbucket::{BitbucketConfig, BitbucketService};
use crate::github::{GitHubConfig, GitHubService};
use crate::groups::MatchGroups;
use crate::meta;
use crate::oschina::OschinaService;
use crate::service::{ProjectMeta, Service};
use gowalker_core::{HttpFetcher, Result, WalkerError, base_name};
use gowalker_go::is_go_repo_path;
use std::sync::Arc;

/// Outcome of resolving an import path.
#[derive(Clone)]
pub struct Resolved {
    pub service: Arc<dyn Service>,
    pub groups: MatchGroups,
    /// Project information that overrides what the service reports,
    /// set for the standard library and for meta-tag discovered paths.
    pub project: Option<ProjectMeta>,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("service", &self.service.name())
            .field("groups", &self.groups)
            .field("project", &self.project)
            .finish()
    }
}

/// Immutable table of hosting services in priority order.
///
/// # Examples
///
/// ```
/// use gowalker_vcs::{ServiceRegistry, github::GitHubService};
/// use std::sync::Arc;
///
/// let registry = ServiceRegistry::builder()
///     .service(Arc::new(GitHubService::default()))
///     .build();
///
/// let (service, groups) = registry
///     .resolve_static("github.com/foo/bar/baz")
///     .unwrap()
///     .unwrap();
/// assert_eq!(service.name(), "github");
/// assert_eq!(groups.dir(), "/baz");
/// ```
pub struct ServiceRegistry {
    services: Vec<Arc<dyn Service>>,
}

/// Collects services for a [`ServiceRegistry`].
#[derive(Default)]
pub struct ServiceRegistryBuilder {
    services: Vec<Arc<dyn Service>>,
}

impl ServiceRegistryBuilder {
    /// Appends `service`; earlier services take priority.
    #[must_use]
    pub fn service(mut self, service: Arc<dyn Service>) -> Self {
        self.services.push(service);
        self
    }

    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            services: self.services,
        }
    }
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    /// GitHub, Bitbucket and OSChina with the given endpoints.
    pub fn standard(github: GitHubConfig, bitbucket: BitbucketConfig) -> Self {
        Self::builder()
            .service(Arc::new(GitHubService::new(github)))
            .service(Arc::new(BitbucketService::new(bitbucket)))
            .service(Arc::new(OschinaService::default()))
            .build()
    }

    pub fn services(&self) -> &[Arc<dyn Service>] {
        &self.services
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.iter().find(|s| s.name() == name).cloned()
    }

    /// Matches `path` against the services' prefixes and patterns.
    ///
    /// Returns `Ok(None)` when no prefix matches.
    ///
    /// # Errors
    ///
    /// `InvalidRemotePath` when a prefix matches but the pattern does not:
    /// the host is known and the path is malformed.
    pub fn resolve_static(&self, path: &str) -> Result<Option<(Arc<dyn Service>, MatchGroups)>> {
        let Some(service) = self.services.iter().find(|s| path.starts_with(s.prefix())) else {
            return Ok(None);
        };
        let pattern = service.pattern();
        let caps = pattern
            .captures(path)
            .ok_or_else(|| WalkerError::InvalidRemotePath(path.to_string()))?;
        let mut groups = MatchGroups::from_captures(pattern.capture_names(), &caps);
        groups.insert("import_path", path);
        Ok(Some((Arc::clone(service), groups)))
    }

    /// Resolves `import_path` to a service.
    ///
    /// Standard library paths map to the Go repository on GitHub. Paths
    /// with a known host prefix resolve statically; anything else goes
    /// through `go-import` meta discovery and the discovered repository
    /// must belong to a known host.
    pub async fn resolve(&self, http: &HttpFetcher, import_path: &str) -> Result<Resolved> {
        if is_go_repo_path(import_path) {
            return self.resolve_standard(import_path);
        }
        if let Some((service, groups)) = self.resolve_static(import_path)? {
            return Ok(Resolved {
                service,
                groups,
                project: None,
            });
        }

        let import = meta::discover(http, import_path).await?;
        let dir = &import_path[import.root.len()..];
        let repo_path = format!("{}{}", import.repo_path(), dir);
        let (service, mut groups) = self.resolve_static(&repo_path)?.ok_or_else(|| {
            WalkerError::not_found(
                import_path,
                format!("unsupported repository {}", import.repo),
            )
        })?;
        groups.insert("import_path", import_path);

        Ok(Resolved {
            service,
            groups,
            project: Some(ProjectMeta {
                name: base_name(&import.root).to_string(),
                url: import.repo.clone(),
                vcs: import.vcs.clone(),
                root: import.root,
                view_dir_path: String::new(),
            }),
        })
    }

    fn resolve_standard(&self, import_path: &str) -> Result<Resolved> {
        let service = self
            .get("github")
            .ok_or_else(|| WalkerError::not_found(import_path, "no service for the standard library"))?;
        let mut groups = MatchGroups::default();
        groups.insert("owner", "golang");
        groups.insert("repo", "go");
        groups.insert("dir", format!("/src/{}", import_path));
        groups.insert("import_path", import_path);

        Ok(Resolved {
            service,
            groups,
            project: Some(ProjectMeta {
                root: String::new(),
                name: "Go".into(),
                url: "https://golang.org/".into(),
                view_dir_path: String::new(),
                vcs: "git".into(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gowalker_core::HttpConfig;
    use mockito::{Matcher, Server};

    fn registry() -> ServiceRegistry {
        ServiceRegistry::standard(GitHubConfig::default(), BitbucketConfig::default())
    }

    fn http() -> HttpFetcher {
        HttpFetcher::new(HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_resolve_static_github() {
        let (service, groups) = registry()
            .resolve_static("github.com/foo/bar/baz")
            .unwrap()
            .unwrap();
        assert_eq!(service.name(), "github");
        assert_eq!(groups.owner(), "foo");
        assert_eq!(groups.repo(), "bar");
        assert_eq!(groups.dir(), "/baz");
        assert_eq!(groups.import_path(), "github.com/foo/bar/baz");
    }

    #[test]
    fn test_known_host_malformed_path() {
        assert!(matches!(
            registry().resolve_static("github.com/foo"),
            Err(WalkerError::InvalidRemotePath(_))
        ));
    }

    #[test]
    fn test_unknown_host() {
        assert!(registry().resolve_static("example.org/x").unwrap().is_none());
    }

    #[test]
    fn test_priority_order() {
        let registry = ServiceRegistry::builder()
            .service(Arc::new(OschinaService::new("http://mirror")))
            .service(Arc::new(GitHubService::default()))
            .build();
        let names: Vec<&str> = registry.services().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["oschina", "github"]);
    }

    #[tokio::test]
    async fn test_standard_library() {
        let resolved = registry().resolve(&http(), "net/http").await.unwrap();
        assert_eq!(resolved.service.name(), "github");
        assert_eq!(resolved.groups.owner(), "golang");
        assert_eq!(resolved.groups.dir(), "/src/net/http");
        assert_eq!(resolved.project.unwrap().name, "Go");
    }

    #[tokio::test]
    async fn test_meta_discovery_over_http_fallback() {
        let mut server = Server::new_async().await;
        let host = server.host_with_port();
        let page = format!(
            r#"<html><head><meta name="go-import" content="{host}/vanity git https://github.com/org/vanity"></head></html>"#
        );
        let _sub = server
            .mock("GET", "/vanity/sub")
            .match_query(Matcher::UrlEncoded("go-get".into(), "1".into()))
            .with_status(200)
            .with_body(&page)
            .create_async()
            .await;
        let _root = server
            .mock("GET", "/vanity")
            .match_query(Matcher::UrlEncoded("go-get".into(), "1".into()))
            .with_status(200)
            .with_body(&page)
            .create_async()
            .await;

        let resolved = registry()
            .resolve(&http(), &format!("{}/vanity/sub", host))
            .await
            .unwrap();
        assert_eq!(resolved.service.name(), "github");
        assert_eq!(resolved.groups.owner(), "org");
        assert_eq!(resolved.groups.repo(), "vanity");
        assert_eq!(resolved.groups.dir(), "/sub");
        assert_eq!(resolved.groups.import_path(), format!("{}/vanity/sub", host));
        let project = resolved.project.unwrap();
        assert_eq!(project.root, format!("{}/vanity", host));
        assert_eq!(project.name, "vanity");
    }

    #[tokio::test]
    async fn test_meta_root_mismatch() {
        let mut server = Server::new_async().await;
        let host = server.host_with_port();
        let _sub = server
            .mock("GET", "/a/b")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(
                r#"<head><meta name="go-import" content="{host}/a git https://github.com/org/a"></head>"#
            ))
            .create_async()
            .await;
        let _root = server
            .mock("GET", "/a")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html><head></head></html>")
            .create_async()
            .await;

        let err = registry()
            .resolve(&http(), &format!("{}/a/b", host))
            .await
            .unwrap_err();
        assert!(matches!(err, WalkerError::ProjectRootMismatch { .. }));
    }

    #[tokio::test]
    async fn test_meta_unknown_repository_host() {
        let mut server = Server::new_async().await;
        let host = server.host_with_port();
        let _m = server
            .mock("GET", "/x")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(
                r#"<head><meta name="go-import" content="{host}/x git https://git.example.org/x"></head>"#
            ))
            .create_async()
            .await;

        let err = registry()
            .resolve(&http(), &format!("{}/x", host))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
