//! GitHub: REST API for revisions and trees, raw host for file content.

use crate::groups::MatchGroups;
use crate::service::{FetchedTree, ProjectMeta, Service};
use crate::tree::{dir_prefix, file_name, partition_manifest};
use async_trait::async_trait;
use gowalker_core::{HttpFetcher, Result, Source, WalkerError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

static GITHUB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^github\.com/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/[a-z0-9A-Z_.\-/]*)?$",
    )
    .expect("valid GitHub pattern")
});

const REPO_API: &str = "{0}/repos/{owner}/{repo}";
const PROJECT_URL: &str = "{0}/{owner}/{repo}";
const BLOB_URL: &str = "{0}/{owner}/{repo}/blob/{1}/{2}";
const RAW_URL: &str = "{0}/{owner}/{repo}/{1}/{2}";
const TREE_URL: &str = "{0}/{owner}/{repo}/tree/{1}{dir}";

/// Endpoints and credentials for GitHub.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub raw_url: String,
    pub web_url: String,
    /// Personal access token sent as `Authorization: token <token>`.
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            raw_url: "https://raw.githubusercontent.com".into(),
            web_url: "https://github.com".into(),
            token: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
    #[serde(default)]
    watchers: i64,
}

#[derive(Debug, Deserialize)]
struct Commit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Tree {
    url: String,
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct GitHubService {
    config: GitHubConfig,
}

impl GitHubService {
    pub fn new(config: GitHubConfig) -> Self {
        Self { config }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &self.config.token
            && let Ok(value) = HeaderValue::from_str(&format!("token {}", token))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn repo_api(&self, groups: &MatchGroups) -> String {
        groups.expand(REPO_API, &[self.config.api_url.as_str()])
    }

    fn source(&self, groups: &MatchGroups, tag: &str, path: &str) -> Source {
        Source::new(
            file_name(path),
            groups.expand(BLOB_URL, &[self.config.web_url.as_str(), tag, path]),
            groups.expand(RAW_URL, &[self.config.raw_url.as_str(), tag, path]),
        )
    }
}

impl Default for GitHubService {
    fn default() -> Self {
        Self::new(GitHubConfig::default())
    }
}

#[async_trait]
impl Service for GitHubService {
    fn name(&self) -> &'static str {
        "github"
    }

    fn prefix(&self) -> &str {
        "github.com/"
    }

    fn pattern(&self) -> &Regex {
        &GITHUB_PATTERN
    }

    async fn fetch_tree(
        &self,
        http: &HttpFetcher,
        groups: &MatchGroups,
        tag: &str,
        saved_revision: &str,
    ) -> Result<FetchedTree> {
        let headers = self.headers();
        let repo_api = self.repo_api(groups);
        let info: RepoInfo = http.get_json(&repo_api, Some(&headers)).await?;
        let tag = if tag.is_empty() {
            info.default_branch.as_str()
        } else {
            tag
        };
        let encoded_tag = urlencoding::encode(tag);

        let commit: Commit = http
            .get_json(&format!("{}/commits/{}", repo_api, encoded_tag), Some(&headers))
            .await?;
        if commit.sha == saved_revision {
            return Err(WalkerError::NotModified);
        }

        let tree: Tree = http
            .get_json(
                &format!("{}/git/trees/{}?recursive=1", repo_api, encoded_tag),
                Some(&headers),
            )
            .await?;
        if !tree.url.starts_with(&format!("{}/", repo_api)) {
            return Err(WalkerError::not_found(
                groups.import_path(),
                "GitHub import path has incorrect case",
            ));
        }

        let partition = partition_manifest(
            tree.tree
                .iter()
                .filter(|entry| entry.kind == "blob")
                .map(|entry| entry.path.as_str()),
            &dir_prefix(groups.dir()),
        );
        if !partition.has_go_files() && partition.dirs.is_empty() {
            return Err(WalkerError::NoSourceFiles {
                path: groups.import_path().to_string(),
            });
        }

        let mut files: Vec<Source> = partition
            .files
            .iter()
            .map(|path| self.source(groups, tag, path))
            .collect();
        http.fetch_files(&mut files, Some(&headers)).await?;

        tracing::debug!(
            path = %groups.import_path(),
            files = files.len(),
            dirs = partition.dirs.len(),
            "fetched GitHub tree"
        );
        Ok(FetchedTree {
            files,
            dirs: partition.dirs,
            revision: commit.sha,
            project: ProjectMeta {
                root: groups.expand(PROJECT_URL, &["github.com"]),
                name: groups.repo().to_string(),
                url: groups.expand(PROJECT_URL, &[self.config.web_url.as_str()]),
                view_dir_path: groups.expand(TREE_URL, &[self.config.web_url.as_str(), tag]),
                vcs: "git".into(),
            },
            line_anchor: "#L".into(),
            stars: info.watchers,
        })
    }

    async fn fetch_presentation(
        &self,
        http: &HttpFetcher,
        groups: &MatchGroups,
        file: &str,
    ) -> Result<Option<Source>> {
        let tag = if groups.tag().is_empty() {
            "master"
        } else {
            groups.tag()
        };
        let path = format!("{}/{}", groups.dir(), file);
        let mut source = self.source(groups, tag, path.trim_start_matches('/'));
        source.data = http
            .get_bytes(&source.raw_url, Some(&self.headers()))
            .await?
            .to_vec();
        Ok(Some(source))
    }
}
