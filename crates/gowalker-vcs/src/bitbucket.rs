//! Bitbucket Cloud through the 2.0 REST API.

use crate::groups::MatchGroups;
use crate::service::{FetchedTree, ProjectMeta, Service};
use crate::tree::{dir_prefix, file_name, partition_manifest};
use async_trait::async_trait;
use gowalker_core::{HttpFetcher, Result, Source, WalkerError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static BITBUCKET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^bitbucket\.org/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/[a-z0-9A-Z_.\-/]*)?$",
    )
    .expect("valid Bitbucket pattern")
});

/// Listing depth below the package directory. The API has no unbounded
/// recursion, and a subdirectory counts when Go files sit anywhere below it.
const LISTING_DEPTH: usize = 64;

const REPO_API: &str = "{0}/repositories/{owner}/{repo}";
const PROJECT_URL: &str = "{0}/{owner}/{repo}";
const SRC_API: &str = "{0}/repositories/{owner}/{repo}/src/{1}/{2}";
const SRC_URL: &str = "{0}/{owner}/{repo}/src/{1}/{2}";
const DIR_URL: &str = "{0}/{owner}/{repo}/src/{1}{dir}";

#[derive(Debug, Clone)]
pub struct BitbucketConfig {
    pub api_url: String,
    pub web_url: String,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.bitbucket.org/2.0".into(),
            web_url: "https://bitbucket.org".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(default)]
    scm: String,
    mainbranch: Option<Branch>,
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Ref {
    target: Target,
}

#[derive(Debug, Deserialize)]
struct Target {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct SrcPage {
    values: Vec<SrcEntry>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SrcEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct BitbucketService {
    config: BitbucketConfig,
}

impl BitbucketService {
    pub fn new(config: BitbucketConfig) -> Self {
        Self { config }
    }

    /// Resolves `tag` as a branch first and as a tag second.
    async fn revision(&self, http: &HttpFetcher, repo_api: &str, tag: &str) -> Result<String> {
        let tag = urlencoding::encode(tag);
        let branch = format!("{}/refs/branches/{}", repo_api, tag);
        match http.get_json::<Ref>(&branch, None).await {
            Ok(r) => Ok(r.target.hash),
            Err(e) if e.is_not_found() => {
                let tag_url = format!("{}/refs/tags/{}", repo_api, tag);
                let r: Ref = http.get_json(&tag_url, None).await?;
                Ok(r.target.hash)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_files(
        &self,
        http: &HttpFetcher,
        groups: &MatchGroups,
        revision: &str,
        dir: &str,
    ) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        let listing = groups.expand(SRC_API, &[self.config.api_url.as_str(), revision, dir]);
        let mut next = Some(format!("{}?max_depth={}&pagelen=100", listing, LISTING_DEPTH));
        while let Some(url) = next {
            let page: SrcPage = http.get_json(&url, None).await?;
            paths.extend(
                page.values
                    .into_iter()
                    .filter(|entry| entry.kind == "commit_file")
                    .map(|entry| entry.path),
            );
            next = page.next;
        }
        Ok(paths)
    }
}

impl Default for BitbucketService {
    fn default() -> Self {
        Self::new(BitbucketConfig::default())
    }
}

#[async_trait]
impl Service for BitbucketService {
    fn name(&self) -> &'static str {
        "bitbucket"
    }

    fn prefix(&self) -> &str {
        "bitbucket.org/"
    }

    fn pattern(&self) -> &Regex {
        &BITBUCKET_PATTERN
    }

    async fn fetch_tree(
        &self,
        http: &HttpFetcher,
        groups: &MatchGroups,
        tag: &str,
        saved_revision: &str,
    ) -> Result<FetchedTree> {
        let repo_api = groups.expand(REPO_API, &[self.config.api_url.as_str()]);
        let info: Repository = http.get_json(&repo_api, None).await?;
        let default_branch = info.mainbranch.map(|b| b.name).unwrap_or_else(|| {
            if info.scm == "hg" {
                "default".to_string()
            } else {
                "master".to_string()
            }
        });
        let tag = if tag.is_empty() {
            default_branch.as_str()
        } else {
            tag
        };

        let revision = self.revision(http, &repo_api, tag).await?;
        if revision == saved_revision {
            return Err(WalkerError::NotModified);
        }

        let prefix = dir_prefix(groups.dir());
        let listing = self.list_files(http, groups, &revision, &prefix).await?;
        let partition = partition_manifest(&listing, &prefix);
        if !partition.has_go_files() && partition.dirs.is_empty() {
            return Err(WalkerError::NoSourceFiles {
                path: groups.import_path().to_string(),
            });
        }

        let mut files: Vec<Source> = partition
            .files
            .iter()
            .map(|path| {
                Source::new(
                    file_name(path),
                    groups.expand(
                        SRC_URL,
                        &[self.config.web_url.as_str(), revision.as_str(), path.as_str()],
                    ),
                    groups.expand(
                        SRC_API,
                        &[self.config.api_url.as_str(), revision.as_str(), path.as_str()],
                    ),
                )
            })
            .collect();
        http.fetch_files(&mut files, None).await?;

        tracing::debug!(path = %groups.import_path(), files = files.len(), "fetched Bitbucket tree");
        Ok(FetchedTree {
            files,
            dirs: partition.dirs,
            project: ProjectMeta {
                root: groups.expand(PROJECT_URL, &["bitbucket.org"]),
                name: groups.repo().to_string(),
                url: groups.expand(PROJECT_URL, &[self.config.web_url.as_str()]),
                view_dir_path: groups.expand(DIR_URL, &[self.config.web_url.as_str(), revision.as_str()]),
                vcs: if info.scm.is_empty() { "git".into() } else { info.scm },
            },
            revision,
            line_anchor: "#lines-".into(),
            stars: 0,
        })
    }
}
